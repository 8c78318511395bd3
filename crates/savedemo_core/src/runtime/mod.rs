//! Host-facing runtime: event wiring and the UI task queue.
//!
//! # Responsibility
//! - Receive host lifecycle signals and route them to the controller.
//! - Schedule every panel touch onto the UI-affine task queue.
//!
//! # Invariants
//! - Nothing here blocks; posted work runs on a later drain.

pub mod plugin;
pub mod tasks;
