//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate codec, store and host document calls per lifecycle signal.
//! - Keep panel and host event wiring decoupled from persistence details.

pub mod controller;
