//! Domain model for the per-document sphere state.
//!
//! # Responsibility
//! - Define the single state record persisted inside each host document.
//! - Keep geometry derivation pure so every caller sees the same sphere.
//!
//! # Invariants
//! - One logical `StateRecord` per document; nothing here is shared across
//!   documents.

pub mod state;
