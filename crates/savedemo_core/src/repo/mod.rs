//! Persistence contracts for plugin state.
//!
//! # Responsibility
//! - Define where the encoded state blob lives inside a host document.
//! - Isolate host string-table details from lifecycle orchestration.
//!
//! # Invariants
//! - Only the lifecycle controller writes through these contracts.

pub mod document_store;
