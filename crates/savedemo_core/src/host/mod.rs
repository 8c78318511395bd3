//! Host application document contract.
//!
//! # Responsibility
//! - Describe the document operations this plugin calls on its host:
//!   object table edits, view redraw and the per-document string table.
//! - Keep host internals outside the core; implementors adapt a real host.
//!
//! # Invariants
//! - Every operation targets the currently active document.
//! - With no active document, reads return `None` and writes return
//!   `HostError::NoActiveDocument`; nothing panics.

use crate::model::state::Sphere;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod memory;

pub type HostResult<T> = Result<T, HostError>;

/// Identifier assigned by the host to an object in a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectId(pub u64);

impl Display for ObjectId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "obj-{}", self.0)
    }
}

/// Object stored in a host document.
#[derive(Debug, Clone, PartialEq)]
pub enum DocumentObject {
    /// Sphere primitive, as added by this plugin.
    Sphere(Sphere),
    /// Anything else the user or other plugins created.
    Foreign(String),
}

/// Host-side document operation failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostError {
    /// No document is open in the host.
    NoActiveDocument,
    /// The host refused the operation.
    Rejected(String),
}

impl Display for HostError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoActiveDocument => write!(f, "no active document"),
            Self::Rejected(reason) => write!(f, "host rejected operation: {reason}"),
        }
    }
}

impl Error for HostError {}

/// Operations consumed from the host's active document.
pub trait HostDocument {
    fn has_active_document(&self) -> bool;

    /// Reads `(owner, key)` from the active document string table.
    fn get_string(&self, owner: &str, key: &str) -> Option<String>;

    /// Writes `(owner, key)` into the active document string table.
    fn set_string(&mut self, owner: &str, key: &str, value: &str) -> HostResult<()>;

    /// Removes every object from the active document.
    fn clear_objects(&mut self) -> HostResult<()>;

    fn add_sphere(&mut self, sphere: &Sphere) -> HostResult<ObjectId>;

    /// Deletes one object. Returns `false` when `id` is not in the document.
    fn delete_object(&mut self, id: ObjectId) -> HostResult<bool>;

    fn redraw_views(&mut self);
}
