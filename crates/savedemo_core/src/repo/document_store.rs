//! Document-scoped key/value store for the state blob.
//!
//! # Responsibility
//! - Address the active document string table by `(owner, key)`.
//! - Map "no active document" into a soft, skippable store error.
//!
//! # Invariants
//! - A missing or empty entry is `None` ("never saved"), not an error.
//! - Without an active document `load` is `None` and `save` is
//!   `StoreError::Unavailable`.

use crate::host::{HostDocument, HostError};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StoreResult<T> = Result<T, StoreError>;

/// Failure to persist into the active document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// No document is open; the write is skipped.
    Unavailable,
    /// The host refused the write.
    Host(HostError),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unavailable => write!(f, "document store unavailable: no active document"),
            Self::Host(err) => write!(f, "{err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Unavailable => None,
            Self::Host(err) => Some(err),
        }
    }
}

impl From<HostError> for StoreError {
    fn from(value: HostError) -> Self {
        match value {
            HostError::NoActiveDocument => Self::Unavailable,
            other => Self::Host(other),
        }
    }
}

/// Persistence contract for one text blob per `(owner, key)`.
pub trait StateStore {
    fn load(&self, owner: &str, key: &str) -> Option<String>;
    fn save(&mut self, owner: &str, key: &str, text: &str) -> StoreResult<()>;
}

/// `StateStore` over the host's active document string table.
pub struct DocumentStore<'doc, D: HostDocument> {
    document: &'doc mut D,
}

impl<'doc, D: HostDocument> DocumentStore<'doc, D> {
    pub fn new(document: &'doc mut D) -> Self {
        Self { document }
    }
}

impl<D: HostDocument> StateStore for DocumentStore<'_, D> {
    fn load(&self, owner: &str, key: &str) -> Option<String> {
        if !self.document.has_active_document() {
            return None;
        }
        self.document
            .get_string(owner, key)
            .filter(|text| !text.trim().is_empty())
    }

    fn save(&mut self, owner: &str, key: &str, text: &str) -> StoreResult<()> {
        if !self.document.has_active_document() {
            return Err(StoreError::Unavailable);
        }
        self.document.set_string(owner, key, text)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{DocumentStore, StateStore, StoreError};
    use crate::host::memory::InMemoryHost;
    use crate::host::{HostDocument, HostError};

    #[test]
    fn load_without_document_is_absent_and_save_is_unavailable() {
        let mut host = InMemoryHost::new();
        let mut store = DocumentStore::new(&mut host);
        assert_eq!(store.load("owner", "key"), None);
        assert_eq!(store.save("owner", "key", "{}"), Err(StoreError::Unavailable));
    }

    #[test]
    fn empty_entry_reads_as_absent() {
        let mut host = InMemoryHost::new();
        host.new_document("a.3dm");
        host.set_string("owner", "key", "  ").expect("set string");
        let store = DocumentStore::new(&mut host);
        assert_eq!(store.load("owner", "key"), None);
    }

    #[test]
    fn save_then_load_is_scoped_by_owner() {
        let mut host = InMemoryHost::new();
        host.new_document("a.3dm");
        let mut store = DocumentStore::new(&mut host);
        store.save("owner-a", "key", "blob").expect("save");
        assert_eq!(store.load("owner-a", "key").as_deref(), Some("blob"));
        assert_eq!(store.load("owner-b", "key"), None);
    }

    #[test]
    fn host_errors_map_to_store_errors() {
        assert_eq!(
            StoreError::from(HostError::NoActiveDocument),
            StoreError::Unavailable
        );
        let rejected = HostError::Rejected("read-only".to_string());
        assert_eq!(
            StoreError::from(rejected.clone()),
            StoreError::Host(rejected)
        );
    }
}
