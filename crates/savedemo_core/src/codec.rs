//! Text codec for the persisted state blob.
//!
//! # Responsibility
//! - Encode `StateRecord` as a compact JSON object with named numeric fields.
//! - Decode blobs written by this build and by older PascalCase builds.
//!
//! # Invariants
//! - `encode` is deterministic for a given record.
//! - `decode` never panics; every malformed input yields `DecodeError`.
//! - Range repair is not done here; see `StateRecord::sanitized`.

use crate::model::state::StateRecord;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type DecodeResult<T> = Result<T, DecodeError>;

/// Persisted blob could not be turned back into a `StateRecord`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Blob is empty or whitespace only.
    Empty,
    /// Blob is not JSON or does not have the `{radius, height}` shape.
    Malformed(String),
}

impl Display for DecodeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "state blob is empty"),
            Self::Malformed(details) => write!(f, "state blob is malformed: {details}"),
        }
    }
}

impl Error for DecodeError {}

/// Encodes `state` into its persisted text form.
pub fn encode(state: &StateRecord) -> String {
    // Non-finite fields come out as `null`; decode rejects those.
    serde_json::json!({
        "radius": state.radius,
        "height": state.height,
    })
    .to_string()
}

/// Decodes a persisted blob.
///
/// # Errors
/// - `Empty` when `text` has no content.
/// - `Malformed` when `text` is not a JSON object with numeric `radius` and
///   `height` fields (or their `Radius`/`Height` legacy spellings).
pub fn decode(text: &str) -> DecodeResult<StateRecord> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(DecodeError::Empty);
    }
    serde_json::from_str::<StateRecord>(trimmed)
        .map_err(|err| DecodeError::Malformed(err.to_string()))
}
