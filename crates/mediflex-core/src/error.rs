//! Error types for the mediflex-core library.
//!
//! Text extraction never fails; these errors belong to persistence,
//! configuration and the record services built on top of the store.

use thiserror::Error;

/// Main error type for the mediflex library.
#[derive(Error, Debug)]
pub enum MediflexError {
    /// Storage backend error.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A record failed validation before being persisted.
    #[error("validation failed for {field}: {reason}")]
    Validation { field: String, reason: String },

    /// A referenced record does not exist.
    #[error("{entity} with id {id} not found")]
    NotFound { entity: &'static str, id: u64 },

    /// An order receipt did not name a distributor.
    #[error("could not identify distributor from receipt")]
    UnknownDistributor,

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl MediflexError {
    pub(crate) fn validation(field: &str, reason: &str) -> Self {
        Self::Validation {
            field: field.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Errors raised by key-value storage backends.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Backend I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A value could not be serialized for storage.
    #[error("failed to serialize value: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The key contains characters the backend cannot store.
    #[error("invalid storage key: {0:?}")]
    InvalidKey(String),

    /// A stored value exists but cannot be decoded.
    #[error("stored value for {key} is corrupt: {reason}")]
    Corrupt { key: String, reason: String },
}

/// Result type for the mediflex library.
pub type Result<T> = std::result::Result<T, MediflexError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_errors_convert_into_library_error() {
        let err: MediflexError = StoreError::InvalidKey("../etc".to_string()).into();
        assert!(matches!(err, MediflexError::Store(StoreError::InvalidKey(_))));
        assert_eq!(err.to_string(), "storage error: invalid storage key: \"../etc\"");
    }

    #[test]
    fn validation_error_message() {
        let err = MediflexError::validation("contact", "must not be empty");
        assert_eq!(err.to_string(), "validation failed for contact: must not be empty");
    }
}
