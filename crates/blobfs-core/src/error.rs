//! Error types for the core crate.

use std::io;
use thiserror::Error;

/// Errors raised by an [`ObjectStore`](crate::store::ObjectStore) backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The addressed object does not exist.
    #[error("Object not found: {key}")]
    NotFound {
        /// Key that was looked up.
        key: String,
    },

    /// The container the store is bound to does not exist.
    #[error("Container not found: {container}")]
    ContainerNotFound {
        /// Container name.
        container: String,
    },

    /// The store refused the operation.
    #[error("Permission denied for {key}")]
    PermissionDenied {
        /// Key the operation targeted.
        key: String,
    },

    /// The store could not be reached or returned an unexpected fault.
    #[error("Store unavailable: {reason}")]
    Unavailable {
        /// Human-readable reason.
        reason: String,
    },

    /// The key cannot be represented by this backend.
    #[error("Invalid key: {key}")]
    InvalidKey {
        /// Offending key.
        key: String,
    },

    /// Local I/O failure inside the backend.
    #[error("I/O error on {key}: {source}")]
    Io {
        /// Key being accessed when the error occurred.
        key: String,
        /// Underlying error.
        #[source]
        source: io::Error,
    },

    /// Backend-side metadata could not be (de)serialized.
    #[error("Metadata error: {0}")]
    Metadata(#[from] serde_json::Error),
}

impl StoreError {
    /// Wraps an I/O error, turning `NotFound` into [`StoreError::NotFound`].
    pub fn from_io(key: &str, source: io::Error) -> Self {
        match source.kind() {
            io::ErrorKind::NotFound => StoreError::NotFound {
                key: key.to_string(),
            },
            io::ErrorKind::PermissionDenied => StoreError::PermissionDenied {
                key: key.to_string(),
            },
            _ => StoreError::Io {
                key: key.to_string(),
                source,
            },
        }
    }

    /// Returns true if this error reports a missing object.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors raised while decoding a directory metadata document.
#[derive(Debug, Error)]
pub enum DirMetadataError {
    /// The body is not a valid document.
    #[error("Malformed directory metadata: {0}")]
    Malformed(#[from] serde_json::Error),
}
