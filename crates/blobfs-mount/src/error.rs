//! Error type for the mount layer.
//!
//! [`BlobFsError`] is what the internals return; the dispatcher converts it
//! to an [`FsStatus`] at the host boundary with [`OrStatus::or_status`], which
//! also logs the fault.

use crate::status::{FsResult, FsStatus};
use blobfs_core::{DirMetadataError, EntryKind, StoreError};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

/// Errors raised while serving a filesystem operation.
#[derive(Debug, Error)]
pub enum BlobFsError {
    /// Object store operation failed (shared so registry loaders can hand
    /// the same error to every waiter).
    #[error("Store operation failed: {0}")]
    Store(Arc<StoreError>),

    /// A directory marker holds an unreadable document.
    #[error("Directory metadata unreadable: {0}")]
    Metadata(#[from] DirMetadataError),

    /// Local cache I/O failed.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// The entity does not exist.
    #[error("{kind} not found: {path}")]
    NotFound {
        /// Host path.
        path: String,
        /// Kind the path resolved to.
        kind: EntryKind,
    },

    /// The entity already exists.
    #[error("Already exists: {0}")]
    AlreadyExists(String),

    /// A directory operation targeted a file.
    #[error("Not a directory: {0}")]
    NotADirectory(String),

    /// A file operation targeted a directory.
    #[error("Is a directory: {0}")]
    NotAFile(String),

    /// Directory still has children.
    #[error("Directory not empty: {0}")]
    NotEmpty(String),

    /// The operation is refused for this entity.
    #[error("Access denied: {0}")]
    Denied(String),

    /// No open handle with this id.
    #[error("Invalid handle: {0}")]
    InvalidHandle(u64),

    /// The local cache directory cannot be used.
    #[error("Cache directory {} unusable: {source}", path.display())]
    CacheRoot {
        /// Configured cache directory.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },
}

impl BlobFsError {
    /// Converts this error to a libc error code.
    pub fn to_errno(&self) -> i32 {
        FsStatus::from(self).to_errno()
    }
}

impl From<StoreError> for BlobFsError {
    fn from(e: StoreError) -> Self {
        BlobFsError::Store(Arc::new(e))
    }
}

impl From<Arc<StoreError>> for BlobFsError {
    fn from(e: Arc<StoreError>) -> Self {
        BlobFsError::Store(e)
    }
}

/// Result type for mount-layer internals.
pub type BlobFsResult<T> = Result<T, BlobFsError>;

/// Converts an internal result into a host status, logging the fault.
pub trait OrStatus<T> {
    /// Maps the error to its [`FsStatus`].
    fn or_status(self, op: &'static str, path: &str) -> FsResult<T>;
}

impl<T, E> OrStatus<T> for Result<T, E>
where
    E: Into<BlobFsError>,
{
    fn or_status(self, op: &'static str, path: &str) -> FsResult<T> {
        self.map_err(|e| {
            let e = e.into();
            let status = FsStatus::from(&e);
            match status {
                FsStatus::Error | FsStatus::AccessDenied => {
                    warn!(op, path, error = %e, status = status.name(), "Operation failed");
                }
                _ => debug!(op, path, error = %e, status = status.name(), "Operation refused"),
            }
            status
        })
    }
}
