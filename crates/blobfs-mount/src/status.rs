//! Filesystem status codes returned across the host boundary.
//!
//! Every dispatcher operation resolves to `Ok` (success) or one [`FsStatus`].
//! Host drivers translate the status with [`FsStatus::to_ntstatus`] (Windows
//! style drivers) or [`FsStatus::to_errno`] (POSIX style drivers).
//!
//! Errors raised below the dispatcher are classified through the `From`
//! implementations in this module so every backend maps them the same way.

use crate::error::BlobFsError;
use blobfs_core::{EntryKind, StoreError};
use std::io;
use thiserror::Error;

/// NTSTATUS value of a successful call.
pub const STATUS_SUCCESS: u32 = 0x0000_0000;

/// Outcome of a failed filesystem operation.
///
/// # Example
///
/// ```
/// use blobfs_mount::FsStatus;
///
/// assert_eq!(FsStatus::FileNotFound.to_errno(), libc::ENOENT);
/// assert_eq!(FsStatus::FileExists.to_ntstatus(), 0xC000_0035);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum FsStatus {
    /// The file does not exist.
    #[error("file not found")]
    FileNotFound,
    /// The directory (or a path component) does not exist.
    #[error("path not found")]
    PathNotFound,
    /// The entity already exists.
    #[error("file exists")]
    FileExists,
    /// The operation is not permitted on this entity.
    #[error("access denied")]
    AccessDenied,
    /// Unclassified failure (store unreachable, local I/O fault).
    #[error("operation failed")]
    Error,
    /// The operation is not implemented by this filesystem.
    #[error("operation not supported")]
    Unsupported,
}

/// Result type of every host-facing operation.
pub type FsResult<T> = Result<T, FsStatus>;

impl FsStatus {
    /// Converts this status to an NTSTATUS value.
    pub fn to_ntstatus(self) -> u32 {
        match self {
            Self::FileNotFound => 0xC000_0034, // STATUS_OBJECT_NAME_NOT_FOUND
            Self::PathNotFound => 0xC000_003A, // STATUS_OBJECT_PATH_NOT_FOUND
            Self::FileExists => 0xC000_0035,   // STATUS_OBJECT_NAME_COLLISION
            Self::AccessDenied => 0xC000_0022,
            Self::Error => 0xC000_0001,       // STATUS_UNSUCCESSFUL
            Self::Unsupported => 0xC000_0002, // STATUS_NOT_IMPLEMENTED
        }
    }

    /// Converts this status to a POSIX errno value.
    pub fn to_errno(self) -> i32 {
        match self {
            Self::FileNotFound | Self::PathNotFound => libc::ENOENT,
            Self::FileExists => libc::EEXIST,
            Self::AccessDenied => libc::EACCES,
            Self::Error => libc::EIO,
            Self::Unsupported => libc::ENOTSUP,
        }
    }

    /// Short name for logs and CLI output.
    pub fn name(self) -> &'static str {
        match self {
            Self::FileNotFound => "FileNotFound",
            Self::PathNotFound => "PathNotFound",
            Self::FileExists => "FileExists",
            Self::AccessDenied => "AccessDenied",
            Self::Error => "Error",
            Self::Unsupported => "Unsupported",
        }
    }

    /// Status for a missing entity of the given kind.
    pub fn not_found(kind: EntryKind) -> Self {
        match kind {
            EntryKind::File => Self::FileNotFound,
            EntryKind::Directory => Self::PathNotFound,
        }
    }
}

/// NTSTATUS of an operation result, [`STATUS_SUCCESS`] for `Ok`.
pub fn ntstatus_of<T>(result: &FsResult<T>) -> u32 {
    match result {
        Ok(_) => STATUS_SUCCESS,
        Err(status) => status.to_ntstatus(),
    }
}

impl From<&io::Error> for FsStatus {
    fn from(e: &io::Error) -> Self {
        match e.kind() {
            io::ErrorKind::NotFound => Self::FileNotFound,
            io::ErrorKind::PermissionDenied => Self::AccessDenied,
            io::ErrorKind::AlreadyExists => Self::FileExists,
            io::ErrorKind::Unsupported => Self::Unsupported,
            _ => Self::Error,
        }
    }
}

impl From<&StoreError> for FsStatus {
    fn from(e: &StoreError) -> Self {
        match e {
            StoreError::NotFound { .. } => Self::FileNotFound,
            StoreError::ContainerNotFound { .. } => Self::PathNotFound,
            StoreError::PermissionDenied { .. } => Self::AccessDenied,
            StoreError::Io { source, .. } => Self::from(source),
            StoreError::Unavailable { .. }
            | StoreError::InvalidKey { .. }
            | StoreError::Metadata(_) => Self::Error,
        }
    }
}

impl From<&BlobFsError> for FsStatus {
    fn from(e: &BlobFsError) -> Self {
        match e {
            BlobFsError::Store(e) => Self::from(e.as_ref()),
            BlobFsError::Io(e) => Self::from(e),
            BlobFsError::NotFound { kind, .. } => Self::not_found(*kind),
            BlobFsError::AlreadyExists(_) => Self::FileExists,
            BlobFsError::NotADirectory(_) => Self::FileNotFound,
            BlobFsError::NotAFile(_) | BlobFsError::NotEmpty(_) | BlobFsError::Denied(_) => {
                Self::AccessDenied
            }
            BlobFsError::Metadata(_)
            | BlobFsError::InvalidHandle(_)
            | BlobFsError::CacheRoot { .. } => Self::Error,
        }
    }
}

impl From<BlobFsError> for FsStatus {
    fn from(e: BlobFsError) -> Self {
        Self::from(&e)
    }
}
