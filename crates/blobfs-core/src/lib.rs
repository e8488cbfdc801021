//! Core building blocks for presenting a flat object store as a filesystem.
//!
//! - [`key`] maps host paths onto object-store keys, emulating directories
//!   with marker objects.
//! - [`dir_meta`] encodes the document stored in a directory's marker.
//! - [`store`] is the blocking object-store boundary plus two backends.
//! - [`error`] collects the error types.

pub mod dir_meta;
pub mod error;
pub mod key;
pub mod store;

pub use dir_meta::DirectoryMetadata;
pub use error::{DirMetadataError, StoreError, StoreResult};
pub use key::{derive_key, display_name, normalize_path, EntryKind, ObjectKey, DIR_MARKER};
pub use store::{
    AccessPolicy, ContainerOptions, ListResult, ListedObject, LocalDirStore, MemoryStore,
    ObjectProperties, ObjectStore,
};
