//! Presents one container of an object store as a mountable filesystem.
//!
//! A host driver calls into [`BlobFileSystem`] through the
//! [`FileSystemOperations`] trait. The dispatcher resolves each host path to
//! a shared [`FileNode`] through the [`NodeRegistry`], serves file content
//! from per-handle [`ScratchFile`]s and returns an [`FsStatus`] for every
//! failure.
//!
//! # Example
//!
//! ```
//! use blobfs_core::MemoryStore;
//! use blobfs_mount::{BlobFileSystem, CreateMode, FileAttributes, FileSystemOperations, MountOptions, RequestInfo};
//! use std::sync::Arc;
//!
//! let cache = tempfile::tempdir().unwrap();
//! let store = Arc::new(MemoryStore::new("photos"));
//! let fs = BlobFileSystem::new(store, MountOptions::new("photos", cache.path())).unwrap();
//! fs.mounted(&RequestInfo::directory()).unwrap();
//!
//! let mut info = RequestInfo::file();
//! fs.create_file("\\cat.txt", CreateMode::CreateNew, FileAttributes::NORMAL, &mut info).unwrap();
//! fs.write_file("\\cat.txt", b"meow", 0, &info).unwrap();
//! fs.close_file("\\cat.txt", &mut info).unwrap();
//!
//! let meta = fs.get_file_information("\\cat.txt", &RequestInfo::file()).unwrap();
//! assert_eq!(meta.length, 4);
//! ```

pub mod error;
pub mod filesystem;
pub mod handle_table;
pub mod node;
pub mod operations;
pub mod options;
pub mod pattern;
pub mod registry;
pub mod scratch;
pub mod stats;
pub mod status;

pub use error::{BlobFsError, BlobFsResult, OrStatus};
pub use filesystem::BlobFileSystem;
pub use handle_table::HandleTable;
pub use node::FileNode;
pub use operations::{
    CreateMode, DiskSpace, FileAttributes, FileInformation, FileSystemFeatures,
    FileSystemOperations, FindData, RequestInfo, VolumeInformation,
};
pub use options::MountOptions;
pub use registry::{NodeRegistry, DEFAULT_REGISTRY_CAPACITY};
pub use scratch::{ScratchFile, ScratchRoot};
pub use stats::{format_bytes, CacheStats, MountStats, MountStatsSnapshot};
pub use status::{ntstatus_of, FsResult, FsStatus, STATUS_SUCCESS};
