//! Host-facing filesystem operation surface.
//!
//! [`FileSystemOperations`] is what a host driver (Dokan, WinFsp, a FUSE
//! shim, the CLI) calls. Paths are host-native (`\` or `/` separated). Each
//! call carries a [`RequestInfo`] holding the caller's directory hint and
//! the handle bound by [`create_file`](FileSystemOperations::create_file).

use crate::status::{FsResult, FsStatus};
use bitflags::bitflags;
use std::time::SystemTime;

/// Disposition requested by `create_file`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CreateMode {
    /// Open an existing entity.
    Open,
    /// Create; fail if it already exists.
    CreateNew,
    /// Create if absent, otherwise open.
    Create,
    /// Open if present, otherwise create.
    OpenOrCreate,
    /// Replace with an empty file.
    Truncate,
    /// Open an existing file; writes go to the end.
    Append,
}

bitflags! {
    /// File attribute bits, using the Windows values.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct FileAttributes: u32 {
        const READONLY = 0x0000_0001;
        const HIDDEN = 0x0000_0002;
        const SYSTEM = 0x0000_0004;
        const DIRECTORY = 0x0000_0010;
        const ARCHIVE = 0x0000_0020;
        const NORMAL = 0x0000_0080;
        const TEMPORARY = 0x0000_0100;
        const OFFLINE = 0x0000_1000;
        const NOT_CONTENT_INDEXED = 0x0000_2000;
    }
}

bitflags! {
    /// Volume capability bits reported by `get_volume_information`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct FileSystemFeatures: u32 {
        const CASE_SENSITIVE_SEARCH = 0x0000_0001;
        const CASE_PRESERVED_NAMES = 0x0000_0002;
        const UNICODE_ON_DISK = 0x0000_0004;
        const PERSISTENT_ACLS = 0x0000_0008;
        const SUPPORTS_REMOTE_STORAGE = 0x0000_0100;
    }
}

/// Per-call context supplied by the host.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestInfo {
    /// The host believes the path names a directory. `create_file` updates
    /// it to the resolved kind.
    pub is_directory: bool,
    /// Handle bound by a successful `create_file`.
    pub handle: Option<u64>,
    /// Delete the entity when the handle is cleaned up.
    pub delete_on_close: bool,
}

impl RequestInfo {
    /// Context for a file request.
    pub fn file() -> Self {
        Self::default()
    }

    /// Context for a directory request.
    pub fn directory() -> Self {
        Self {
            is_directory: true,
            ..Self::default()
        }
    }
}

/// Result of `get_file_information`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInformation {
    pub file_name: String,
    pub attributes: FileAttributes,
    pub creation_time: Option<SystemTime>,
    pub last_access_time: Option<SystemTime>,
    pub last_write_time: Option<SystemTime>,
    pub length: u64,
}

impl FileInformation {
    pub fn is_directory(&self) -> bool {
        self.attributes.contains(FileAttributes::DIRECTORY)
    }
}

/// One directory entry returned by enumeration.
///
/// Entries derived from key prefixes carry no size or times.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FindData {
    pub file_name: String,
    pub attributes: FileAttributes,
    pub creation_time: Option<SystemTime>,
    pub last_access_time: Option<SystemTime>,
    pub last_write_time: Option<SystemTime>,
    pub length: Option<u64>,
}

impl FindData {
    pub fn is_directory(&self) -> bool {
        self.attributes.contains(FileAttributes::DIRECTORY)
    }
}

/// Result of `get_disk_free_space`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiskSpace {
    pub free_bytes_available: u64,
    pub total_number_of_bytes: u64,
    pub total_number_of_free_bytes: u64,
}

/// Result of `get_volume_information`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumeInformation {
    pub volume_label: String,
    pub features: FileSystemFeatures,
    pub file_system_name: String,
    pub maximum_component_length: u32,
}

/// Filesystem operations a host driver dispatches.
///
/// Byte-range locking, security descriptors and alternate streams are not
/// provided; their default implementations return
/// [`FsStatus::Unsupported`].
pub trait FileSystemOperations: Send + Sync {
    /// The volume is mounted. Prepares the container and root directory.
    fn mounted(&self, info: &RequestInfo) -> FsResult<()>;

    /// The volume is being unmounted.
    fn unmounted(&self, info: &RequestInfo) -> FsResult<()>;

    /// Opens or creates `path`, binding a handle into `info`.
    fn create_file(
        &self,
        path: &str,
        mode: CreateMode,
        attributes: FileAttributes,
        info: &mut RequestInfo,
    ) -> FsResult<()>;

    /// Last user handle closed; flushes and honors `delete_on_close`.
    fn cleanup(&self, path: &str, info: &mut RequestInfo) -> FsResult<()>;

    /// Handle released; local cache resources are freed.
    fn close_file(&self, path: &str, info: &mut RequestInfo) -> FsResult<()>;

    fn read_file(&self, path: &str, buf: &mut [u8], offset: u64, info: &RequestInfo)
    -> FsResult<usize>;

    fn write_file(&self, path: &str, buf: &[u8], offset: u64, info: &RequestInfo)
    -> FsResult<usize>;

    /// Uploads locally written data.
    fn flush_file_buffers(&self, path: &str, info: &RequestInfo) -> FsResult<()>;

    fn get_file_information(&self, path: &str, info: &RequestInfo) -> FsResult<FileInformation>;

    /// Lists every entry of a directory.
    fn find_files(&self, path: &str, info: &RequestInfo) -> FsResult<Vec<FindData>> {
        self.find_files_with_pattern(path, "*", info)
    }

    /// Lists the entries of a directory whose names match `pattern`.
    fn find_files_with_pattern(
        &self,
        path: &str,
        pattern: &str,
        info: &RequestInfo,
    ) -> FsResult<Vec<FindData>>;

    fn set_file_attributes(
        &self,
        path: &str,
        attributes: FileAttributes,
        info: &RequestInfo,
    ) -> FsResult<()>;

    /// Sets whichever timestamps are `Some`.
    fn set_file_time(
        &self,
        path: &str,
        creation_time: Option<SystemTime>,
        last_access_time: Option<SystemTime>,
        last_write_time: Option<SystemTime>,
        info: &RequestInfo,
    ) -> FsResult<()>;

    fn delete_file(&self, path: &str, info: &RequestInfo) -> FsResult<()>;

    fn delete_directory(&self, path: &str, info: &RequestInfo) -> FsResult<()>;

    fn move_file(
        &self,
        old_path: &str,
        new_path: &str,
        replace: bool,
        info: &RequestInfo,
    ) -> FsResult<()>;

    fn set_end_of_file(&self, path: &str, length: u64, info: &RequestInfo) -> FsResult<()>;

    fn set_allocation_size(&self, path: &str, length: u64, info: &RequestInfo) -> FsResult<()>;

    fn lock_file(&self, _path: &str, _offset: u64, _length: u64, _info: &RequestInfo) -> FsResult<()> {
        Err(FsStatus::Unsupported)
    }

    fn unlock_file(
        &self,
        _path: &str,
        _offset: u64,
        _length: u64,
        _info: &RequestInfo,
    ) -> FsResult<()> {
        Err(FsStatus::Unsupported)
    }

    /// Returns the self-relative security descriptor of `path`.
    fn get_file_security(&self, _path: &str, _info: &RequestInfo) -> FsResult<Vec<u8>> {
        Err(FsStatus::Unsupported)
    }

    fn set_file_security(&self, _path: &str, _descriptor: &[u8], _info: &RequestInfo) -> FsResult<()> {
        Err(FsStatus::Unsupported)
    }

    fn find_streams(&self, _path: &str, _info: &RequestInfo) -> FsResult<Vec<FindData>> {
        Err(FsStatus::Unsupported)
    }

    fn get_disk_free_space(&self, info: &RequestInfo) -> FsResult<DiskSpace>;

    fn get_volume_information(&self, info: &RequestInfo) -> FsResult<VolumeInformation>;
}
