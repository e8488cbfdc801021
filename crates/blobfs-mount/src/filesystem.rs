//! The dispatcher: [`FileSystemOperations`] over an object store.
//!
//! # Handles
//!
//! A successful `create_file` binds a handle id into [`RequestInfo::handle`].
//! File handles own a scratch file in the cache directory:
//!
//! ```text
//! Unopened ──create_file──▶ Opened (scratch bound) ──close_file──▶ Closed
//! ```
//!
//! The scratch is filled from the remote object on its first read, write or
//! resize. Newly created and truncated files are known to be empty and skip
//! the download; append handles download eagerly. `flush_file_buffers`,
//! `cleanup` and `close_file` upload the whole scratch when it is dirty.
//!
//! # Directories
//!
//! Directories are marker objects (see [`blobfs_core::key`]). Listing uses a
//! delimiter listing under the directory prefix, so deeper keys surface as
//! sub-directory entries even when their own marker is missing.
//!
//! # Metadata
//!
//! Attributes and timestamps set by the host are kept as object metadata and
//! take precedence over the store's own times.

use crate::error::{BlobFsError, BlobFsResult, OrStatus};
use crate::handle_table::HandleTable;
use crate::node::FileNode;
use crate::operations::{
    CreateMode, DiskSpace, FileAttributes, FileInformation, FileSystemFeatures,
    FileSystemOperations, FindData, RequestInfo, VolumeInformation,
};
use crate::options::MountOptions;
use crate::pattern;
use crate::registry::NodeRegistry;
use crate::scratch::{ScratchFile, ScratchRoot};
use crate::stats::MountStats;
use crate::status::{FsResult, FsStatus};
use blobfs_core::key::{is_marker_key, STORE_SEPARATOR};
use blobfs_core::{display_name, normalize_path, EntryKind, ObjectStore, DIR_MARKER};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::{error, info, trace, warn};

/// Free space reported for the volume; the store has no quota.
const UNLIMITED_FREE_BYTES: u64 = i64::MAX.unsigned_abs();

/// Longest file name component the volume accepts.
const MAX_COMPONENT_LENGTH: u32 = 256;

const FILE_SYSTEM_NAME: &str = "NTFS";

const ATTRIBUTES_META: &str = "attributes";
const CREATION_TIME_META: &str = "creation_time";
const LAST_ACCESS_TIME_META: &str = "last_access_time";
const LAST_WRITE_TIME_META: &str = "last_write_time";

/// Locked per handle, so store round trips on one handle leave the table
/// and every other handle free.
type SharedHandle = Arc<Mutex<OpenHandle>>;

/// State behind one handle id.
#[derive(Debug)]
struct OpenHandle {
    node: Arc<FileNode>,
    /// `None` for directories.
    scratch: Option<ScratchFile>,
    /// The scratch mirrors the remote body (or is known to be newer).
    hydrated: bool,
    append: bool,
}

impl OpenHandle {
    fn directory(node: Arc<FileNode>) -> Self {
        Self {
            node,
            scratch: None,
            hydrated: true,
            append: false,
        }
    }

    /// Scratch file, downloaded from the remote object on first use.
    fn scratch(&mut self) -> BlobFsResult<&mut ScratchFile> {
        let Some(scratch) = self.scratch.as_mut() else {
            return Err(BlobFsError::NotAFile(self.node.path().to_string()));
        };
        if !self.hydrated {
            let body = self.node.download()?;
            scratch.replace_with(&body)?;
            self.hydrated = true;
            trace!(path = self.node.path(), len = body.len(), "Hydrated scratch");
        }
        Ok(scratch)
    }

    /// Uploads the scratch if dirty. Returns whether anything was uploaded.
    fn flush(&mut self) -> BlobFsResult<bool> {
        let Some(scratch) = self.scratch.as_mut() else {
            return Ok(false);
        };
        if !scratch.is_dirty() {
            return Ok(false);
        }
        let content = scratch.read_all()?;
        self.node.upload(&content)?;
        scratch.mark_clean();
        Ok(true)
    }

    /// Length of the local copy, when it is authoritative.
    fn local_length(&self) -> Option<u64> {
        match &self.scratch {
            Some(scratch) if self.hydrated => scratch.len().ok(),
            _ => None,
        }
    }
}

/// Filesystem presenting one container of an [`ObjectStore`].
#[derive(Debug)]
pub struct BlobFileSystem {
    store: Arc<dyn ObjectStore>,
    options: MountOptions,
    registry: NodeRegistry,
    scratch: ScratchRoot,
    handles: HandleTable<SharedHandle>,
    stats: Arc<MountStats>,
}

impl BlobFileSystem {
    /// Builds a filesystem over `store`.
    ///
    /// Fails if the cache directory does not exist. Nothing is sent to the
    /// store until [`mounted`](FileSystemOperations::mounted).
    pub fn new(store: Arc<dyn ObjectStore>, options: MountOptions) -> BlobFsResult<Self> {
        let scratch = ScratchRoot::open(&options.cache_dir)?;
        if store.container() != options.container {
            warn!(
                store = store.container(),
                configured = %options.container,
                "Store container differs from configured container"
            );
        }
        let stats = Arc::new(MountStats::new());
        let registry = NodeRegistry::new(
            Arc::clone(&store),
            options.registry_capacity,
            Arc::clone(&stats),
        );
        Ok(Self {
            store,
            options,
            registry,
            scratch,
            handles: HandleTable::new(),
            stats,
        })
    }

    pub fn stats(&self) -> &Arc<MountStats> {
        &self.stats
    }

    pub fn registry(&self) -> &NodeRegistry {
        &self.registry
    }

    pub fn options(&self) -> &MountOptions {
        &self.options
    }

    /// Number of handles not yet closed.
    pub fn open_handle_count(&self) -> usize {
        self.handles.len()
    }

    fn resolve(&self, op: &'static str, path: &str, directory_hint: bool) -> FsResult<Arc<FileNode>> {
        self.registry.resolve(path, directory_hint).or_status(op, path)
    }

    fn with_handle<T>(
        &self,
        op: &'static str,
        path: &str,
        info: &RequestInfo,
        f: impl FnOnce(&mut OpenHandle) -> BlobFsResult<T>,
    ) -> FsResult<T> {
        let id = info
            .handle
            .ok_or(BlobFsError::InvalidHandle(0))
            .or_status(op, path)?;
        let shared = self
            .handles
            .get(id)
            .ok_or(BlobFsError::InvalidHandle(id))
            .or_status(op, path)?;
        let mut handle = shared.lock();
        f(&mut handle).or_status(op, path)
    }

    fn prepare_mount(&self) -> BlobFsResult<(bool, bool)> {
        self.stats.record_request();
        let container_created = self
            .store
            .create_container_if_absent(&self.options.container_options())?;
        let root = self.registry.resolve("/", true)?;
        let root_created = root.initialize_if_absent()?;
        Ok((container_created, root_created))
    }

    fn open_file(&self, node: Arc<FileNode>, mode: CreateMode) -> BlobFsResult<(OpenHandle, bool)> {
        let (hydrated, append, created) = match mode {
            CreateMode::Open => {
                require_exists(&node)?;
                (false, false, false)
            }
            CreateMode::Append => {
                require_exists(&node)?;
                (false, true, false)
            }
            CreateMode::CreateNew => {
                // The conditional upload settles races with other creators
                if node.exists()? || !node.create_empty()? {
                    return Err(BlobFsError::AlreadyExists(node.path().to_string()));
                }
                (true, false, true)
            }
            CreateMode::Create | CreateMode::OpenOrCreate => {
                let created = node.create_empty()?;
                if !created && !node.exists()? {
                    return Err(not_found(&node));
                }
                (created, false, created)
            }
            CreateMode::Truncate => {
                node.delete()?;
                node.create_empty()?;
                (true, false, true)
            }
        };

        let scratch = self.scratch.create(node.name())?;
        let mut handle = OpenHandle {
            node,
            scratch: Some(scratch),
            hydrated,
            append,
        };
        if append {
            handle.scratch()?;
        }
        Ok((handle, created))
    }

    fn open_directory(
        &self,
        node: Arc<FileNode>,
        mode: CreateMode,
    ) -> BlobFsResult<(OpenHandle, bool)> {
        let created = match mode {
            CreateMode::Open => {
                require_exists(&node)?;
                false
            }
            CreateMode::CreateNew => {
                if node.exists()? || !node.initialize_if_absent()? {
                    return Err(BlobFsError::AlreadyExists(node.path().to_string()));
                }
                true
            }
            CreateMode::Create | CreateMode::OpenOrCreate => node.initialize_if_absent()?,
            CreateMode::Truncate | CreateMode::Append => {
                return Err(BlobFsError::Denied(format!(
                    "{mode:?} on directory {}",
                    node.path()
                )));
            }
        };
        Ok((OpenHandle::directory(node), created))
    }

    fn file_information(&self, node: &FileNode, info: &RequestInfo) -> BlobFsResult<FileInformation> {
        require_exists(node)?;
        let props = node
            .properties()
            .map_err(|e| BlobFsError::Denied(format!("properties of {}: {e}", node.path())))?;

        let local = info.handle.and_then(|id| {
            let shared = self.handles.get(id)?;
            let handle = shared.lock();
            if handle.node.key() == node.key() {
                handle.local_length()
            } else {
                None
            }
        });
        let length = match local {
            Some(len) => len,
            None if node.is_directory() => node.size()?,
            None => props.content_length,
        };

        let meta = &props.metadata;
        Ok(FileInformation {
            file_name: node.name().to_string(),
            attributes: attributes_of(node.kind(), meta),
            creation_time: stored_time(meta, CREATION_TIME_META).or(props.created),
            last_access_time: stored_time(meta, LAST_ACCESS_TIME_META).or(props.last_modified),
            last_write_time: stored_time(meta, LAST_WRITE_TIME_META).or(props.last_modified),
            length,
        })
    }

    fn list_directory(&self, node: &FileNode, pattern: &str) -> BlobFsResult<Vec<FindData>> {
        if !node.is_directory() {
            return Err(if node.exists()? {
                BlobFsError::NotADirectory(node.path().to_string())
            } else {
                BlobFsError::NotFound {
                    path: node.path().to_string(),
                    kind: EntryKind::Directory,
                }
            });
        }
        require_exists(node)?;

        self.stats.record_request();
        let listing = self
            .store
            .list_with_delimiter(node.listing_prefix(), STORE_SEPARATOR)?;

        let mut entries = Vec::with_capacity(listing.objects.len() + listing.common_prefixes.len());
        for object in listing.objects {
            if is_marker_key(&object.key) {
                continue;
            }
            let name = display_name(&object.key);
            if !pattern::matches(pattern, name) {
                continue;
            }
            let props = object.properties;
            let meta = &props.metadata;
            entries.push(FindData {
                file_name: name.to_string(),
                attributes: attributes_of(EntryKind::File, meta),
                creation_time: stored_time(meta, CREATION_TIME_META).or(props.created),
                last_access_time: stored_time(meta, LAST_ACCESS_TIME_META).or(props.last_modified),
                last_write_time: stored_time(meta, LAST_WRITE_TIME_META).or(props.last_modified),
                length: Some(props.content_length),
            });
        }
        for prefix in &listing.common_prefixes {
            let name = display_name(prefix);
            if name == DIR_MARKER || !pattern::matches(pattern, name) {
                continue;
            }
            entries.push(FindData {
                file_name: name.to_string(),
                attributes: FileAttributes::DIRECTORY,
                creation_time: None,
                last_access_time: None,
                last_write_time: None,
                length: None,
            });
        }
        entries.sort_by(|a, b| a.file_name.cmp(&b.file_name));
        Ok(entries)
    }

    fn remove_file(&self, node: &FileNode) -> BlobFsResult<()> {
        if node.is_directory() {
            return Err(BlobFsError::NotAFile(node.path().to_string()));
        }
        if !node.delete()? {
            return Err(not_found(node));
        }
        self.registry.invalidate(node.path());
        Ok(())
    }

    fn remove_directory(&self, node: &FileNode) -> BlobFsResult<()> {
        if node.path() == "/" {
            return Err(BlobFsError::Denied("the root directory cannot be deleted".into()));
        }
        if !node.is_directory() {
            return Err(BlobFsError::NotADirectory(node.path().to_string()));
        }
        require_exists(node)?;

        self.stats.record_request();
        let children = self.store.list(node.listing_prefix())?;
        if children.iter().any(|o| o.key != node.key().as_str()) {
            return Err(BlobFsError::NotEmpty(node.path().to_string()));
        }
        node.delete()?;
        self.registry.invalidate_prefix(node.path());
        Ok(())
    }

    fn move_entity(&self, src: &FileNode, new_path: &str, replace: bool) -> BlobFsResult<()> {
        require_exists(src)?;
        let target = normalize_path(new_path);
        if target == src.path() {
            return Ok(());
        }

        let dst = self.registry.resolve(new_path, src.is_directory())?;
        let dst_exists = dst.exists()?;
        if dst_exists && !replace {
            return Err(BlobFsError::AlreadyExists(target));
        }

        if src.is_directory() {
            if src.path() == "/" || target.starts_with(&format!("{}/", src.path())) {
                return Err(BlobFsError::Denied(format!(
                    "cannot move {} into {target}",
                    src.path()
                )));
            }
            if dst_exists || !dst.is_directory() {
                return Err(BlobFsError::Denied(format!("cannot replace {target}")));
            }
            let from = src.listing_prefix();
            let to = dst.listing_prefix();
            self.stats.record_request();
            for object in self.store.list(from)? {
                let moved = format!("{to}{}", &object.key[from.len()..]);
                self.stats.record_request();
                self.store.rename(&object.key, &moved)?;
            }
        } else {
            if dst.is_directory() {
                return Err(BlobFsError::Denied(format!("{target} is a directory")));
            }
            self.stats.record_request();
            self.store.rename(src.key().as_str(), dst.key().as_str())?;
        }

        self.registry.invalidate_prefix(src.path());
        self.registry.invalidate_prefix(&target);
        Ok(())
    }

    fn update_metadata(
        &self,
        node: &FileNode,
        update: impl FnOnce(&mut BTreeMap<String, String>),
    ) -> BlobFsResult<()> {
        require_exists(node)?;
        let mut meta = node.properties()?.metadata;
        update(&mut meta);
        node.set_metadata(&meta)?;
        Ok(())
    }
}

impl FileSystemOperations for BlobFileSystem {
    fn mounted(&self, _info: &RequestInfo) -> FsResult<()> {
        match self.prepare_mount() {
            Ok((container_created, root_created)) => {
                info!(
                    container = self.store.container(),
                    cache_dir = %self.scratch.path().display(),
                    container_created,
                    root_created,
                    "Mounted"
                );
                Ok(())
            }
            Err(e) => {
                error!(container = self.store.container(), error = %e, "Mount failed");
                Err(FsStatus::Error)
            }
        }
    }

    fn unmounted(&self, _info: &RequestInfo) -> FsResult<()> {
        for (id, shared) in self.handles.drain() {
            let mut handle = shared.lock();
            if let Err(e) = handle.flush() {
                warn!(handle = id, path = handle.node.path(), error = %e, "Discarding unflushed data");
            }
            self.stats.record_close();
        }
        self.registry.clear();
        info!(container = self.store.container(), "Unmounted");
        Ok(())
    }

    fn create_file(
        &self,
        path: &str,
        mode: CreateMode,
        attributes: FileAttributes,
        info: &mut RequestInfo,
    ) -> FsResult<()> {
        trace!(path, ?mode, is_directory = info.is_directory, "create_file");
        let node = self.resolve("create_file", path, info.is_directory)?;
        let is_directory = node.is_directory();

        let opened = if is_directory {
            self.open_directory(node, mode)
        } else {
            self.open_file(node, mode)
        };
        let (handle, created) = opened.or_status("create_file", path)?;

        let extra = attributes - (FileAttributes::NORMAL | FileAttributes::DIRECTORY | FileAttributes::ARCHIVE);
        if created && !extra.is_empty() {
            let node = Arc::clone(&handle.node);
            self.update_metadata(&node, |meta| {
                meta.insert(ATTRIBUTES_META.to_string(), attributes.bits().to_string());
            })
            .or_status("create_file", path)?;
        }

        info.is_directory = is_directory;
        info.handle = Some(self.handles.insert(Arc::new(Mutex::new(handle))));
        self.stats.record_open();
        Ok(())
    }

    fn cleanup(&self, path: &str, info: &mut RequestInfo) -> FsResult<()> {
        trace!(path, handle = ?info.handle, delete_on_close = info.delete_on_close, "cleanup");
        let Some(id) = info.handle else {
            return Ok(());
        };
        let delete_on_close = info.delete_on_close;
        let node = self.with_handle("cleanup", path, info, |handle| {
            if delete_on_close {
                // Pending writes die with the entity
                if let Some(scratch) = handle.scratch.as_mut() {
                    scratch.mark_clean();
                }
            } else {
                handle.flush()?;
            }
            Ok(Arc::clone(&handle.node))
        })?;

        if delete_on_close {
            trace!(path, handle = id, "Deleting on close");
            let removed = if node.is_directory() {
                self.remove_directory(&node)
            } else {
                self.remove_file(&node)
            };
            removed.or_status("cleanup", path)?;
        }
        Ok(())
    }

    fn close_file(&self, path: &str, info: &mut RequestInfo) -> FsResult<()> {
        trace!(path, handle = ?info.handle, "close_file");
        let Some(id) = info.handle.take() else {
            return Ok(());
        };
        let shared = self
            .handles
            .remove(id)
            .ok_or(BlobFsError::InvalidHandle(id))
            .or_status("close_file", path)?;
        self.stats.record_close();
        // The scratch file goes away with the last reference, whatever flush returns
        let flushed = shared.lock().flush();
        flushed.map(|_| ()).or_status("close_file", path)
    }

    fn read_file(
        &self,
        path: &str,
        buf: &mut [u8],
        offset: u64,
        info: &RequestInfo,
    ) -> FsResult<usize> {
        trace!(path, offset, len = buf.len(), "read_file");
        self.with_handle("read_file", path, info, |handle| {
            require_exists(&handle.node)?;
            let scratch = handle.scratch()?;
            Ok(scratch.read_at(offset, buf)?)
        })
    }

    fn write_file(
        &self,
        path: &str,
        buf: &[u8],
        offset: u64,
        info: &RequestInfo,
    ) -> FsResult<usize> {
        trace!(path, offset, len = buf.len(), "write_file");
        self.with_handle("write_file", path, info, |handle| {
            let append = handle.append;
            let scratch = handle.scratch()?;
            let offset = if append { scratch.len()? } else { offset };
            Ok(scratch.write_at(offset, buf)?)
        })
    }

    fn flush_file_buffers(&self, path: &str, info: &RequestInfo) -> FsResult<()> {
        trace!(path, "flush_file_buffers");
        self.with_handle("flush_file_buffers", path, info, |handle| {
            handle.flush().map(|_| ())
        })
    }

    fn get_file_information(&self, path: &str, info: &RequestInfo) -> FsResult<FileInformation> {
        trace!(path, is_directory = info.is_directory, "get_file_information");
        let node = self.resolve("get_file_information", path, info.is_directory)?;
        self.file_information(&node, info)
            .or_status("get_file_information", path)
    }

    fn find_files_with_pattern(
        &self,
        path: &str,
        pattern: &str,
        _info: &RequestInfo,
    ) -> FsResult<Vec<FindData>> {
        trace!(path, pattern, "find_files_with_pattern");
        // Resolve without a hint so a file at `path` is reported as such
        let node = self.resolve("find_files", path, false)?;
        self.list_directory(&node, pattern).or_status("find_files", path)
    }

    fn set_file_attributes(
        &self,
        path: &str,
        attributes: FileAttributes,
        info: &RequestInfo,
    ) -> FsResult<()> {
        trace!(path, attributes = attributes.bits(), "set_file_attributes");
        if attributes.is_empty() {
            return Ok(());
        }
        let node = self.resolve("set_file_attributes", path, info.is_directory)?;
        self.update_metadata(&node, |meta| {
            meta.insert(ATTRIBUTES_META.to_string(), attributes.bits().to_string());
        })
        .or_status("set_file_attributes", path)
    }

    fn set_file_time(
        &self,
        path: &str,
        creation_time: Option<SystemTime>,
        last_access_time: Option<SystemTime>,
        last_write_time: Option<SystemTime>,
        info: &RequestInfo,
    ) -> FsResult<()> {
        trace!(path, "set_file_time");
        let updates: Vec<(&str, SystemTime)> = [
            (CREATION_TIME_META, creation_time),
            (LAST_ACCESS_TIME_META, last_access_time),
            (LAST_WRITE_TIME_META, last_write_time),
        ]
        .into_iter()
        .filter_map(|(key, time)| time.map(|t| (key, t)))
        .collect();
        if updates.is_empty() {
            return Ok(());
        }

        let node = self.resolve("set_file_time", path, info.is_directory)?;
        self.update_metadata(&node, |meta| {
            for (key, time) in updates {
                meta.insert(key.to_string(), encode_time(time));
            }
        })
        .or_status("set_file_time", path)
    }

    fn delete_file(&self, path: &str, _info: &RequestInfo) -> FsResult<()> {
        trace!(path, "delete_file");
        let node = self.resolve("delete_file", path, false)?;
        self.remove_file(&node).or_status("delete_file", path)
    }

    fn delete_directory(&self, path: &str, _info: &RequestInfo) -> FsResult<()> {
        trace!(path, "delete_directory");
        let node = self.resolve("delete_directory", path, true)?;
        self.remove_directory(&node).or_status("delete_directory", path)
    }

    fn move_file(
        &self,
        old_path: &str,
        new_path: &str,
        replace: bool,
        info: &RequestInfo,
    ) -> FsResult<()> {
        trace!(old_path, new_path, replace, "move_file");
        let src = self.resolve("move_file", old_path, info.is_directory)?;
        self.move_entity(&src, new_path, replace)
            .or_status("move_file", old_path)
    }

    fn set_end_of_file(&self, path: &str, length: u64, info: &RequestInfo) -> FsResult<()> {
        trace!(path, length, "set_end_of_file");
        self.with_handle("set_end_of_file", path, info, |handle| {
            handle.scratch()?.set_len(length)?;
            Ok(())
        })
    }

    fn set_allocation_size(&self, path: &str, length: u64, info: &RequestInfo) -> FsResult<()> {
        trace!(path, length, "set_allocation_size");
        self.with_handle("set_allocation_size", path, info, |handle| {
            let scratch = handle.scratch()?;
            // Allocation never grows the file
            if length < scratch.len()? {
                scratch.set_len(length)?;
            }
            Ok(())
        })
    }

    fn get_disk_free_space(&self, _info: &RequestInfo) -> FsResult<DiskSpace> {
        trace!("get_disk_free_space");
        let root = self.resolve("get_disk_free_space", "/", true)?;
        let total = root.size().or_status("get_disk_free_space", "/")?;
        Ok(DiskSpace {
            free_bytes_available: UNLIMITED_FREE_BYTES,
            total_number_of_bytes: total,
            total_number_of_free_bytes: UNLIMITED_FREE_BYTES,
        })
    }

    fn get_volume_information(&self, _info: &RequestInfo) -> FsResult<VolumeInformation> {
        trace!("get_volume_information");
        Ok(VolumeInformation {
            volume_label: self.options.container.clone(),
            features: FileSystemFeatures::CASE_PRESERVED_NAMES
                | FileSystemFeatures::CASE_SENSITIVE_SEARCH
                | FileSystemFeatures::PERSISTENT_ACLS
                | FileSystemFeatures::SUPPORTS_REMOTE_STORAGE
                | FileSystemFeatures::UNICODE_ON_DISK,
            file_system_name: FILE_SYSTEM_NAME.to_string(),
            maximum_component_length: MAX_COMPONENT_LENGTH,
        })
    }
}

fn not_found(node: &FileNode) -> BlobFsError {
    BlobFsError::NotFound {
        path: node.path().to_string(),
        kind: node.kind(),
    }
}

fn require_exists(node: &FileNode) -> BlobFsResult<()> {
    if node.exists()? {
        Ok(())
    } else {
        Err(not_found(node))
    }
}

/// Stored attributes, or the default for the kind. Directories always carry
/// the directory bit and files never do.
fn attributes_of(kind: EntryKind, meta: &BTreeMap<String, String>) -> FileAttributes {
    let stored = meta
        .get(ATTRIBUTES_META)
        .and_then(|v| v.parse::<u32>().ok())
        .map(FileAttributes::from_bits_truncate)
        .filter(|a| !a.is_empty());
    match kind {
        EntryKind::Directory => {
            (stored.unwrap_or(FileAttributes::DIRECTORY) - FileAttributes::NORMAL)
                | FileAttributes::DIRECTORY
        }
        EntryKind::File => {
            let attrs = stored.unwrap_or(FileAttributes::NORMAL) - FileAttributes::DIRECTORY;
            if attrs.is_empty() {
                FileAttributes::NORMAL
            } else {
                attrs
            }
        }
    }
}

/// Nanoseconds since the epoch, as text.
fn encode_time(time: SystemTime) -> String {
    time.duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_nanos())
        .to_string()
}

fn stored_time(meta: &BTreeMap<String, String>, key: &str) -> Option<SystemTime> {
    let nanos: u128 = meta.get(key)?.parse().ok()?;
    let secs = u64::try_from(nanos / 1_000_000_000).ok()?;
    let subsec = u32::try_from(nanos % 1_000_000_000).ok()?;
    UNIX_EPOCH.checked_add(Duration::new(secs, subsec))
}
