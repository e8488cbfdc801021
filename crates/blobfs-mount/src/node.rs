//! One resolved filesystem entity bound to its object key.
//!
//! A node caches nothing about the remote object: existence and size are
//! queried on every call, so a node stays valid while other clients change
//! the store.

use crate::error::{BlobFsError, BlobFsResult};
use crate::stats::MountStats;
use blobfs_core::{DirectoryMetadata, EntryKind, ObjectKey, ObjectProperties, ObjectStore, StoreResult};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// A file or directory resolved from a host path.
pub struct FileNode {
    path: String,
    key: ObjectKey,
    store: Arc<dyn ObjectStore>,
    stats: Arc<MountStats>,
}

impl fmt::Debug for FileNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileNode")
            .field("path", &self.path)
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

impl FileNode {
    /// Binds `path` (normalized) to `key`.
    pub fn new(
        path: impl Into<String>,
        key: ObjectKey,
        store: Arc<dyn ObjectStore>,
        stats: Arc<MountStats>,
    ) -> Self {
        Self {
            path: path.into(),
            key,
            store,
            stats,
        }
    }

    /// Normalized host path.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn key(&self) -> &ObjectKey {
        &self.key
    }

    pub fn kind(&self) -> EntryKind {
        self.key.kind()
    }

    #[inline]
    pub fn is_directory(&self) -> bool {
        self.key.is_directory()
    }

    /// Last path segment; `/` for the root.
    pub fn name(&self) -> &str {
        match self.path.rsplit('/').next() {
            Some(name) if !name.is_empty() => name,
            _ => "/",
        }
    }

    /// Prefix under which this directory's children are stored.
    pub fn listing_prefix(&self) -> &str {
        self.key.listing_prefix()
    }

    /// Live existence check against the store.
    pub fn exists(&self) -> StoreResult<bool> {
        self.stats.record_request();
        self.store.exists(self.key.as_str())
    }

    /// Uploads an empty body if nothing exists under the key.
    ///
    /// Returns true if this call created the object.
    pub fn create_empty(&self) -> StoreResult<bool> {
        self.stats.record_request();
        let created = self.store.upload_if_absent(self.key.as_str(), &[])?;
        debug!(key = %self.key, created, "create_empty");
        Ok(created)
    }

    /// Makes sure a directory marker exists.
    ///
    /// A marker created by this call holds the zero-usage document; an
    /// existing marker is left alone. Returns true if the marker was created.
    pub fn initialize_if_absent(&self) -> BlobFsResult<bool> {
        if !self.is_directory() {
            return Err(BlobFsError::NotADirectory(self.path.clone()));
        }
        let body = DirectoryMetadata::empty().encode();
        self.stats.record_upload(body.len() as u64);
        let created = self.store.upload_if_absent(self.key.as_str(), &body)?;
        debug!(key = %self.key, created, "initialize_if_absent");
        Ok(created)
    }

    /// File: content length. Directory: `TotalBytesUsed` of the marker.
    pub fn size(&self) -> BlobFsResult<u64> {
        if self.is_directory() {
            let body = self.download()?;
            Ok(DirectoryMetadata::decode(&body)?.total_bytes_used)
        } else {
            Ok(self.properties()?.content_length)
        }
    }

    pub fn properties(&self) -> StoreResult<ObjectProperties> {
        self.stats.record_request();
        self.store.get_properties(self.key.as_str())
    }

    pub fn download(&self) -> StoreResult<Vec<u8>> {
        let body = self.store.download(self.key.as_str());
        let len = body.as_ref().map_or(0, Vec::len);
        self.stats.record_download(len as u64);
        debug!(key = %self.key, len, "download");
        body
    }

    /// Replaces the whole object body.
    pub fn upload(&self, data: &[u8]) -> StoreResult<()> {
        self.stats.record_upload(data.len() as u64);
        debug!(key = %self.key, len = data.len(), "upload");
        self.store.upload(self.key.as_str(), data)
    }

    /// Deletes the object if present; returns whether it existed.
    pub fn delete(&self) -> StoreResult<bool> {
        self.stats.record_request();
        let deleted = self.store.delete(self.key.as_str())?;
        debug!(key = %self.key, deleted, "delete");
        Ok(deleted)
    }

    pub fn set_metadata(&self, metadata: &BTreeMap<String, String>) -> StoreResult<()> {
        self.stats.record_request();
        self.store.set_metadata(self.key.as_str(), metadata)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blobfs_core::{derive_key, MemoryStore};

    fn node(store: &Arc<MemoryStore>, path: &str, dir: bool) -> FileNode {
        let key = derive_key(store.container(), path, dir);
        FileNode::new(
            blobfs_core::normalize_path(path),
            key,
            Arc::clone(store) as Arc<dyn ObjectStore>,
            Arc::new(MountStats::new()),
        )
    }

    #[test]
    fn test_create_empty_is_idempotent() {
        let store = Arc::new(MemoryStore::new("c"));
        let n = node(&store, "/a.txt", false);
        assert!(!n.exists().unwrap());
        assert!(n.create_empty().unwrap());
        assert!(!n.create_empty().unwrap());
        assert!(n.exists().unwrap());
        assert_eq!(n.size().unwrap(), 0);
    }

    #[test]
    fn test_create_empty_keeps_content() {
        let store = Arc::new(MemoryStore::new("c"));
        let n = node(&store, "/a.txt", false);
        n.upload(b"data").unwrap();
        assert!(!n.create_empty().unwrap());
        assert_eq!(n.download().unwrap(), b"data");
    }

    #[test]
    fn test_initialize_writes_zero_document() {
        let store = Arc::new(MemoryStore::new("c"));
        let n = node(&store, "/docs", true);
        assert!(n.initialize_if_absent().unwrap());
        assert_eq!(store.download("c/docs/.dir").unwrap(), br#"{"TotalBytesUsed":0}"#);
        assert_eq!(n.size().unwrap(), 0);
    }

    #[test]
    fn test_initialize_keeps_existing_usage() {
        let store = Arc::new(MemoryStore::new("c"));
        store
            .upload("c/docs/.dir", &DirectoryMetadata::new(99).encode())
            .unwrap();
        let n = node(&store, "/docs", true);
        assert!(!n.initialize_if_absent().unwrap());
        assert_eq!(n.size().unwrap(), 99);
    }

    #[test]
    fn test_initialize_on_file_fails() {
        let store = Arc::new(MemoryStore::new("c"));
        let n = node(&store, "/a.txt", false);
        assert!(matches!(
            n.initialize_if_absent(),
            Err(BlobFsError::NotADirectory(_))
        ));
    }

    #[test]
    fn test_size_of_empty_marker() {
        let store = Arc::new(MemoryStore::new("c"));
        store.upload("c/docs/.dir", b"").unwrap();
        assert_eq!(node(&store, "/docs", true).size().unwrap(), 0);
    }

    #[test]
    fn test_size_of_corrupt_marker() {
        let store = Arc::new(MemoryStore::new("c"));
        store.upload("c/docs/.dir", b"{oops").unwrap();
        assert!(matches!(
            node(&store, "/docs", true).size(),
            Err(BlobFsError::Metadata(_))
        ));
    }

    #[test]
    fn test_name() {
        let store = Arc::new(MemoryStore::new("c"));
        assert_eq!(node(&store, "\\docs\\a.txt", false).name(), "a.txt");
        assert_eq!(node(&store, "\\", true).name(), "/");
        assert_eq!(node(&store, "/docs", true).listing_prefix(), "c/docs/");
    }

    #[test]
    fn test_size_does_not_cache() {
        let store = Arc::new(MemoryStore::new("c"));
        let n = node(&store, "/a.txt", false);
        n.upload(b"1").unwrap();
        assert_eq!(n.size().unwrap(), 1);
        store.upload("c/a.txt", b"123").unwrap();
        assert_eq!(n.size().unwrap(), 3);
    }
}
