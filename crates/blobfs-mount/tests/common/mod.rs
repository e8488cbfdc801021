//! Shared helpers for blobfs-mount integration tests.

#![allow(dead_code)]

use blobfs_core::{MemoryStore, ObjectStore};
use blobfs_mount::{
    BlobFileSystem, CreateMode, FileAttributes, FileSystemOperations, FsResult, MountOptions,
    RequestInfo,
};
use std::sync::Arc;
use tempfile::TempDir;

pub const CONTAINER: &str = "test1";

/// A mounted filesystem over an in-memory store.
pub struct TestMount {
    pub store: Arc<MemoryStore>,
    pub fs: BlobFileSystem,
    // Keeps the scratch directory alive
    pub cache: TempDir,
}

impl TestMount {
    pub fn new() -> Self {
        Self::with_options(|o| o)
    }

    pub fn with_options(configure: impl FnOnce(MountOptions) -> MountOptions) -> Self {
        let store = Arc::new(MemoryStore::new(CONTAINER));
        Self::over(store, configure)
    }

    /// Mounts over an existing store.
    pub fn over(
        store: Arc<MemoryStore>,
        configure: impl FnOnce(MountOptions) -> MountOptions,
    ) -> Self {
        let cache = TempDir::new().expect("cache dir");
        let options = configure(MountOptions::new(CONTAINER, cache.path()));
        let fs = BlobFileSystem::new(Arc::clone(&store) as Arc<dyn ObjectStore>, options)
            .expect("filesystem");
        fs.mounted(&RequestInfo::directory()).expect("mount");
        Self { store, fs, cache }
    }

    pub fn create(&self, path: &str, mode: CreateMode, is_directory: bool) -> FsResult<RequestInfo> {
        let mut info = RequestInfo {
            is_directory,
            ..RequestInfo::default()
        };
        self.fs
            .create_file(path, mode, FileAttributes::NORMAL, &mut info)?;
        Ok(info)
    }

    /// Creates (or replaces) a file with `content` and closes it.
    pub fn write(&self, path: &str, content: &[u8]) {
        let mut info = self.create(path, CreateMode::Truncate, false).expect("open");
        let n = self.fs.write_file(path, content, 0, &info).expect("write");
        assert_eq!(n, content.len());
        self.fs.close_file(path, &mut info).expect("close");
    }

    /// Opens, reads the whole file and closes it.
    pub fn read(&self, path: &str) -> FsResult<Vec<u8>> {
        let mut info = self.create(path, CreateMode::Open, false)?;
        let mut content = Vec::new();
        let mut buf = [0u8; 7];
        loop {
            let n = self
                .fs
                .read_file(path, &mut buf, content.len() as u64, &info)?;
            if n == 0 {
                break;
            }
            content.extend_from_slice(&buf[..n]);
        }
        self.fs.close_file(path, &mut info)?;
        Ok(content)
    }

    pub fn mkdir(&self, path: &str) -> FsResult<()> {
        let mut info = self.create(path, CreateMode::CreateNew, true)?;
        self.fs.close_file(path, &mut info)
    }

    /// Names returned by enumerating `path`.
    pub fn names(&self, path: &str, pattern: &str) -> FsResult<Vec<String>> {
        Ok(self
            .fs
            .find_files_with_pattern(path, pattern, &RequestInfo::directory())?
            .into_iter()
            .map(|e| e.file_name)
            .collect())
    }

    /// Files the scratch directory currently holds.
    pub fn scratch_files(&self) -> usize {
        std::fs::read_dir(self.cache.path())
            .expect("read cache dir")
            .count()
    }
}
