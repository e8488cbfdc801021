//! One mounted container for the duration of a command.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tempfile::TempDir;
use tracing::debug;

use blobfs_core::{LocalDirStore, ObjectStore};
use blobfs_mount::{
    BlobFileSystem, CreateMode, FileAttributes, FileInformation, FileSystemOperations, FsResult,
    RequestInfo,
};

use crate::config::Settings;

/// Read size used when streaming a file out.
const READ_CHUNK: usize = 64 * 1024;

/// A filesystem mounted over a directory-backed store.
pub struct Session {
    fs: BlobFileSystem,
    // Dropped after `fs`, so scratch files are gone before the directory
    _scratch: Option<TempDir>,
}

impl Session {
    /// Mounts the container described by `settings`.
    pub fn open(settings: &Settings) -> Result<Self> {
        let (cache_dir, scratch): (PathBuf, Option<TempDir>) = match &settings.cache_dir {
            Some(dir) => {
                std::fs::create_dir_all(dir)
                    .with_context(|| format!("Failed to create cache directory: {}", dir.display()))?;
                (dir.clone(), None)
            }
            None => {
                let temp = tempfile::Builder::new()
                    .prefix("blobfs-cache-")
                    .tempdir()
                    .context("Failed to create temporary cache directory")?;
                (temp.path().to_path_buf(), Some(temp))
            }
        };

        let store: Arc<dyn ObjectStore> =
            Arc::new(LocalDirStore::new(&settings.root, settings.container.clone()));
        let fs = BlobFileSystem::new(store, settings.mount_options(&cache_dir))
            .context("Failed to set up filesystem")?;
        fs.mounted(&RequestInfo::directory()).with_context(|| {
            format!(
                "Failed to mount container '{}' under {}",
                settings.container,
                settings.root.display()
            )
        })?;
        debug!(root = %settings.root.display(), container = %settings.container, "Session opened");

        Ok(Self {
            fs,
            _scratch: scratch,
        })
    }

    pub fn fs(&self) -> &BlobFileSystem {
        &self.fs
    }

    /// Unmounts, flushing anything still open.
    pub fn close(self) -> Result<()> {
        self.fs
            .unmounted(&RequestInfo::default())
            .context("Failed to unmount")
    }

    /// Opens `path` and returns the request context carrying the handle.
    pub fn open_entry(&self, path: &str, mode: CreateMode, is_directory: bool) -> FsResult<RequestInfo> {
        let mut info = RequestInfo {
            is_directory,
            ..RequestInfo::default()
        };
        let attributes = if is_directory {
            FileAttributes::DIRECTORY
        } else {
            FileAttributes::NORMAL
        };
        self.fs.create_file(path, mode, attributes, &mut info)?;
        Ok(info)
    }

    /// Information about `path`, whichever kind it is.
    pub fn stat(&self, path: &str) -> FsResult<FileInformation> {
        self.fs.get_file_information(path, &RequestInfo::file())
    }

    /// Reads a whole file.
    pub fn read_to_end(&self, path: &str) -> Result<Vec<u8>> {
        let mut info = self
            .open_entry(path, CreateMode::Open, false)
            .with_context(|| format!("Failed to open {path}"))?;
        let read = self.read_chunks(path, &info);
        let closed = self.fs.close_file(path, &mut info);

        let content = read.with_context(|| format!("Failed to read {path}"))?;
        closed.with_context(|| format!("Failed to close {path}"))?;
        Ok(content)
    }

    fn read_chunks(&self, path: &str, info: &RequestInfo) -> FsResult<Vec<u8>> {
        let mut content = Vec::new();
        let mut buf = vec![0u8; READ_CHUNK];
        loop {
            let n = self
                .fs
                .read_file(path, &mut buf, content.len() as u64, info)?;
            if n == 0 {
                return Ok(content);
            }
            content.extend_from_slice(&buf[..n]);
        }
    }

    /// Writes `content` to `path`, opened with `mode`, and closes it.
    pub fn write_all(&self, path: &str, content: &[u8], mode: CreateMode) -> Result<()> {
        let mut info = self
            .open_entry(path, mode, false)
            .with_context(|| format!("Failed to open {path}"))?;
        let written = self.fs.write_file(path, content, 0, &info);
        // Closing uploads the data
        let closed = self.fs.close_file(path, &mut info);

        written.with_context(|| format!("Failed to write {path}"))?;
        closed.with_context(|| format!("Failed to upload {path}"))?;
        Ok(())
    }
}
