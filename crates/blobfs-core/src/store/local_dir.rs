//! Object store backed by a local directory.
//!
//! Layout under the root:
//!
//! ```text
//! <root>/<container>/container.json   container options
//! <root>/<container>/objects/<name>   object bodies
//! <root>/<container>/meta/<name>      user metadata (JSON), when set
//! ```
//!
//! `<name>` is the base64url encoding of the full key. Encoding keeps keys
//! such as `c/a` and `c/a/.dir` from clashing as file and directory.

use super::{ContainerOptions, ListedObject, ObjectProperties, ObjectStore};
use crate::error::{StoreError, StoreResult};
use data_encoding::BASE64URL_NOPAD;
use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

/// Longest file name most local filesystems accept.
const MAX_FILE_NAME: usize = 255;

/// Object store that keeps each object as a file.
#[derive(Debug, Clone)]
pub struct LocalDirStore {
    container: String,
    base: PathBuf,
}

impl LocalDirStore {
    /// Binds a store to `container` under `root`.
    ///
    /// Nothing is created on disk until
    /// [`create_container_if_absent`](ObjectStore::create_container_if_absent)
    /// runs; until then every object call fails with
    /// [`StoreError::ContainerNotFound`].
    pub fn new(root: impl AsRef<Path>, container: impl Into<String>) -> Self {
        let container = container.into();
        let base = root.as_ref().join(&container);
        Self { container, base }
    }

    /// Directory holding this container.
    pub fn base_dir(&self) -> &Path {
        &self.base
    }

    fn objects_dir(&self) -> PathBuf {
        self.base.join("objects")
    }

    fn meta_dir(&self) -> PathBuf {
        self.base.join("meta")
    }

    fn encode_name(key: &str) -> StoreResult<String> {
        let name = BASE64URL_NOPAD.encode(key.as_bytes());
        if key.is_empty() || name.len() > MAX_FILE_NAME {
            return Err(StoreError::InvalidKey {
                key: key.to_string(),
            });
        }
        Ok(name)
    }

    fn decode_name(name: &str) -> Option<String> {
        let bytes = BASE64URL_NOPAD.decode(name.as_bytes()).ok()?;
        String::from_utf8(bytes).ok()
    }

    fn ensure_container(&self) -> StoreResult<()> {
        if self.objects_dir().is_dir() {
            Ok(())
        } else {
            Err(StoreError::ContainerNotFound {
                container: self.container.clone(),
            })
        }
    }

    fn object_path(&self, key: &str) -> StoreResult<PathBuf> {
        self.ensure_container()?;
        Ok(self.objects_dir().join(Self::encode_name(key)?))
    }

    fn meta_path(&self, key: &str) -> StoreResult<PathBuf> {
        Ok(self.meta_dir().join(Self::encode_name(key)?))
    }

    fn read_metadata(&self, key: &str) -> StoreResult<BTreeMap<String, String>> {
        match fs::read(self.meta_path(key)?) {
            Ok(body) => Ok(serde_json::from_slice(&body)?),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(StoreError::from_io(key, e)),
        }
    }

    fn properties_at(&self, key: &str, path: &Path) -> StoreResult<ObjectProperties> {
        let meta = fs::metadata(path).map_err(|e| StoreError::from_io(key, e))?;
        Ok(ObjectProperties {
            content_length: meta.len(),
            created: meta.created().ok(),
            last_modified: meta.modified().ok(),
            metadata: self.read_metadata(key)?,
        })
    }

    /// Writes `data` to a temp file next to the objects so it can be
    /// persisted with a rename.
    fn stage(&self, key: &str, data: &[u8]) -> StoreResult<NamedTempFile> {
        let mut tmp =
            NamedTempFile::new_in(self.objects_dir()).map_err(|e| StoreError::from_io(key, e))?;
        tmp.write_all(data)
            .and_then(|()| tmp.flush())
            .map_err(|e| StoreError::from_io(key, e))?;
        Ok(tmp)
    }
}

impl ObjectStore for LocalDirStore {
    fn container(&self) -> &str {
        &self.container
    }

    fn create_container_if_absent(&self, options: &ContainerOptions) -> StoreResult<bool> {
        if self.objects_dir().is_dir() {
            return Ok(false);
        }
        let container = self.container.as_str();
        fs::create_dir_all(self.objects_dir()).map_err(|e| StoreError::from_io(container, e))?;
        fs::create_dir_all(self.meta_dir()).map_err(|e| StoreError::from_io(container, e))?;
        let body = serde_json::to_vec_pretty(options)?;
        fs::write(self.base.join("container.json"), body)
            .map_err(|e| StoreError::from_io(container, e))?;
        debug!(container, path = %self.base.display(), "Created container directory");
        Ok(true)
    }

    fn exists(&self, key: &str) -> StoreResult<bool> {
        Ok(self.object_path(key)?.is_file())
    }

    fn get_properties(&self, key: &str) -> StoreResult<ObjectProperties> {
        let path = self.object_path(key)?;
        self.properties_at(key, &path)
    }

    fn download(&self, key: &str) -> StoreResult<Vec<u8>> {
        fs::read(self.object_path(key)?).map_err(|e| StoreError::from_io(key, e))
    }

    fn upload(&self, key: &str, data: &[u8]) -> StoreResult<()> {
        let path = self.object_path(key)?;
        self.stage(key, data)?
            .persist(&path)
            .map_err(|e| StoreError::from_io(key, e.error))?;
        Ok(())
    }

    fn upload_if_absent(&self, key: &str, data: &[u8]) -> StoreResult<bool> {
        let path = self.object_path(key)?;
        match self.stage(key, data)?.persist_noclobber(&path) {
            Ok(_) => Ok(true),
            Err(e) if e.error.kind() == io::ErrorKind::AlreadyExists => Ok(false),
            Err(e) => Err(StoreError::from_io(key, e.error)),
        }
    }

    fn delete(&self, key: &str) -> StoreResult<bool> {
        let path = self.object_path(key)?;
        match fs::remove_file(&path) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
            Err(e) => return Err(StoreError::from_io(key, e)),
        }
        match fs::remove_file(self.meta_path(key)?) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(true),
            Err(e) => Err(StoreError::from_io(key, e)),
        }
    }

    fn list(&self, prefix: &str) -> StoreResult<Vec<ListedObject>> {
        self.ensure_container()?;
        let dir = self.objects_dir();
        let entries = fs::read_dir(&dir).map_err(|e| StoreError::from_io(prefix, e))?;

        let mut objects = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| StoreError::from_io(prefix, e))?;
            let file_name = entry.file_name();
            // Staged temp files do not decode and are skipped
            let Some(key) = file_name.to_str().and_then(Self::decode_name) else {
                continue;
            };
            if !key.starts_with(prefix) {
                continue;
            }
            match self.properties_at(&key, &entry.path()) {
                Ok(properties) => objects.push(ListedObject { key, properties }),
                // Deleted between read_dir and stat
                Err(e) if e.is_not_found() => {}
                Err(e) => return Err(e),
            }
        }
        objects.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(objects)
    }

    fn set_metadata(&self, key: &str, metadata: &BTreeMap<String, String>) -> StoreResult<()> {
        if !self.exists(key)? {
            return Err(StoreError::NotFound {
                key: key.to_string(),
            });
        }
        let body = serde_json::to_vec(metadata)?;
        let mut tmp =
            NamedTempFile::new_in(self.meta_dir()).map_err(|e| StoreError::from_io(key, e))?;
        tmp.write_all(&body).map_err(|e| StoreError::from_io(key, e))?;
        tmp.persist(self.meta_path(key)?)
            .map_err(|e| StoreError::from_io(key, e.error))?;
        Ok(())
    }

    fn rename(&self, from: &str, to: &str) -> StoreResult<()> {
        let src = self.object_path(from)?;
        let dst = self.object_path(to)?;
        fs::rename(&src, &dst).map_err(|e| StoreError::from_io(from, e))?;
        let src_meta = self.meta_path(from)?;
        let dst_meta = self.meta_path(to)?;
        match fs::rename(&src_meta, &dst_meta) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => match fs::remove_file(&dst_meta) {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
                Err(e) => Err(StoreError::from_io(to, e)),
            },
            Err(e) => Err(StoreError::from_io(from, e)),
        }
    }
}
