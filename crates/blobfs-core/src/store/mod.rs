//! Blocking object-store boundary.
//!
//! [`ObjectStore`] is the logical surface the mount layer needs from a remote
//! store: existence checks, properties, whole-object upload/download, delete
//! and prefix listing. A store value is bound to a single container.
//!
//! Two backends are provided:
//! - [`MemoryStore`] keeps objects in memory (tests, scratch mounts)
//! - [`LocalDirStore`] keeps objects as files in a local directory

mod local_dir;
mod memory;

pub use local_dir::LocalDirStore;
pub use memory::MemoryStore;

use crate::error::StoreResult;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::time::SystemTime;

/// Anonymous read access granted on a container.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessPolicy {
    /// No anonymous access.
    #[default]
    None,
    /// Anonymous read access to object data.
    Blob,
    /// Anonymous read and list access to the whole container.
    Container,
}

impl fmt::Display for AccessPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessPolicy::None => f.write_str("none"),
            AccessPolicy::Blob => f.write_str("blob"),
            AccessPolicy::Container => f.write_str("container"),
        }
    }
}

/// Settings applied when a container has to be created.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerOptions {
    /// Public access policy for the new container.
    #[serde(default)]
    pub public_access: AccessPolicy,
    /// User metadata attached to the new container.
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

/// Properties the store reports for an object.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectProperties {
    /// Size of the object body in bytes.
    pub content_length: u64,
    /// Creation time, when the store tracks it.
    pub created: Option<SystemTime>,
    /// Last modification time, when the store tracks it.
    pub last_modified: Option<SystemTime>,
    /// User metadata attached to the object.
    pub metadata: BTreeMap<String, String>,
}

/// One object returned by a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListedObject {
    /// Full object key.
    pub key: String,
    /// Properties reported alongside the key.
    pub properties: ObjectProperties,
}

/// Result of a hierarchical listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListResult {
    /// Objects directly under the prefix.
    pub objects: Vec<ListedObject>,
    /// Deeper prefixes, each ending with the delimiter.
    pub common_prefixes: Vec<String>,
}

/// Logical operations the mount layer issues against a remote store.
///
/// All calls block until the store answers. Keys are full object names
/// (they include the container segment, see [`crate::key`]).
pub trait ObjectStore: Send + Sync + fmt::Debug {
    /// Name of the container this store is bound to.
    fn container(&self) -> &str;

    /// Creates the container if it does not exist yet.
    ///
    /// Returns true if the container was created by this call.
    fn create_container_if_absent(&self, options: &ContainerOptions) -> StoreResult<bool>;

    /// Returns true if an object exists under `key`.
    fn exists(&self, key: &str) -> StoreResult<bool>;

    /// Returns the properties of the object under `key`.
    fn get_properties(&self, key: &str) -> StoreResult<ObjectProperties>;

    /// Downloads the whole object body.
    fn download(&self, key: &str) -> StoreResult<Vec<u8>>;

    /// Uploads `data` as the whole object body, replacing any existing one.
    fn upload(&self, key: &str, data: &[u8]) -> StoreResult<()>;

    /// Uploads `data` only if no object exists under `key`.
    ///
    /// Returns true if this call created the object.
    fn upload_if_absent(&self, key: &str, data: &[u8]) -> StoreResult<bool>;

    /// Deletes the object under `key` if it exists.
    ///
    /// Returns true if an object was deleted.
    fn delete(&self, key: &str) -> StoreResult<bool>;

    /// Lists every object whose key starts with `prefix`, sorted by key.
    fn list(&self, prefix: &str) -> StoreResult<Vec<ListedObject>>;

    /// Replaces the user metadata of the object under `key`.
    fn set_metadata(&self, key: &str, metadata: &BTreeMap<String, String>) -> StoreResult<()>;

    /// Lists the objects directly under `prefix` and the deeper prefixes.
    ///
    /// Keys with another `delimiter` after the prefix are folded into a
    /// common prefix ending with the delimiter.
    fn list_with_delimiter(&self, prefix: &str, delimiter: char) -> StoreResult<ListResult> {
        let mut result = ListResult::default();
        for object in self.list(prefix)? {
            let rest = &object.key[prefix.len()..];
            match rest.find(delimiter) {
                Some(idx) => {
                    let common = &object.key[..prefix.len() + idx + delimiter.len_utf8()];
                    if result.common_prefixes.last().map(String::as_str) != Some(common) {
                        result.common_prefixes.push(common.to_string());
                    }
                }
                None => result.objects.push(object),
            }
        }
        result.common_prefixes.dedup();
        Ok(result)
    }

    /// Copies the object under `from` to `to`, replacing `to`.
    fn copy(&self, from: &str, to: &str) -> StoreResult<()> {
        let data = self.download(from)?;
        self.upload(to, &data)?;
        // `to` may carry metadata from the object it replaced
        let metadata = self.get_properties(from)?.metadata;
        self.set_metadata(to, &metadata)?;
        Ok(())
    }

    /// Moves the object under `from` to `to`.
    ///
    /// Stores without a native rename copy and then delete.
    fn rename(&self, from: &str, to: &str) -> StoreResult<()> {
        self.copy(from, to)?;
        self.delete(from)?;
        Ok(())
    }
}
