//! In-memory object store.

use super::{ContainerOptions, ListedObject, ObjectProperties, ObjectStore};
use crate::error::{StoreError, StoreResult};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::SystemTime;

#[derive(Debug, Clone)]
struct StoredObject {
    data: Vec<u8>,
    created: SystemTime,
    modified: SystemTime,
    metadata: BTreeMap<String, String>,
}

impl StoredObject {
    fn properties(&self) -> ObjectProperties {
        ObjectProperties {
            content_length: self.data.len() as u64,
            created: Some(self.created),
            last_modified: Some(self.modified),
            metadata: self.metadata.clone(),
        }
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    container: Option<ContainerOptions>,
    objects: BTreeMap<String, StoredObject>,
}

/// Object store that keeps every object in memory.
///
/// Useful as a test double: it counts requests and can be switched offline
/// to simulate an unreachable store.
///
/// # Example
///
/// ```
/// use blobfs_core::{MemoryStore, ObjectStore};
///
/// let store = MemoryStore::new("photos");
/// store.upload("photos/cat.jpg", b"meow").unwrap();
/// assert!(store.exists("photos/cat.jpg").unwrap());
/// ```
#[derive(Debug)]
pub struct MemoryStore {
    container: String,
    state: RwLock<MemoryState>,
    offline: AtomicBool,
    requests: AtomicU64,
}

impl MemoryStore {
    /// Creates an empty store bound to `container`.
    pub fn new(container: impl Into<String>) -> Self {
        Self {
            container: container.into(),
            state: RwLock::new(MemoryState::default()),
            offline: AtomicBool::new(false),
            requests: AtomicU64::new(0),
        }
    }

    /// Makes every subsequent request fail with [`StoreError::Unavailable`].
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Number of requests served so far (including failed ones).
    pub fn request_count(&self) -> u64 {
        self.requests.load(Ordering::Relaxed)
    }

    /// Options the container was created with, if it exists.
    pub fn container_options(&self) -> Option<ContainerOptions> {
        self.state.read().container.clone()
    }

    /// Number of stored objects.
    pub fn object_count(&self) -> usize {
        self.state.read().objects.len()
    }

    fn begin(&self) -> StoreResult<()> {
        self.requests.fetch_add(1, Ordering::Relaxed);
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable {
                reason: format!("container {} is offline", self.container),
            });
        }
        Ok(())
    }

    fn not_found(key: &str) -> StoreError {
        StoreError::NotFound {
            key: key.to_string(),
        }
    }
}

impl ObjectStore for MemoryStore {
    fn container(&self) -> &str {
        &self.container
    }

    fn create_container_if_absent(&self, options: &ContainerOptions) -> StoreResult<bool> {
        self.begin()?;
        let mut state = self.state.write();
        if state.container.is_some() {
            return Ok(false);
        }
        state.container = Some(options.clone());
        Ok(true)
    }

    fn exists(&self, key: &str) -> StoreResult<bool> {
        self.begin()?;
        Ok(self.state.read().objects.contains_key(key))
    }

    fn get_properties(&self, key: &str) -> StoreResult<ObjectProperties> {
        self.begin()?;
        self.state
            .read()
            .objects
            .get(key)
            .map(StoredObject::properties)
            .ok_or_else(|| Self::not_found(key))
    }

    fn download(&self, key: &str) -> StoreResult<Vec<u8>> {
        self.begin()?;
        self.state
            .read()
            .objects
            .get(key)
            .map(|o| o.data.clone())
            .ok_or_else(|| Self::not_found(key))
    }

    fn upload(&self, key: &str, data: &[u8]) -> StoreResult<()> {
        self.begin()?;
        let now = SystemTime::now();
        let mut state = self.state.write();
        match state.objects.get_mut(key) {
            Some(existing) => {
                existing.data = data.to_vec();
                existing.modified = now;
            }
            None => {
                state.objects.insert(
                    key.to_string(),
                    StoredObject {
                        data: data.to_vec(),
                        created: now,
                        modified: now,
                        metadata: BTreeMap::new(),
                    },
                );
            }
        }
        Ok(())
    }

    fn upload_if_absent(&self, key: &str, data: &[u8]) -> StoreResult<bool> {
        self.begin()?;
        let now = SystemTime::now();
        let mut state = self.state.write();
        if state.objects.contains_key(key) {
            return Ok(false);
        }
        state.objects.insert(
            key.to_string(),
            StoredObject {
                data: data.to_vec(),
                created: now,
                modified: now,
                metadata: BTreeMap::new(),
            },
        );
        Ok(true)
    }

    fn delete(&self, key: &str) -> StoreResult<bool> {
        self.begin()?;
        Ok(self.state.write().objects.remove(key).is_some())
    }

    fn list(&self, prefix: &str) -> StoreResult<Vec<ListedObject>> {
        self.begin()?;
        let state = self.state.read();
        Ok(state
            .objects
            .range(prefix.to_string()..)
            .take_while(|(key, _)| key.starts_with(prefix))
            .map(|(key, object)| ListedObject {
                key: key.clone(),
                properties: object.properties(),
            })
            .collect())
    }

    fn set_metadata(&self, key: &str, metadata: &BTreeMap<String, String>) -> StoreResult<()> {
        self.begin()?;
        let mut state = self.state.write();
        let object = state
            .objects
            .get_mut(key)
            .ok_or_else(|| Self::not_found(key))?;
        object.metadata = metadata.clone();
        Ok(())
    }
}
