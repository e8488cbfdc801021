//! Thread-safe table of open handles.
//!
//! Handles are identified by auto-incrementing `u64` ids. Id 0 is never
//! issued so hosts can use it as "no handle".
//!
//! Lookups clone the value out of the map, so no shard lock is held while
//! the caller works on a handle. Callers that mutate handle state store an
//! `Arc<Mutex<_>>` and lock it themselves.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// Concurrent map from handle id to handle state.
///
/// ```
/// use blobfs_mount::HandleTable;
///
/// let table: HandleTable<&str> = HandleTable::new();
/// let id = table.insert("report.txt");
/// assert_eq!(id, 1);
/// assert_eq!(table.remove(id), Some("report.txt"));
/// assert!(table.is_empty());
/// ```
#[derive(Debug)]
pub struct HandleTable<V> {
    handles: DashMap<u64, V>,
    next_id: AtomicU64,
}

impl<V> HandleTable<V> {
    pub fn new() -> Self {
        Self {
            handles: DashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }

    /// Inserts a handle and returns its new id.
    pub fn insert(&self, value: V) -> u64 {
        loop {
            let id = self.next_id.fetch_add(1, Ordering::Relaxed);
            // Skip 0 after wrap-around and ids still held by long-lived handles
            if id == 0 {
                continue;
            }
            if let Entry::Vacant(entry) = self.handles.entry(id) {
                entry.insert(value);
                return id;
            }
        }
    }

    /// A copy of the handle; the map is unlocked again on return.
    pub fn get(&self, id: u64) -> Option<V>
    where
        V: Clone,
    {
        self.handles.get(&id).map(|entry| entry.value().clone())
    }

    pub fn remove(&self, id: u64) -> Option<V> {
        self.handles.remove(&id).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Removes and returns every handle.
    pub fn drain(&self) -> Vec<(u64, V)> {
        let ids: Vec<u64> = self.handles.iter().map(|entry| *entry.key()).collect();
        ids.into_iter()
            .filter_map(|id| self.handles.remove(&id))
            .collect()
    }
}

impl<V> Default for HandleTable<V> {
    fn default() -> Self {
        Self::new()
    }
}
