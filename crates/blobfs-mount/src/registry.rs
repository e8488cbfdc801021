//! Registry of resolved nodes keyed by normalized path.
//!
//! Resolution is an atomic get-or-create on a bounded Moka cache: concurrent
//! callers resolving the same unseen path wait on a single loader and all
//! receive the same `Arc<FileNode>`.
//!
//! The entity kind is decided once, when the node is constructed:
//!
//! - a directory hint, a trailing separator, a marker path or the root give
//!   a directory node
//! - otherwise the path is a file, unless no file object exists under it
//!   while a directory marker does
//!
//! A cached node whose object does not exist is replaced when the caller asks
//! for the other kind.

use crate::error::BlobFsResult;
use crate::node::FileNode;
use crate::stats::MountStats;
use blobfs_core::key::has_directory_shape;
use blobfs_core::{derive_key, normalize_path, ObjectStore, StoreResult};
use moka::sync::Cache;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Default number of nodes kept before eviction.
pub const DEFAULT_REGISTRY_CAPACITY: u64 = 10_000;

/// Bounded path → node registry.
pub struct NodeRegistry {
    nodes: Cache<String, Arc<FileNode>>,
    store: Arc<dyn ObjectStore>,
    stats: Arc<MountStats>,
    constructed: AtomicU64,
}

impl fmt::Debug for NodeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeRegistry")
            .field("entries", &self.nodes.entry_count())
            .field("constructed", &self.constructed_count())
            .finish_non_exhaustive()
    }
}

impl NodeRegistry {
    pub fn new(store: Arc<dyn ObjectStore>, capacity: u64, stats: Arc<MountStats>) -> Self {
        Self {
            nodes: Cache::builder().max_capacity(capacity).build(),
            store,
            stats,
            constructed: AtomicU64::new(0),
        }
    }

    /// Returns the node for `raw_path`, constructing it on first use.
    pub fn resolve(&self, raw_path: &str, directory_hint: bool) -> BlobFsResult<Arc<FileNode>> {
        let path = normalize_path(raw_path);
        let wants_directory = directory_hint || path == "/" || has_directory_shape(raw_path);

        if let Some(node) = self.nodes.get(&path) {
            // A cached kind only sticks while its object exists
            if wants_directory != node.is_directory() && !node.exists()? {
                debug!(path, wants_directory, "Replacing node of the other kind");
                self.nodes.invalidate(&path);
            } else {
                self.stats.registry().record_hit();
                return Ok(node);
            }
        }

        self.stats.registry().record_miss();
        let node = self
            .nodes
            .try_get_with(path.clone(), || self.construct(&path, wants_directory))?;
        Ok(node)
    }

    fn construct(&self, path: &str, wants_directory: bool) -> StoreResult<Arc<FileNode>> {
        let container = self.store.container();
        let mut key = derive_key(container, path, wants_directory);

        if !key.is_directory() {
            let marker = derive_key(container, path, true);
            self.stats.record_request();
            if !self.store.exists(key.as_str())? {
                self.stats.record_request();
                if self.store.exists(marker.as_str())? {
                    key = marker;
                }
            }
        }

        self.constructed.fetch_add(1, Ordering::Relaxed);
        debug!(path, key = %key, kind = %key.kind(), "Constructed node");
        Ok(Arc::new(FileNode::new(
            path,
            key,
            Arc::clone(&self.store),
            Arc::clone(&self.stats),
        )))
    }

    /// Drops the entry for one path.
    pub fn invalidate(&self, raw_path: &str) {
        self.nodes.invalidate(&normalize_path(raw_path));
    }

    /// Drops the entry for a path and every path below it.
    pub fn invalidate_prefix(&self, raw_path: &str) {
        let path = normalize_path(raw_path);
        if path == "/" {
            self.clear();
            return;
        }
        let below = format!("{path}/");
        let stale: Vec<Arc<String>> = self
            .nodes
            .iter()
            .filter(|(k, _)| k.as_str() == path || k.starts_with(&below))
            .map(|(k, _)| k)
            .collect();
        for k in stale {
            self.nodes.invalidate(k.as_str());
        }
    }

    /// Drops every entry.
    pub fn clear(&self) {
        self.nodes.invalidate_all();
    }

    /// Number of cached nodes after pending evictions are applied.
    pub fn len(&self) -> u64 {
        self.nodes.run_pending_tasks();
        self.nodes.entry_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Nodes constructed since creation (cache hits excluded).
    pub fn constructed_count(&self) -> u64 {
        self.constructed.load(Ordering::Relaxed)
    }
}
