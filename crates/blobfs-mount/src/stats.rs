//! Statistics for a mounted filesystem.
//!
//! Lock-free counters updated from every host thread:
//!
//! - store round-trips and bytes transferred
//! - handles opened and closed
//! - node registry hits and misses
//!
//! ```
//! use blobfs_mount::MountStats;
//!
//! let stats = MountStats::new();
//! stats.record_download(4096);
//! stats.registry().record_miss();
//! let snapshot = stats.snapshot();
//! assert_eq!(snapshot.bytes_downloaded, 4096);
//! assert_eq!(snapshot.store_requests, 1);
//! ```

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Hit/miss counters for the node registry.
#[derive(Debug, Default)]
pub struct CacheStats {
    hits: AtomicU64,
    misses: AtomicU64,
}

impl CacheStats {
    /// Record a lookup answered from the cache.
    #[inline]
    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a lookup that had to construct an entry.
    #[inline]
    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn hit_count(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn miss_count(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    /// Hit rate in `0.0..=1.0`, 0.0 before any lookup.
    pub fn hit_rate(&self) -> f64 {
        let hits = self.hit_count();
        let total = hits + self.miss_count();
        if total == 0 {
            0.0
        } else {
            hits as f64 / total as f64
        }
    }
}

/// Counters for one mount.
#[derive(Debug, Default)]
pub struct MountStats {
    store_requests: AtomicU64,
    bytes_uploaded: AtomicU64,
    bytes_downloaded: AtomicU64,
    handles_opened: AtomicU64,
    handles_closed: AtomicU64,
    registry: CacheStats,
}

impl MountStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a store call that moves no body.
    #[inline]
    pub fn record_request(&self) {
        self.store_requests.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an upload of `bytes`.
    #[inline]
    pub fn record_upload(&self, bytes: u64) {
        self.record_request();
        self.bytes_uploaded.fetch_add(bytes, Ordering::Relaxed);
    }

    /// Record a download of `bytes`.
    #[inline]
    pub fn record_download(&self, bytes: u64) {
        self.record_request();
        self.bytes_downloaded.fetch_add(bytes, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_open(&self) {
        self.handles_opened.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_close(&self) {
        self.handles_closed.fetch_add(1, Ordering::Relaxed);
    }

    /// Registry lookup counters.
    pub fn registry(&self) -> &CacheStats {
        &self.registry
    }

    /// Handles currently open.
    pub fn open_handles(&self) -> u64 {
        let opened = self.handles_opened.load(Ordering::Relaxed);
        opened.saturating_sub(self.handles_closed.load(Ordering::Relaxed))
    }

    /// Point-in-time copy of every counter.
    pub fn snapshot(&self) -> MountStatsSnapshot {
        MountStatsSnapshot {
            store_requests: self.store_requests.load(Ordering::Relaxed),
            bytes_uploaded: self.bytes_uploaded.load(Ordering::Relaxed),
            bytes_downloaded: self.bytes_downloaded.load(Ordering::Relaxed),
            handles_opened: self.handles_opened.load(Ordering::Relaxed),
            handles_closed: self.handles_closed.load(Ordering::Relaxed),
            registry_hits: self.registry.hit_count(),
            registry_misses: self.registry.miss_count(),
        }
    }
}

/// A serializable snapshot of [`MountStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MountStatsSnapshot {
    pub store_requests: u64,
    pub bytes_uploaded: u64,
    pub bytes_downloaded: u64,
    pub handles_opened: u64,
    pub handles_closed: u64,
    pub registry_hits: u64,
    pub registry_misses: u64,
}

/// Formats a byte count for humans (`1.50 KB`, `3 B`).
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;
    const TB: u64 = GB * 1024;

    if bytes >= TB {
        format!("{:.2} TB", bytes as f64 / TB as f64)
    } else if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{bytes} B")
    }
}
