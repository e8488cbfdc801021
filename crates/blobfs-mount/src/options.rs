//! Mount configuration.

use crate::registry::DEFAULT_REGISTRY_CAPACITY;
use blobfs_core::{AccessPolicy, ContainerOptions};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Settings for one mount of one container.
///
/// Deserializable so front-ends can load it from a config file:
///
/// ```toml
/// container = "photos"
/// cache_dir = "/var/cache/blobfs"
/// public_access = "blob"
/// registry_capacity = 50000
///
/// [container_metadata]
/// owner = "ops"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MountOptions {
    /// Container the mount exposes; also the volume label.
    pub container: String,
    /// Existing directory for per-handle scratch files.
    pub cache_dir: PathBuf,
    /// Access policy applied if the container has to be created.
    #[serde(default)]
    pub public_access: AccessPolicy,
    /// Metadata applied if the container has to be created.
    #[serde(default)]
    pub container_metadata: BTreeMap<String, String>,
    /// Maximum number of nodes the registry keeps.
    #[serde(default = "default_registry_capacity")]
    pub registry_capacity: u64,
}

fn default_registry_capacity() -> u64 {
    DEFAULT_REGISTRY_CAPACITY
}

impl MountOptions {
    pub fn new(container: impl Into<String>, cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            container: container.into(),
            cache_dir: cache_dir.into(),
            public_access: AccessPolicy::default(),
            container_metadata: BTreeMap::new(),
            registry_capacity: DEFAULT_REGISTRY_CAPACITY,
        }
    }

    #[must_use]
    pub fn with_public_access(mut self, policy: AccessPolicy) -> Self {
        self.public_access = policy;
        self
    }

    #[must_use]
    pub fn with_registry_capacity(mut self, capacity: u64) -> Self {
        self.registry_capacity = capacity;
        self
    }

    /// Options passed to the store when the container is created at mount.
    pub fn container_options(&self) -> ContainerOptions {
        ContainerOptions {
            public_access: self.public_access,
            metadata: self.container_metadata.clone(),
        }
    }
}
