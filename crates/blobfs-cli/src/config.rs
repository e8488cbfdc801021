//! Configuration file support for the blobfs CLI.
//!
//! The file lives at `~/.config/blobfs/config.toml` (XDG standard). Setting
//! `BLOBFS_CONFIG_DIR` moves the lookup to another directory and `--config`
//! names the file explicitly. Flags and `BLOBFS_*` environment variables
//! override values from the file.
//!
//! # Example configuration
//!
//! ```toml
//! root = "/srv/blobfs"
//! container = "photos"
//! cache_dir = "/var/cache/blobfs"
//! public_access = "blob"
//! registry_capacity = 50000
//!
//! [container_metadata]
//! owner = "ops"
//! ```

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use blobfs_core::AccessPolicy;
use blobfs_mount::{MountOptions, DEFAULT_REGISTRY_CAPACITY};

/// Environment variable overriding the configuration directory.
pub const CONFIG_DIR_ENV: &str = "BLOBFS_CONFIG_DIR";

/// Container used when neither flags nor the file name one.
pub const DEFAULT_CONTAINER: &str = "blobfs";

const CONFIG_FILE: &str = "config.toml";

/// Contents of the configuration file. Every key is optional.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Directory holding the store's containers
    pub root: Option<PathBuf>,

    /// Container to operate on
    pub container: Option<String>,

    /// Directory for scratch files
    pub cache_dir: Option<PathBuf>,

    /// Access policy if the container has to be created
    pub public_access: Option<AccessPolicy>,

    /// Maximum number of cached path nodes
    pub registry_capacity: Option<u64>,

    /// Metadata if the container has to be created
    #[serde(default)]
    pub container_metadata: BTreeMap<String, String>,
}

impl Config {
    /// Loads `explicit`, or the default file if it exists.
    ///
    /// An explicitly named file must exist; a missing default file yields an
    /// empty configuration.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let (path, required) = match explicit {
            Some(path) => (path.to_path_buf(), true),
            None => match config_path() {
                Some(path) => (path, false),
                None => return Ok(Config::default()),
            },
        };

        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if !required && e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No config file");
                return Ok(Config::default());
            }
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to read config file: {}", path.display()));
            }
        };

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        debug!(path = %path.display(), "Loaded config file");
        Ok(config)
    }
}

/// Get the configuration directory.
pub fn config_dir() -> Option<PathBuf> {
    if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV) {
        return Some(PathBuf::from(dir));
    }
    directories::BaseDirs::new().map(|base| base.config_dir().join("blobfs"))
}

/// Get the path to the configuration file.
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join(CONFIG_FILE))
}

/// Values given on the command line or through the environment.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub root: Option<PathBuf>,
    pub container: Option<String>,
    pub cache_dir: Option<PathBuf>,
}

/// Settings for one invocation, after merging flags over the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub root: PathBuf,
    pub container: String,
    /// `None` means a temporary directory per invocation.
    pub cache_dir: Option<PathBuf>,
    pub public_access: AccessPolicy,
    pub registry_capacity: u64,
    pub container_metadata: BTreeMap<String, String>,
}

impl Settings {
    pub fn resolve(overrides: Overrides, config: Config) -> Result<Self> {
        let root = overrides.root.or(config.root).with_context(|| {
            format!(
                "No store root configured.\n\
                 Pass --root, set BLOBFS_ROOT or add `root = \"/path\"` to {}",
                config_path().map_or_else(
                    || "~/.config/blobfs/config.toml".to_string(),
                    |p| p.display().to_string()
                )
            )
        })?;

        Ok(Self {
            root,
            container: overrides
                .container
                .or(config.container)
                .unwrap_or_else(|| DEFAULT_CONTAINER.to_string()),
            cache_dir: overrides.cache_dir.or(config.cache_dir),
            public_access: config.public_access.unwrap_or_default(),
            registry_capacity: config
                .registry_capacity
                .unwrap_or(DEFAULT_REGISTRY_CAPACITY),
            container_metadata: config.container_metadata,
        })
    }

    /// Mount options placing scratch files in `cache_dir`.
    pub fn mount_options(&self, cache_dir: &Path) -> MountOptions {
        let mut options = MountOptions::new(&self.container, cache_dir)
            .with_public_access(self.public_access)
            .with_registry_capacity(self.registry_capacity);
        options.container_metadata = self.container_metadata.clone();
        options
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_empty_config() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
            root = "/srv/blobfs"
            container = "photos"
            cache_dir = "/var/cache/blobfs"
            public_access = "container"
            registry_capacity = 500

            [container_metadata]
            owner = "ops"
        "#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.root, Some(PathBuf::from("/srv/blobfs")));
        assert_eq!(config.container.as_deref(), Some("photos"));
        assert_eq!(config.public_access, Some(AccessPolicy::Container));
        assert_eq!(config.registry_capacity, Some(500));
        assert_eq!(
            config.container_metadata.get("owner").map(String::as_str),
            Some("ops")
        );
    }

    #[test]
    fn test_unknown_key_rejected() {
        assert!(toml::from_str::<Config>("rooot = \"/x\"").is_err());
    }

    #[test]
    fn test_flags_override_file() {
        let config = Config {
            root: Some(PathBuf::from("/from/file")),
            container: Some("filebox".to_string()),
            ..Config::default()
        };
        let overrides = Overrides {
            container: Some("flagbox".to_string()),
            ..Overrides::default()
        };

        let settings = Settings::resolve(overrides, config).unwrap();
        assert_eq!(settings.root, PathBuf::from("/from/file"));
        assert_eq!(settings.container, "flagbox");
        assert_eq!(settings.cache_dir, None);
        assert_eq!(settings.registry_capacity, DEFAULT_REGISTRY_CAPACITY);
    }

    #[test]
    fn test_default_container() {
        let overrides = Overrides {
            root: Some(PathBuf::from("/r")),
            ..Overrides::default()
        };
        let settings = Settings::resolve(overrides, Config::default()).unwrap();
        assert_eq!(settings.container, DEFAULT_CONTAINER);
    }

    #[test]
    fn test_missing_root_is_an_error() {
        let err = Settings::resolve(Overrides::default(), Config::default()).unwrap_err();
        assert!(err.to_string().contains("No store root configured"));
    }

    #[test]
    fn test_mount_options() {
        let config = Config {
            root: Some(PathBuf::from("/r")),
            public_access: Some(AccessPolicy::Blob),
            registry_capacity: Some(7),
            ..Config::default()
        };
        let settings = Settings::resolve(Overrides::default(), config).unwrap();
        let options = settings.mount_options(Path::new("/tmp/cache"));
        assert_eq!(options.container, DEFAULT_CONTAINER);
        assert_eq!(options.cache_dir, PathBuf::from("/tmp/cache"));
        assert_eq!(options.public_access, AccessPolicy::Blob);
        assert_eq!(options.registry_capacity, 7);
    }
}
