//! Hierarchical configuration loader with precedence
//!
//! Loads configuration from multiple sources with the following precedence (low to high):
//! 1. Embedded defaults (built into binary)
//! 2. User config (~/.updraft/updater.yaml), or an explicit file
//! 3. Environment variables (UPDRAFT_* prefix)
//!
//! Files only need to name the keys they override; they are merged key by
//! key over the embedded defaults.

use crate::error::{Error, Result};
use crate::types::UpdaterConfig;
use camino::{Utf8Path, Utf8PathBuf};
use rust_embed::RustEmbed;
use serde_yaml_ng::Value;
use std::env;
use std::fs;
use tracing::debug;

/// Embedded configuration files
#[derive(RustEmbed)]
#[folder = "$CARGO_MANIFEST_DIR/../../embedded/config/"]
#[prefix = ""]
struct EmbeddedConfigs;

const DEFAULTS_FILE: &str = "updater-defaults.yaml";
const USER_CONFIG_FILE: &str = "updater.yaml";

/// Configuration hierarchy loader
pub struct HierarchicalConfigLoader {
    /// Base directory for configuration files
    config_dir: Utf8PathBuf,
}

impl HierarchicalConfigLoader {
    /// Create a new hierarchical config loader rooted at ~/.updraft
    pub fn new() -> Result<Self> {
        let config_dir = Self::get_config_dir()?;
        Ok(Self { config_dir })
    }

    /// Create a loader with a custom config directory
    pub fn with_dir(config_dir: Utf8PathBuf) -> Self {
        Self { config_dir }
    }

    /// Get the standard config directory (~/.updraft)
    fn get_config_dir() -> Result<Utf8PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| Error::invalid_config("Could not determine home directory"))?;
        let home = Utf8PathBuf::from_path_buf(home).map_err(|p| Error::non_utf8_path(&p))?;
        Ok(home.join(".updraft"))
    }

    /// Load updater configuration from the default locations
    pub fn load_updater_config(&self) -> Result<UpdaterConfig> {
        self.load_updater_config_from(None)
    }

    /// Load updater configuration, optionally from an explicit file
    ///
    /// An explicit file must exist; the user config file is optional.
    pub fn load_updater_config_from(&self, explicit: Option<&Utf8Path>) -> Result<UpdaterConfig> {
        let mut merged = Self::load_embedded_value(DEFAULTS_FILE)?;

        let overlay_path = match explicit {
            Some(path) if !path.exists() => return Err(Error::config_not_found(path.as_str())),
            Some(path) => Some(path.to_path_buf()),
            None => {
                let path = self.config_dir.join(USER_CONFIG_FILE);
                path.exists().then_some(path)
            }
        };

        if let Some(path) = overlay_path {
            debug!("Merging updater config from {}", path);
            let overlay = self.load_yaml_value(&path)?;
            merge_values(&mut merged, overlay);
        }

        let config: UpdaterConfig = serde_yaml_ng::from_value(merged)
            .map_err(|e| Error::invalid_config(format!("Failed to parse updater config: {}", e)))?;

        Self::apply_env_overrides(config)
    }

    /// Load an embedded configuration file as a YAML value
    fn load_embedded_value(filename: &str) -> Result<Value> {
        let embedded_file = EmbeddedConfigs::get(filename).ok_or_else(|| {
            Error::config_not_found(format!("Embedded config not found: {}", filename))
        })?;

        let content = std::str::from_utf8(&embedded_file.data).map_err(|_| {
            Error::invalid_config(format!("Invalid UTF-8 in embedded config: {}", filename))
        })?;

        serde_yaml_ng::from_str(content).map_err(|e| {
            Error::invalid_config(format!(
                "Failed to parse embedded config {}: {}",
                filename, e
            ))
        })
    }

    /// Load a YAML file as a value
    fn load_yaml_value(&self, path: &Utf8Path) -> Result<Value> {
        let content = fs::read_to_string(path)?;
        serde_yaml_ng::from_str(&content)
            .map_err(|e| Error::invalid_config(format!("Failed to parse {}: {}", path, e)))
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(mut config: UpdaterConfig) -> Result<UpdaterConfig> {
        if let Ok(val) = env::var("UPDRAFT_API_URL") {
            config.feed.api_url = val;
        }

        if let Ok(val) = env::var("UPDRAFT_REPO_OWNER") {
            config.feed.repo_owner = val;
        }

        if let Ok(val) = env::var("UPDRAFT_REPO_NAME") {
            config.feed.repo_name = val;
        }

        if let Ok(val) = env::var("UPDRAFT_RELEASE_PAGE_URL") {
            config.feed.release_page_url = Some(val);
        }

        if let Ok(val) = env::var("UPDRAFT_HTTP_TIMEOUT_SECS") {
            config.feed.http_timeout_secs = val.parse().map_err(|_| {
                Error::invalid_config("UPDRAFT_HTTP_TIMEOUT_SECS must be a valid number")
            })?;
        }

        if let Ok(val) = env::var("UPDRAFT_DOWNLOAD_CHUNK_SIZE") {
            config.download.chunk_size = val.parse().map_err(|_| {
                Error::invalid_config("UPDRAFT_DOWNLOAD_CHUNK_SIZE must be a valid number")
            })?;
        }

        if let Ok(val) = env::var("UPDRAFT_APP_ROOT") {
            config.install.app_root = Some(Utf8PathBuf::from(val));
        }

        if let Ok(val) = env::var("UPDRAFT_STAGING_PATH") {
            config.download.staging_path = Utf8PathBuf::from(val);
        }

        if config.download.chunk_size == 0 {
            return Err(Error::invalid_config("download chunk-size must be non-zero"));
        }

        Ok(config)
    }

    /// Get the config directory path
    pub fn config_dir(&self) -> &Utf8Path {
        &self.config_dir
    }
}

/// Deep-merge `overlay` into `base`; mappings merge per key, everything else replaces
fn merge_values(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Mapping(base_map), Value::Mapping(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(&key) {
                    Some(existing) => merge_values(existing, value),
                    None => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (_, Value::Null) => {}
        (base, overlay) => *base = overlay,
    }
}
