//! Builders for feed payloads, configuration and application layouts

use camino::Utf8PathBuf;
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use updraft_core::types::{OsFamily, PlatformTarget, UpdaterConfig};

use super::constants::*;

/// Builder for latest-release JSON payloads
#[derive(Debug, Clone)]
pub struct ReleaseBuilder {
    tag_name: Option<String>,
    assets: Vec<Value>,
}

impl ReleaseBuilder {
    /// Create a builder for the newer test release without assets
    pub fn new() -> Self {
        Self {
            tag_name: Some(NEWER_TAG.to_string()),
            assets: Vec::new(),
        }
    }

    /// Set the tag name
    pub fn tag(mut self, tag: &str) -> Self {
        self.tag_name = Some(tag.to_string());
        self
    }

    /// Omit the tag name from the payload
    pub fn without_tag(mut self) -> Self {
        self.tag_name = None;
        self
    }

    /// Add an asset downloadable from `url`
    pub fn asset(mut self, name: &str, url: &str) -> Self {
        self.assets.push(json!({
            "name": name,
            "browser_download_url": url,
        }));
        self
    }

    /// Add an asset whose entry has no download URL
    pub fn asset_without_url(mut self, name: &str) -> Self {
        self.assets.push(json!({ "name": name }));
        self
    }

    /// Build the JSON payload
    pub fn build(self) -> Value {
        let mut release = json!({
            "name": "Gadget release",
            "html_url": RELEASE_PAGE,
            "assets": self.assets,
        });
        if let Some(tag) = self.tag_name {
            release["tag_name"] = json!(tag);
        }
        release
    }
}

impl Default for ReleaseBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Platform using in-place archive installs
pub fn windows_platform() -> PlatformTarget {
    PlatformTarget::new(OsFamily::Windows, "x86_64")
}

/// Platform using package hand-off installs
pub fn macos_arm_platform() -> PlatformTarget {
    PlatformTarget::new(OsFamily::MacOs, "arm64")
}

/// Temporary application root with an executable and version marker
pub struct AppLayout {
    pub temp: TempDir,
}

impl AppLayout {
    /// Create a root holding the old executable and `version`
    pub fn new(version: &str) -> Self {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(EXECUTABLE), OLD_EXECUTABLE).unwrap();
        fs::write(temp.path().join(VERSION_MARKER), version).unwrap();
        Self { temp }
    }

    pub fn root(&self) -> &Path {
        self.temp.path()
    }

    pub fn executable(&self) -> PathBuf {
        self.root().join(EXECUTABLE)
    }

    pub fn version_marker(&self) -> PathBuf {
        self.root().join(VERSION_MARKER)
    }

    pub fn backup_of(&self, name: &str) -> PathBuf {
        self.root().join(format!("{}.bak", name))
    }

    pub fn staging(&self) -> PathBuf {
        self.root().join("resource").join("update.temp")
    }

    /// Updater configuration pointing at `api_url` and this root
    pub fn config(&self, api_url: &str) -> UpdaterConfig {
        let mut config = UpdaterConfig::default();
        config.feed.api_url = api_url.to_string();
        config.feed.repo_owner = REPO_OWNER.to_string();
        config.feed.repo_name = REPO_NAME.to_string();
        config.feed.release_page_url = Some(RELEASE_PAGE.to_string());
        config.feed.http_timeout_secs = 5;
        config.install.app_root =
            Some(Utf8PathBuf::from_path_buf(self.root().to_path_buf()).unwrap());
        config.install.executable = Some(EXECUTABLE.to_string());
        config.notifications.handoff_delay_ms = 0;
        config.notifications.restart_delay_ms = 0;
        config
    }
}
