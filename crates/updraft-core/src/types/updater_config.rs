//! Updater configuration types
//!
//! These types define where the release feed lives, how artifacts are
//! downloaded and staged, which files make up the installed application,
//! and how long the UI gets to show notifications before a restart.

use crate::error::{Error, Result};
use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Complete updater configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct UpdaterConfig {
    /// Release feed settings
    #[serde(default)]
    pub feed: FeedConfig,

    /// Download and staging settings
    #[serde(default)]
    pub download: DownloadConfig,

    /// Installed application layout
    #[serde(default)]
    pub install: InstallConfig,

    /// Notification timing
    #[serde(default)]
    pub notifications: NotificationConfig,
}

/// Release feed configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct FeedConfig {
    /// Base URL of the GitHub-compatible releases API
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Repository owner
    #[serde(default = "default_repo_owner")]
    pub repo_owner: String,

    /// Repository name
    #[serde(default = "default_repo_name")]
    pub repo_name: String,

    /// Public release page opened after an install (derived when unset)
    #[serde(default)]
    pub release_page_url: Option<String>,

    /// HTTP timeout in seconds
    #[serde(default = "default_http_timeout")]
    pub http_timeout_secs: u64,

    /// User agent string for HTTP requests
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            repo_owner: default_repo_owner(),
            repo_name: default_repo_name(),
            release_page_url: None,
            http_timeout_secs: default_http_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

impl FeedConfig {
    /// Endpoint returning the latest release metadata
    pub fn latest_release_url(&self) -> String {
        format!(
            "{}/repos/{}/{}/releases/latest",
            self.api_url.trim_end_matches('/'),
            self.repo_owner,
            self.repo_name
        )
    }

    /// Public page of the latest release
    pub fn release_page(&self) -> String {
        self.release_page_url.clone().unwrap_or_else(|| {
            format!(
                "https://github.com/{}/{}/releases/latest",
                self.repo_owner, self.repo_name
            )
        })
    }

    /// HTTP timeout as a duration
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

fn default_api_url() -> String {
    "https://api.github.com".to_string()
}
fn default_repo_owner() -> String {
    "updraft-app".to_string()
}
fn default_repo_name() -> String {
    "updraft".to_string()
}
fn default_http_timeout() -> u64 {
    60
}
fn default_user_agent() -> String {
    format!(
        "updraft/{} ({}; {})",
        env!("CARGO_PKG_VERSION"),
        std::env::consts::OS,
        std::env::consts::ARCH
    )
}

/// Download configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct DownloadConfig {
    /// Write chunk size in bytes
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Staging file for the downloaded artifact (relative to the app root)
    #[serde(default = "default_staging_path")]
    pub staging_path: Utf8PathBuf,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            staging_path: default_staging_path(),
        }
    }
}

fn default_chunk_size() -> usize {
    1024 * 1024 // 1 MiB
}
fn default_staging_path() -> Utf8PathBuf {
    Utf8PathBuf::from("resource/update.temp")
}

/// Installed application layout
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct InstallConfig {
    /// Application root (defaults to the directory of the running executable)
    #[serde(default)]
    pub app_root: Option<Utf8PathBuf>,

    /// Main executable file name (defaults to the running executable's name)
    #[serde(default)]
    pub executable: Option<String>,

    /// Version marker file name
    #[serde(default = "default_version_marker")]
    pub version_marker: String,

    /// Extension of in-place update archives
    #[serde(default = "default_archive_extension")]
    pub archive_extension: String,

    /// Extension of native installer packages
    #[serde(default = "default_package_extension")]
    pub package_extension: String,

    /// Suffix appended to backup copies
    #[serde(default = "default_backup_suffix")]
    pub backup_suffix: String,
}

impl Default for InstallConfig {
    fn default() -> Self {
        Self {
            app_root: None,
            executable: None,
            version_marker: default_version_marker(),
            archive_extension: default_archive_extension(),
            package_extension: default_package_extension(),
            backup_suffix: default_backup_suffix(),
        }
    }
}

fn default_version_marker() -> String {
    "version.txt".to_string()
}
fn default_archive_extension() -> String {
    "zip".to_string()
}
fn default_package_extension() -> String {
    "dmg".to_string()
}
fn default_backup_suffix() -> String {
    "bak".to_string()
}

/// Notification timing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct NotificationConfig {
    /// How long toasts stay visible, in seconds
    #[serde(default = "default_toast_duration")]
    pub toast_duration_secs: u64,

    /// Pause before opening the release page on package hand-off
    #[serde(default = "default_handoff_delay")]
    pub handoff_delay_ms: u64,

    /// Pause before opening the release page and terminating after an in-place install
    #[serde(default = "default_restart_delay")]
    pub restart_delay_ms: u64,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            toast_duration_secs: default_toast_duration(),
            handoff_delay_ms: default_handoff_delay(),
            restart_delay_ms: default_restart_delay(),
        }
    }
}

impl NotificationConfig {
    /// Toast duration
    pub fn toast_duration(&self) -> Duration {
        Duration::from_secs(self.toast_duration_secs)
    }

    /// Hand-off delay
    pub fn handoff_delay(&self) -> Duration {
        Duration::from_millis(self.handoff_delay_ms)
    }

    /// Restart delay
    pub fn restart_delay(&self) -> Duration {
        Duration::from_millis(self.restart_delay_ms)
    }
}

fn default_toast_duration() -> u64 {
    60
}
fn default_handoff_delay() -> u64 {
    1000
}
fn default_restart_delay() -> u64 {
    3000
}

/// Absolute filesystem locations the updater touches
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallPaths {
    /// Application root directory
    pub app_root: PathBuf,

    /// Main executable
    pub executable: PathBuf,

    /// Version marker file
    pub version_marker: PathBuf,

    /// Staging file for downloaded artifacts
    pub staging: PathBuf,
}

impl UpdaterConfig {
    /// Resolve the configured layout into absolute paths
    ///
    /// Unset app root and executable fall back to the running executable.
    pub fn resolve_paths(&self) -> Result<InstallPaths> {
        let current_exe = std::env::current_exe()?;

        let app_root = match &self.install.app_root {
            Some(root) => root.clone().into_std_path_buf(),
            None => current_exe
                .parent()
                .map(|p| p.to_path_buf())
                .ok_or_else(|| Error::invalid_config("Cannot determine application root"))?,
        };

        let executable = match &self.install.executable {
            Some(name) => name.clone(),
            None => current_exe
                .file_name()
                .and_then(|n| n.to_str())
                .map(String::from)
                .ok_or_else(|| Error::non_utf8_path(&current_exe))?,
        };

        Ok(InstallPaths {
            executable: app_root.join(executable),
            version_marker: app_root.join(&self.install.version_marker),
            staging: resolve_under(&app_root, &self.download.staging_path),
            app_root,
        })
    }
}

fn resolve_under(root: &std::path::Path, path: &Utf8Path) -> PathBuf {
    if path.is_absolute() {
        path.as_std_path().to_path_buf()
    } else {
        root.join(path.as_std_path())
    }
}
