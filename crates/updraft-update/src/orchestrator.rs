//! Update orchestration
//!
//! [`UpdateOrchestrator`] owns every collaborator of the update pipeline and
//! exposes three fire-and-forget commands: check, download and install.
//! Each command spawns its own task on a shared [`TaskTracker`] and reports
//! progress through the configured [`EventSink`]. The returned join handles
//! carry the result for callers that want to wait; the UI normally does not.
//!
//! Downloads and installs both use the staging file and run one at a time
//! under a shared staging lock. An install requested while a download is
//! running waits for it and then applies the finished artifact.
//!
//! Commands must be issued from within a tokio runtime.

use std::fmt;
use std::path::Path;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, info, warn};
use updraft_core::types::{InstallPaths, PlatformTarget, UpdaterConfig};

use crate::download::{DownloadResult, UpdateDownloader};
use crate::error::Result;
use crate::events::{EventSink, TracingSink, UpdateEvent};
use crate::installer::{InstallOutcome, Installer};
use crate::releases::ReleaseFeedClient;
use crate::state::{SharedState, UpdateStatus};
use crate::system::{NativeSystem, SystemHooks};
use crate::version::ReleaseVersion;

/// Result of an update check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    /// A newer release exists
    UpdateAvailable(ReleaseVersion),

    /// The running version is current
    UpToDate,

    /// The check failed; nothing was published
    Unavailable,
}

/// Builder for [`UpdateOrchestrator`]
pub struct UpdateOrchestratorBuilder {
    config: UpdaterConfig,
    platform: Option<PlatformTarget>,
    sink: Option<Arc<dyn EventSink>>,
    system: Option<Arc<dyn SystemHooks>>,
}

impl UpdateOrchestratorBuilder {
    /// Override the detected platform
    pub fn platform(mut self, platform: PlatformTarget) -> Self {
        self.platform = Some(platform);
        self
    }

    /// Deliver events to `sink` instead of the log
    pub fn event_sink(mut self, sink: impl EventSink + 'static) -> Self {
        self.sink = Some(Arc::new(sink));
        self
    }

    /// Replace the operating system hooks
    pub fn system_hooks(mut self, system: impl SystemHooks + 'static) -> Self {
        self.system = Some(Arc::new(system));
        self
    }

    /// Resolve paths, build the HTTP clients and seed the running version
    pub fn build(self) -> Result<UpdateOrchestrator> {
        let config = self.config;
        let platform = self.platform.unwrap_or_else(PlatformTarget::detect);
        let paths = config.resolve_paths()?;

        let feed = ReleaseFeedClient::new(&config.feed, &config.install)?;
        let downloader =
            UpdateDownloader::new(&config.feed, &config.download, paths.staging.clone())?;
        let installer = Installer::for_platform(&platform, &paths, &config.install.backup_suffix);

        let version = read_version_marker(&paths.version_marker);
        info!(
            "Updater ready: version={}, platform={}, root={}",
            version,
            platform,
            paths.app_root.display()
        );

        Ok(UpdateOrchestrator {
            inner: Arc::new(Inner {
                release_page: config.feed.release_page(),
                config,
                platform,
                paths,
                feed,
                downloader,
                installer,
                state: Arc::new(SharedState::new(version)),
                sink: self.sink.unwrap_or_else(|| Arc::new(TracingSink)),
                system: self.system.unwrap_or_else(|| Arc::new(NativeSystem)),
                staging_lock: tokio::sync::Mutex::new(()),
                tracker: TaskTracker::new(),
            }),
        })
    }
}

/// Running version from the marker file, or the crate version when unreadable
fn read_version_marker(path: &Path) -> String {
    match std::fs::read_to_string(path) {
        Ok(content) if !content.trim().is_empty() => content.trim().to_string(),
        Ok(_) => {
            warn!("Version marker {} is empty", path.display());
            default_version()
        }
        Err(e) => {
            debug!("Version marker {} unreadable: {}", path.display(), e);
            default_version()
        }
    }
}

fn default_version() -> String {
    format!("v{}", env!("CARGO_PKG_VERSION"))
}

/// Handle to the update pipeline; cheap to clone
#[derive(Clone)]
pub struct UpdateOrchestrator {
    inner: Arc<Inner>,
}

struct Inner {
    config: UpdaterConfig,
    platform: PlatformTarget,
    paths: InstallPaths,
    release_page: String,
    feed: ReleaseFeedClient,
    downloader: UpdateDownloader,
    installer: Installer,
    state: Arc<SharedState>,
    sink: Arc<dyn EventSink>,
    system: Arc<dyn SystemHooks>,
    staging_lock: tokio::sync::Mutex<()>,
    tracker: TaskTracker,
}

impl UpdateOrchestrator {
    /// Start building an orchestrator from configuration
    pub fn builder(config: UpdaterConfig) -> UpdateOrchestratorBuilder {
        UpdateOrchestratorBuilder {
            config,
            platform: None,
            sink: None,
            system: None,
        }
    }

    /// Check the feed for a newer release
    ///
    /// Failures are logged and otherwise ignored.
    pub fn start_check(&self) -> JoinHandle<CheckOutcome> {
        let inner = Arc::clone(&self.inner);
        self.inner.tracker.spawn(async move { inner.check().await })
    }

    /// Download the latest release asset for this platform
    ///
    /// Concurrent downloads run one after another, and a download requested
    /// during an install starts once the install has finished with the
    /// staging file.
    pub fn start_download(&self) -> JoinHandle<Result<DownloadResult>> {
        let inner = Arc::clone(&self.inner);
        self.inner.tracker.spawn(async move { inner.download().await })
    }

    /// Install the staged artifact
    ///
    /// Returns `None` without doing anything when an install is already
    /// running. An install accepted during a download waits for the download
    /// to finish.
    pub fn start_install(&self) -> Option<JoinHandle<InstallOutcome>> {
        let guard = match self.inner.state.try_begin_extracting() {
            Some(guard) => guard,
            None => {
                debug!("Install already in progress; ignoring request");
                return None;
            }
        };

        let inner = Arc::clone(&self.inner);
        Some(self.inner.tracker.spawn(async move {
            let _guard = guard;
            inner.install().await
        }))
    }

    /// Current lifecycle status
    pub fn status(&self) -> UpdateStatus {
        self.inner.state.status()
    }

    /// Cached running version
    pub fn version(&self) -> String {
        self.inner.state.version()
    }

    /// Replace the cached running version
    pub fn set_version(&self, version: impl Into<String>) {
        self.inner.state.set_version(version);
    }

    /// Whether an install is in progress
    pub fn is_extracting(&self) -> bool {
        self.inner.state.is_extracting()
    }

    /// Platform updates are selected for
    pub fn platform(&self) -> &PlatformTarget {
        &self.inner.platform
    }

    /// Filesystem layout updates are applied to
    pub fn paths(&self) -> &InstallPaths {
        &self.inner.paths
    }

    /// Public release page opened after installs
    pub fn release_page_url(&self) -> &str {
        &self.inner.release_page
    }

    /// Wait for every task spawned so far to finish
    pub async fn shutdown(&self) {
        self.inner.tracker.close();
        self.inner.tracker.wait().await;
    }
}

impl fmt::Debug for UpdateOrchestrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpdateOrchestrator")
            .field("platform", &self.inner.platform)
            .field("paths", &self.inner.paths)
            .field("status", &self.status())
            .finish_non_exhaustive()
    }
}

impl Inner {
    fn publish(&self, event: UpdateEvent) {
        self.sink.publish(event);
    }

    fn toast_success(&self, message: impl Into<String>) {
        self.publish(UpdateEvent::success(
            message,
            self.config.notifications.toast_duration(),
        ));
    }

    fn toast_error(&self, message: impl Into<String>) {
        self.publish(UpdateEvent::error(
            message,
            self.config.notifications.toast_duration(),
        ));
    }

    async fn check(&self) -> CheckOutcome {
        match self.find_newer().await {
            Ok(Some(latest)) => {
                info!("Update available: {} -> {}", self.state.version(), latest);
                // Leave an in-flight or finished download alone
                self.state.transition(
                    &[UpdateStatus::Idle, UpdateStatus::UpdateAvailable],
                    UpdateStatus::UpdateAvailable,
                );
                self.toast_success(format!("New version {} available", latest));
                self.publish(UpdateEvent::CheckDone {
                    new_version: true,
                    version: latest.to_string(),
                });
                CheckOutcome::UpdateAvailable(latest)
            }
            Ok(None) => {
                debug!("Already on latest version: {}", self.state.version());
                CheckOutcome::UpToDate
            }
            Err(e) => {
                debug!("Update check failed: {}", e);
                CheckOutcome::Unavailable
            }
        }
    }

    async fn find_newer(&self) -> Result<Option<ReleaseVersion>> {
        let release = self.feed.fetch_latest().await?;
        let latest = release.version()?;
        let current = ReleaseVersion::parse(&self.state.version())?;
        Ok((latest > current).then_some(latest))
    }

    async fn download(&self) -> Result<DownloadResult> {
        let _staging = self.staging_lock.lock().await;
        self.state.set_status(UpdateStatus::Downloading);

        match self.fetch_artifact().await {
            Ok(result) => {
                self.state.set_status(UpdateStatus::Downloaded);
                self.toast_success("Update downloaded and ready to install");
                self.publish(UpdateEvent::DownloadDone {
                    total_size: result.total_bytes,
                });
                Ok(result)
            }
            Err(e) => {
                error!("Update download failed: {}", e);
                self.state.set_status(UpdateStatus::Idle);
                self.toast_error(format!("Update download failed: {}", e));
                self.publish(UpdateEvent::DownloadError {
                    message: e.to_string(),
                });
                Err(e)
            }
        }
    }

    async fn fetch_artifact(&self) -> Result<DownloadResult> {
        let release = self.feed.fetch_latest().await?;
        let asset = self.feed.select_asset(&release, &self.platform)?;

        self.downloader
            .download(&asset.browser_download_url, |progress| {
                self.publish(UpdateEvent::DownloadProgress {
                    total_size: progress.total_bytes,
                    downloaded_size: progress.downloaded_bytes,
                })
            })
            .await
    }

    async fn install(&self) -> InstallOutcome {
        let outcome = {
            let _staging = self.staging_lock.lock().await;
            match self.installer.install(&self.paths.staging).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    error!("Install task failed: {}", e);
                    InstallOutcome::RolledBack {
                        error: e.to_string(),
                    }
                }
            }
        };

        let notifications = &self.config.notifications;
        match &outcome {
            InstallOutcome::HandedOff => {
                self.toast_success(
                    "Install the downloaded package from the release page, then restart",
                );
                tokio::time::sleep(notifications.handoff_delay()).await;
                self.open_release_page();
            }
            InstallOutcome::Applied => {
                self.toast_success("Update installed, the application will restart");
                self.publish(UpdateEvent::RestartRequired);
                tokio::time::sleep(notifications.restart_delay()).await;
                self.open_release_page();
                if let Err(e) = self.system.request_termination() {
                    warn!("Failed to request termination: {}", e);
                }
            }
            InstallOutcome::RolledBack { error } => {
                self.toast_error(format!("Update install failed: {}", error));
                self.publish(UpdateEvent::InstallFailed {
                    message: error.clone(),
                });
            }
        }

        outcome
    }

    fn open_release_page(&self) {
        if let Err(e) = self.system.open_url(&self.release_page) {
            warn!("Failed to open {}: {}", self.release_page, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_version_marker_is_trimmed() {
        let temp = TempDir::new().unwrap();
        let marker = temp.path().join("version.txt");
        std::fs::write(&marker, "MyApp v1.4.2\n").unwrap();

        assert_eq!(read_version_marker(&marker), "MyApp v1.4.2");
    }

    #[test]
    fn test_missing_or_empty_marker_falls_back() {
        let temp = TempDir::new().unwrap();
        let marker = temp.path().join("version.txt");
        assert_eq!(read_version_marker(&marker), default_version());

        std::fs::write(&marker, "  \n").unwrap();
        assert_eq!(read_version_marker(&marker), default_version());
        assert!(ReleaseVersion::parse(&default_version()).is_ok());
    }
}
