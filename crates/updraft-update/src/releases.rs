//! Release feed access and platform asset selection

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use updraft_core::types::{FeedConfig, InstallConfig, InstallStrategy, PlatformTarget};

use crate::error::{Result, UpdateError};
use crate::version::ReleaseVersion;

/// Latest release metadata as published by the feed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseInfo {
    /// Release tag (e.g., "v3.0.0")
    #[serde(default = "default_tag_name")]
    pub tag_name: String,

    /// Release name
    #[serde(default)]
    pub name: Option<String>,

    /// Public page of the release
    #[serde(default)]
    pub html_url: Option<String>,

    /// Release assets
    #[serde(default)]
    pub assets: Vec<ReleaseAsset>,
}

fn default_tag_name() -> String {
    "v0.0.0".to_string()
}

impl ReleaseInfo {
    /// Parse the version carried by the release tag
    pub fn version(&self) -> Result<ReleaseVersion> {
        ReleaseVersion::parse(&self.tag_name)
    }
}

/// Release asset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseAsset {
    /// Asset name
    pub name: String,

    /// Download URL; empty when the feed omits it
    #[serde(default)]
    pub browser_download_url: String,

    /// Asset size in bytes, when the feed reports it
    #[serde(default)]
    pub size: Option<u64>,
}

/// File extensions that identify installable assets
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRules {
    /// Extension of in-place update archives (without the dot)
    pub archive_extension: String,

    /// Extension of native installer packages (without the dot)
    pub package_extension: String,
}

impl AssetRules {
    /// Take the extensions from the install configuration
    pub fn from_config(install: &InstallConfig) -> Self {
        Self {
            archive_extension: install.archive_extension.clone(),
            package_extension: install.package_extension.clone(),
        }
    }

    /// Whether an asset name is installable on `platform`
    pub fn matches(&self, name: &str, platform: &PlatformTarget) -> bool {
        match platform.install_strategy() {
            InstallStrategy::PackageHandoff => name.ends_with(&format!(
                "_{}_{}.{}",
                platform.os().asset_label(),
                platform.arch(),
                self.package_extension
            )),
            InstallStrategy::InPlaceArchive => {
                name.ends_with(&format!(".{}", self.archive_extension))
            }
        }
    }
}

impl Default for AssetRules {
    fn default() -> Self {
        Self::from_config(&InstallConfig::default())
    }
}

/// Client for the latest-release endpoint
pub struct ReleaseFeedClient {
    /// HTTP client
    client: reqwest::Client,

    /// Latest release endpoint
    endpoint: String,

    /// Asset naming rules
    rules: AssetRules,
}

impl ReleaseFeedClient {
    /// Create a new feed client
    pub fn new(feed: &FeedConfig, install: &InstallConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(&feed.user_agent)
            .timeout(feed.http_timeout())
            .build()?;

        Ok(Self {
            client,
            endpoint: feed.latest_release_url(),
            rules: AssetRules::from_config(install),
        })
    }

    /// Latest release endpoint
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Fetch the latest release metadata
    pub async fn fetch_latest(&self) -> Result<ReleaseInfo> {
        debug!("Fetching latest release from: {}", self.endpoint);

        let response = self.client.get(&self.endpoint).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpdateError::HttpStatus {
                status,
                url: self.endpoint.clone(),
            });
        }

        let body = response.text().await?;
        let release: ReleaseInfo =
            serde_json::from_str(&body).map_err(UpdateError::MalformedFeed)?;

        debug!(
            "Latest release {} with {} assets",
            release.tag_name,
            release.assets.len()
        );
        Ok(release)
    }

    /// Pick the first downloadable asset installable on `platform`
    pub fn select_asset<'a>(
        &self,
        release: &'a ReleaseInfo,
        platform: &PlatformTarget,
    ) -> Result<&'a ReleaseAsset> {
        let asset = release
            .assets
            .iter()
            .filter(|a| !a.browser_download_url.is_empty())
            .find(|a| self.rules.matches(&a.name, platform))
            .ok_or_else(|| UpdateError::AssetNotFound {
                os: platform.os().to_string(),
                arch: platform.arch().to_string(),
            })?;

        info!("Selected asset {} for {}", asset.name, platform);
        Ok(asset)
    }
}
