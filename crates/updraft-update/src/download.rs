//! Streaming artifact download with progress tracking
//!
//! The artifact is written to a fixed staging file in chunks of a configured
//! size. The server must announce the body size up front; progress is
//! reported against it and the download is complete as soon as the declared
//! number of bytes has been written.

use futures_util::StreamExt;
use reqwest::header::CONTENT_LENGTH;
use reqwest::redirect::Policy;
use std::path::PathBuf;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};
use updraft_core::types::{DownloadConfig, FeedConfig};

use crate::error::{IoResultExt, Result, UpdateError};

/// Maximum number of redirects followed for an artifact URL
const MAX_REDIRECTS: usize = 10;

/// Download progress information
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DownloadProgress {
    /// Total bytes to download
    pub total_bytes: u64,

    /// Bytes downloaded so far
    pub downloaded_bytes: u64,
}

impl DownloadProgress {
    /// Progress percentage (0-100)
    pub fn percentage(&self) -> f64 {
        if self.total_bytes > 0 {
            (self.downloaded_bytes as f64 / self.total_bytes as f64) * 100.0
        } else {
            0.0
        }
    }

    /// Check if download is complete
    pub fn is_complete(&self) -> bool {
        self.downloaded_bytes >= self.total_bytes
    }
}

/// Result of a download operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadResult {
    /// Path to the downloaded file
    pub file_path: PathBuf,

    /// Size declared by the server
    pub total_bytes: u64,
}

/// Downloader writing one artifact at a time to the staging file
pub struct UpdateDownloader {
    /// HTTP client
    client: reqwest::Client,

    /// Staging file
    staging: PathBuf,

    /// Write chunk size
    chunk_size: usize,
}

impl UpdateDownloader {
    /// Create a new downloader targeting `staging`
    pub fn new(feed: &FeedConfig, download: &DownloadConfig, staging: PathBuf) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(&feed.user_agent)
            .connect_timeout(feed.http_timeout())
            .read_timeout(feed.http_timeout())
            .redirect(Policy::limited(MAX_REDIRECTS))
            .build()?;

        Ok(Self {
            client,
            staging,
            chunk_size: download.chunk_size.max(1),
        })
    }

    /// Download `url` into the staging file
    ///
    /// `on_progress` is called after every written chunk that leaves the
    /// download incomplete. It is never called for a failed size check.
    pub async fn download<F>(&self, url: &str, mut on_progress: F) -> Result<DownloadResult>
    where
        F: FnMut(DownloadProgress),
    {
        debug!("Requesting artifact: {}", url);
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpdateError::HttpStatus {
                status,
                url: url.to_string(),
            });
        }

        let total = response
            .headers()
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|&len| len > 0)
            .ok_or(UpdateError::SizeUnknown)?;

        info!(
            "Downloading {} to {}",
            human_readable_size(total),
            self.staging.display()
        );

        self.prepare_staging().await?;
        let mut file = tokio::fs::File::create(&self.staging)
            .await
            .fs_context("Failed to create staging file", &self.staging)?;

        let mut downloaded: u64 = 0;
        let mut buffer: Vec<u8> = Vec::with_capacity(self.chunk_size);
        let mut stream = response.bytes_stream();

        while let Some(chunk) = stream.next().await {
            let chunk: bytes::Bytes = chunk?;
            let mut rest = &chunk[..];

            while !rest.is_empty() {
                let take = (self.chunk_size - buffer.len()).min(rest.len());
                buffer.extend_from_slice(&rest[..take]);
                rest = &rest[take..];

                if buffer.len() == self.chunk_size {
                    downloaded = self.flush(&mut file, &mut buffer, downloaded).await?;
                    let progress = DownloadProgress {
                        total_bytes: total,
                        downloaded_bytes: downloaded,
                    };
                    if progress.is_complete() {
                        return self.finish(file, total).await;
                    }
                    debug!("Downloaded {:.1}%", progress.percentage());
                    on_progress(progress);
                }
            }
        }

        if !buffer.is_empty() {
            downloaded = self.flush(&mut file, &mut buffer, downloaded).await?;
        }

        if downloaded >= total {
            return self.finish(file, total).await;
        }

        Err(UpdateError::Truncated {
            expected: total,
            received: downloaded,
        })
    }

    /// Remove a leftover staging file and make sure its directory exists
    async fn prepare_staging(&self) -> Result<()> {
        match tokio::fs::remove_file(&self.staging).await {
            Ok(()) => debug!("Removed previous staging file"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(UpdateError::filesystem(
                    "Failed to remove previous staging file",
                    &self.staging,
                    e,
                ))
            }
        }

        if let Some(parent) = self.staging.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .fs_context("Failed to create staging directory", parent)?;
        }
        Ok(())
    }

    async fn flush(
        &self,
        file: &mut tokio::fs::File,
        buffer: &mut Vec<u8>,
        downloaded: u64,
    ) -> Result<u64> {
        file.write_all(buffer)
            .await
            .fs_context("Failed to write staging file", &self.staging)?;
        let written = buffer.len() as u64;
        buffer.clear();
        Ok(downloaded + written)
    }

    async fn finish(&self, mut file: tokio::fs::File, total: u64) -> Result<DownloadResult> {
        file.flush()
            .await
            .fs_context("Failed to flush staging file", &self.staging)?;

        info!("Download completed: {}", human_readable_size(total));
        Ok(DownloadResult {
            file_path: self.staging.clone(),
            total_bytes: total,
        })
    }
}

/// Convert bytes to human-readable size
pub fn human_readable_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    format!("{:.2} {}", size, UNITS[unit_index])
}
