//! Error taxonomy for the update pipeline

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type alias for update operations
pub type Result<T> = std::result::Result<T, UpdateError>;

/// Errors raised while checking, downloading, or installing an update
#[derive(Error, Debug)]
pub enum UpdateError {
    /// Connection failure or timeout
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("HTTP {status} from {url}")]
    HttpStatus {
        status: reqwest::StatusCode,
        url: String,
    },

    /// Version string without a `vMAJOR.MINOR.PATCH` suffix
    #[error("Invalid version string: {input:?}")]
    InvalidVersion { input: String },

    /// Release metadata that is not valid feed JSON
    #[error("Malformed release metadata: {0}")]
    MalformedFeed(#[source] serde_json::Error),

    /// No release asset matches the running platform
    #[error("No suitable asset found for {os}/{arch}")]
    AssetNotFound { os: String, arch: String },

    /// Download response did not declare a usable size
    #[error("Download size unknown: Content-Length is missing or zero")]
    SizeUnknown,

    /// Body ended before the declared size was reached
    #[error("Download truncated: received {received} of {expected} bytes")]
    Truncated { expected: u64, received: u64 },

    /// Filesystem operation failed
    #[error("{context} ({}): {source}", .path.display())]
    Filesystem {
        context: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Archive could not be read
    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// Archive layout is not what an in-place update expects
    #[error("Invalid update archive: {0}")]
    InvalidArchive(String),

    /// Configuration could not be loaded or resolved
    #[error(transparent)]
    Config(#[from] updraft_core::Error),

    /// A background task panicked or was aborted
    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl UpdateError {
    /// Create an invalid version error
    pub fn invalid_version(input: impl Into<String>) -> Self {
        Self::InvalidVersion {
            input: input.into(),
        }
    }

    /// Wrap an IO error with the operation and path it concerns
    pub fn filesystem(context: &'static str, path: &Path, source: std::io::Error) -> Self {
        Self::Filesystem {
            context,
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Attach filesystem context to IO results
pub(crate) trait IoResultExt<T> {
    fn fs_context(self, context: &'static str, path: &Path) -> Result<T>;
}

impl<T> IoResultExt<T> for std::io::Result<T> {
    fn fs_context(self, context: &'static str, path: &Path) -> Result<T> {
        self.map_err(|e| UpdateError::filesystem(context, path, e))
    }
}
