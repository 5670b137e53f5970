//! Error types for updraft-core

use thiserror::Error;

/// Result type alias using updraft-core's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for Updraft
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    /// Invalid configuration format
    #[error("Invalid configuration format: {message}")]
    InvalidConfig { message: String },

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    YamlParse(#[from] serde_yaml_ng::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A path that cannot be represented as UTF-8
    #[error("Path is not valid UTF-8: {path}")]
    NonUtf8Path { path: String },
}

impl Error {
    /// Create a config not found error
    pub fn config_not_found(path: impl Into<String>) -> Self {
        Self::ConfigNotFound { path: path.into() }
    }

    /// Create an invalid config error
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create a non-UTF-8 path error
    pub fn non_utf8_path(path: &std::path::Path) -> Self {
        Self::NonUtf8Path {
            path: path.display().to_string(),
        }
    }
}
