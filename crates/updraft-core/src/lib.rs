//! # updraft-core
//!
//! Core library for Updraft providing:
//! - Updater configuration types with embedded defaults
//! - Hierarchical configuration loading (defaults, user file, environment)
//! - Platform detection and installer strategy selection

pub mod config;
pub mod error;
pub mod types;

pub use config::HierarchicalConfigLoader;
pub use error::{Error, Result};
pub use types::{InstallPaths, InstallStrategy, OsFamily, PlatformTarget, UpdaterConfig};
