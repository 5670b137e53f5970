//! CLI command implementations

pub mod check;
pub mod config;
pub mod download;
pub mod install;
pub mod status;
pub mod update;

use anyhow::{Context, Result};
use camino::Utf8Path;
use tracing::debug;
use updraft_core::{HierarchicalConfigLoader, UpdaterConfig};
use updraft_update::UpdateOrchestrator;

use crate::terminal::TerminalSink;

/// Load the effective updater configuration
pub fn load_config(path: Option<&Utf8Path>) -> Result<UpdaterConfig> {
    let loader = HierarchicalConfigLoader::new().context("Failed to create config loader")?;
    match path {
        Some(path) => debug!("Loading updater config from {}", path),
        None => debug!("Loading updater config from {}", loader.config_dir()),
    }
    loader
        .load_updater_config_from(path)
        .context("Failed to load updater config")
}

/// Build an orchestrator rendering its events on the terminal
pub fn orchestrator(path: Option<&Utf8Path>) -> Result<UpdateOrchestrator> {
    let config = load_config(path)?;
    UpdateOrchestrator::builder(config)
        .event_sink(TerminalSink::new())
        .build()
        .context("Failed to initialise updater")
}
