//! Install command

use anyhow::{anyhow, Result};
use camino::Utf8Path;
use tracing::{info, warn};
use updraft_update::{InstallOutcome, UpdateOrchestrator};

use crate::output;

pub async fn run(config: Option<&Utf8Path>) -> Result<()> {
    let orchestrator = super::orchestrator(config)?;
    install(&orchestrator).await
}

/// Install the staged artifact
///
/// After an in-place install the process is asked to terminate so the new
/// files can take over.
pub async fn install(orchestrator: &UpdateOrchestrator) -> Result<()> {
    let staging = &orchestrator.paths().staging;
    if !staging.exists() {
        return Err(anyhow!(
            "No downloaded update at {} (run 'updraft download' first)",
            staging.display()
        ));
    }

    info!("Installing staged update from {}", staging.display());
    let handle = orchestrator
        .start_install()
        .ok_or_else(|| anyhow!("An install is already in progress"))?;

    let spinner = output::spinner("Installing update...");
    let outcome = handle.await?;
    spinner.finish_and_clear();

    match outcome {
        InstallOutcome::HandedOff | InstallOutcome::Applied => Ok(()),
        InstallOutcome::RolledBack { error } => {
            warn!("Install rolled back: {}", error);
            Err(anyhow!("Install failed and was rolled back: {}", error))
        }
    }
}
