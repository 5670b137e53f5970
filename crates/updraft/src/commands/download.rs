//! Download command

use anyhow::{Context, Result};
use camino::Utf8Path;
use tracing::info;
use updraft_update::UpdateOrchestrator;

use crate::output;

pub async fn run(config: Option<&Utf8Path>) -> Result<()> {
    let orchestrator = super::orchestrator(config)?;
    download(&orchestrator).await
}

/// Download the latest artifact into the staging file
pub async fn download(orchestrator: &UpdateOrchestrator) -> Result<()> {
    output::info(&format!("Platform: {}", orchestrator.platform()));

    let result = orchestrator
        .start_download()
        .await?
        .context("Update download failed")?;

    info!(
        "Staged {} bytes at {}",
        result.total_bytes,
        result.file_path.display()
    );
    output::kv("Staged at", &result.file_path.display().to_string());
    Ok(())
}
