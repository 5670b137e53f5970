//! Update command: check, download and install in sequence

use anyhow::Result;
use camino::Utf8Path;
use tracing::info;

use crate::output;

pub async fn run(config: Option<&Utf8Path>) -> Result<()> {
    let orchestrator = super::orchestrator(config)?;

    output::header("Checking");
    if !super::check::check(&orchestrator).await? {
        info!("No update to install");
        return Ok(());
    }

    output::header("Downloading");
    super::download::download(&orchestrator).await?;

    output::header("Installing");
    super::install::install(&orchestrator).await?;

    orchestrator.shutdown().await;
    Ok(())
}
