//! Check command

use anyhow::{anyhow, Result};
use camino::Utf8Path;
use tracing::debug;
use updraft_update::{CheckOutcome, UpdateOrchestrator};

use crate::output;

pub async fn run(config: Option<&Utf8Path>) -> Result<()> {
    let orchestrator = super::orchestrator(config)?;
    check(&orchestrator).await.map(|_| ())
}

/// Run a check and report the outcome; true when an update is available
pub async fn check(orchestrator: &UpdateOrchestrator) -> Result<bool> {
    output::info(&format!("Current version: {}", orchestrator.version()));

    let spinner = output::spinner("Checking for updates...");
    let outcome = orchestrator.start_check().await?;
    spinner.finish_and_clear();
    debug!("Check finished: {:?}", outcome);

    match outcome {
        CheckOutcome::UpdateAvailable(version) => {
            output::info(&format!("Run 'updraft update' to install {}", version));
            Ok(true)
        }
        CheckOutcome::UpToDate => {
            output::success("Already on the latest version");
            Ok(false)
        }
        CheckOutcome::Unavailable => Err(anyhow!(
            "Could not determine the latest version (run with -v for details)"
        )),
    }
}
