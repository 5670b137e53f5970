//! Status command

use anyhow::Result;
use camino::Utf8Path;
use serde::Serialize;
use updraft_core::InstallStrategy;
use updraft_update::download::human_readable_size;

use crate::cli::StatusArgs;
use crate::output;

#[derive(Debug, Serialize)]
struct StatusReport {
    version: String,
    platform: String,
    strategy: &'static str,
    status: String,
    app_root: String,
    staged_bytes: Option<u64>,
    release_page: String,
}

pub async fn run(args: StatusArgs, config: Option<&Utf8Path>) -> Result<()> {
    let orchestrator = super::orchestrator(config)?;
    let paths = orchestrator.paths();

    let staged_bytes = tokio::fs::metadata(&paths.staging)
        .await
        .ok()
        .map(|m| m.len());

    let report = StatusReport {
        version: orchestrator.version(),
        platform: orchestrator.platform().to_string(),
        strategy: match orchestrator.platform().install_strategy() {
            InstallStrategy::PackageHandoff => "package-handoff",
            InstallStrategy::InPlaceArchive => "in-place-archive",
        },
        status: orchestrator.status().to_string(),
        app_root: paths.app_root.display().to_string(),
        staged_bytes,
        release_page: orchestrator.release_page_url().to_string(),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    output::header("Updater status");
    output::kv("Version", &report.version);
    output::kv("Platform", &report.platform);
    output::kv("Install strategy", report.strategy);
    output::kv("Status", &report.status);
    output::kv("Application root", &report.app_root);
    match report.staged_bytes {
        Some(bytes) => output::kv("Staged update", &human_readable_size(bytes)),
        None => output::kv("Staged update", "none"),
    }
    output::kv("Release page", &report.release_page);

    Ok(())
}
