//! Config command

use anyhow::Result;
use camino::Utf8Path;

use crate::cli::ConfigArgs;
use crate::output;

pub fn run(args: ConfigArgs, config: Option<&Utf8Path>) -> Result<()> {
    let updater_config = super::load_config(config)?;
    print!("{}", serde_yaml_ng::to_string(&updater_config)?);

    if args.paths {
        match updater_config.resolve_paths() {
            Ok(paths) => {
                output::header("Resolved paths");
                output::kv("Application root", &paths.app_root.display().to_string());
                output::kv("Executable", &paths.executable.display().to_string());
                output::kv("Version marker", &paths.version_marker.display().to_string());
                output::kv("Staging file", &paths.staging.display().to_string());
            }
            Err(e) => output::warning(&format!("Could not resolve paths: {}", e)),
        }
    }

    Ok(())
}
