//! CLI argument parsing with clap

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};

/// Updraft - keep an installed application up to date
#[derive(Parser, Debug)]
#[command(name = "updraft")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to an updater.yaml config file
    #[arg(short, long, global = true)]
    pub config: Option<Utf8PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check the release feed for a newer version
    Check,

    /// Download the latest release for this platform
    Download,

    /// Install the downloaded update
    Install,

    /// Check, download and install in one go
    Update,

    /// Show the installed version and update layout
    Status(StatusArgs),

    /// Show the effective updater configuration
    Config(ConfigArgs),
}

#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Also show the resolved filesystem paths
    #[arg(long)]
    pub paths: bool,
}
