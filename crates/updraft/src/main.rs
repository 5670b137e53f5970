//! Updraft CLI - check, download and install application updates
//!
//! This is the main entry point for the Updraft command-line interface.

mod cli;
mod commands;
mod output;
mod terminal;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    // Must run before any TLS connection is made
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();

    let cli = Cli::parse();

    init_tracing(cli.verbose, cli.quiet);

    let config = cli.config.as_deref();
    match cli.command {
        Commands::Check => commands::check::run(config).await,
        Commands::Download => commands::download::run(config).await,
        Commands::Install => commands::install::run(config).await,
        Commands::Update => commands::update::run(config).await,
        Commands::Status(args) => commands::status::run(args, config).await,
        Commands::Config(args) => commands::config::run(args, config),
    }
}

/// Initialize tracing with appropriate verbosity
fn init_tracing(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("info"),
            1 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .init();
}
