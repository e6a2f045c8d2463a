//! vulnfeed -- NVD vulnerability feed ingestion CLI
//!
//! # Commands
//!
//! - `vulnfeed ingest [FEED]`: stream one NVD CVE XML 2.0 feed into the record store
//! - `vulnfeed config validate|show`: inspect the effective configuration
//!
//! Exit codes are documented on [`error::CliError::exit_code`].

mod cli;
mod commands;
mod error;
mod logging;
mod output;

use clap::Parser;

use crate::cli::{Cli, Commands};
use crate::error::CliError;
use crate::output::OutputWriter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_logging(&cli).await;

    if let Err(e) = run(cli).await {
        use colored::Colorize;
        eprintln!("{} {}", "error:".red().bold(), e);
        std::process::exit(e.exit_code());
    }
}

/// Initialize tracing from the `[general]` section.
///
/// Config problems are reported by the command itself, so logging falls back
/// to defaults here instead of failing early.
async fn init_logging(cli: &Cli) {
    let mut general = commands::load_unvalidated(&cli.config)
        .await
        .map(|(config, _)| config.general)
        .unwrap_or_default();

    if let Some(ref level) = cli.log_level {
        general.log_level = level.clone();
    }

    if let Err(e) = logging::init_tracing(&general) {
        eprintln!("warning: {}", e);
    }

    vulnfeed_core::metrics::describe_all();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let writer = OutputWriter::new(cli.output);

    match cli.command {
        Commands::Ingest(args) => commands::ingest::execute(args, &cli.config, &writer).await,
        Commands::Config(args) => commands::config::execute(args, &cli.config, &writer).await,
    }
}
