//! CLI argument parsing using clap derive API
//!
//! This module defines the command-line interface structure using clap's derive macros.
//! It is purely declarative with no side effects or I/O.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// vulnfeed -- NVD vulnerability feed ingestion.
///
/// Use `vulnfeed <COMMAND> --help` for subcommand details.
#[derive(Parser, Debug)]
#[command(name = "vulnfeed", version, about, long_about = None)]
pub struct Cli {
    /// Path to the vulnfeed.toml configuration file.
    #[arg(short, long, default_value = "vulnfeed.toml")]
    pub config: PathBuf,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Output format.
    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Supported output formats.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// Machine-readable JSON.
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Ingest one NVD CVE XML 2.0 feed file.
    Ingest(IngestArgs),

    /// Manage configuration.
    Config(ConfigArgs),
}

// ---- ingest ----

/// Stream a feed file through the parser and commit relevant entries.
///
/// Arguments override the `[feed]` section of the configuration file.
#[derive(Args, Debug)]
pub struct IngestArgs {
    /// Feed file to ingest (default: `feed.feed_path` from config).
    pub feed: Option<PathBuf>,

    /// Historical version index (JSON) merged into matching entries.
    #[arg(long)]
    pub history: Option<PathBuf>,

    /// Record store file (JSON Lines). Disables dry-run.
    #[arg(long)]
    pub store: Option<PathBuf>,

    /// Write the software identifier index to this file after ingestion.
    #[arg(long)]
    pub index: Option<PathBuf>,

    /// Parse and count only; never touch the store or the index.
    #[arg(long, conflicts_with = "store")]
    pub dry_run: bool,
}

// ---- config ----

/// Manage vulnfeed configuration.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Validate the configuration file and report errors.
    Validate,
    /// Show the effective configuration (file + env overrides + defaults).
    Show {
        /// Show only a specific section (general, feed).
        #[arg(long)]
        section: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_parse_ingest_defaults() {
        let args = Cli::try_parse_from(["vulnfeed", "ingest"]);
        assert!(args.is_ok(), "should parse 'ingest' subcommand");
        let cli = args.expect("parse succeeded");
        match cli.command {
            Commands::Ingest(ingest) => {
                assert!(ingest.feed.is_none(), "feed should default to config");
                assert!(ingest.history.is_none());
                assert!(ingest.store.is_none());
                assert!(ingest.index.is_none());
                assert!(!ingest.dry_run, "dry_run should default to false");
            }
            _ => panic!("expected Ingest command"),
        }
    }

    #[test]
    fn test_cli_parse_ingest_feed_path() {
        let args = Cli::try_parse_from(["vulnfeed", "ingest", "/data/nvdcve-2.0-2013.xml"]);
        let cli = args.expect("parse succeeded");
        match cli.command {
            Commands::Ingest(ingest) => {
                assert_eq!(
                    ingest.feed,
                    Some(PathBuf::from("/data/nvdcve-2.0-2013.xml")),
                    "feed should match positional argument"
                );
            }
            _ => panic!("expected Ingest command"),
        }
    }

    #[test]
    fn test_cli_parse_ingest_all_outputs() {
        let args = Cli::try_parse_from([
            "vulnfeed",
            "ingest",
            "feed.xml",
            "--history",
            "history.json",
            "--store",
            "records.jsonl",
            "--index",
            "index.json",
        ]);
        let cli = args.expect("parse succeeded");
        match cli.command {
            Commands::Ingest(ingest) => {
                assert_eq!(ingest.history, Some(PathBuf::from("history.json")));
                assert_eq!(ingest.store, Some(PathBuf::from("records.jsonl")));
                assert_eq!(ingest.index, Some(PathBuf::from("index.json")));
            }
            _ => panic!("expected Ingest command"),
        }
    }

    #[test]
    fn test_cli_parse_ingest_dry_run() {
        let args = Cli::try_parse_from(["vulnfeed", "ingest", "feed.xml", "--dry-run"]);
        let cli = args.expect("parse succeeded");
        match cli.command {
            Commands::Ingest(ingest) => assert!(ingest.dry_run, "dry_run should be true"),
            _ => panic!("expected Ingest command"),
        }
    }

    #[test]
    fn test_cli_parse_ingest_dry_run_conflicts_with_store() {
        let args = Cli::try_parse_from([
            "vulnfeed",
            "ingest",
            "--dry-run",
            "--store",
            "records.jsonl",
        ]);
        assert!(args.is_err(), "--dry-run and --store should conflict");
    }

    #[test]
    fn test_cli_parse_config_validate() {
        let args = Cli::try_parse_from(["vulnfeed", "config", "validate"]);
        let cli = args.expect("parse succeeded");
        match cli.command {
            Commands::Config(config) => {
                assert!(matches!(config.action, ConfigAction::Validate));
            }
            _ => panic!("expected Config command"),
        }
    }

    #[test]
    fn test_cli_parse_config_show_section() {
        let args = Cli::try_parse_from(["vulnfeed", "config", "show", "--section", "feed"]);
        let cli = args.expect("parse succeeded");
        match cli.command {
            Commands::Config(ConfigArgs {
                action: ConfigAction::Show { section },
            }) => {
                assert_eq!(section, Some("feed".to_owned()));
            }
            _ => panic!("expected Config Show command"),
        }
    }

    #[test]
    fn test_cli_parse_custom_config_path() {
        let args = Cli::try_parse_from(["vulnfeed", "-c", "/custom/vulnfeed.toml", "ingest"]);
        let cli = args.expect("parse succeeded");
        assert_eq!(cli.config, PathBuf::from("/custom/vulnfeed.toml"));
    }

    #[test]
    fn test_cli_parse_default_config_path() {
        let cli = Cli::try_parse_from(["vulnfeed", "ingest"]).expect("parse succeeded");
        assert_eq!(cli.config, PathBuf::from("vulnfeed.toml"));
    }

    #[test]
    fn test_cli_parse_log_level_after_subcommand() {
        let args = Cli::try_parse_from(["vulnfeed", "ingest", "--log-level", "debug"]);
        let cli = args.expect("global flag should be accepted after subcommand");
        assert_eq!(cli.log_level, Some("debug".to_owned()));
    }

    #[test]
    fn test_cli_parse_output_format_json() {
        let cli = Cli::try_parse_from(["vulnfeed", "--output", "json", "ingest"])
            .expect("parse succeeded");
        assert!(matches!(cli.output, OutputFormat::Json));
    }

    #[test]
    fn test_cli_parse_output_format_invalid_fails() {
        let args = Cli::try_parse_from(["vulnfeed", "--output", "yaml", "ingest"]);
        assert!(args.is_err(), "unknown output format should fail");
    }

    #[test]
    fn test_cli_parse_missing_command_fails() {
        let args = Cli::try_parse_from(["vulnfeed"]);
        assert!(args.is_err(), "should fail when no command provided");
    }

    #[test]
    fn test_cli_verify_command_structure() {
        let cmd = Cli::command();
        assert_eq!(cmd.get_name(), "vulnfeed");

        let subcommands: Vec<_> = cmd.get_subcommands().map(|s| s.get_name()).collect();
        assert!(subcommands.contains(&"ingest"), "should have 'ingest' subcommand");
        assert!(subcommands.contains(&"config"), "should have 'config' subcommand");
        cmd.debug_assert();
    }
}
