//! `vulnfeed ingest` command handler

use std::io::Write;
use std::path::Path;

use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use vulnfeed_core::config::FeedConfig;
use vulnfeed_nvd::{FeedIngestor, IngestSummary, NvdFeedConfig};

use crate::cli::IngestArgs;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `ingest` command.
///
/// The report is rendered even when the stream aborts, so partial counters
/// are always visible; the abort cause is then returned as the command error.
pub async fn execute(
    args: IngestArgs,
    config_path: &Path,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let (mut config, source) = super::load_unvalidated(config_path).await?;
    apply_args(&mut config.feed, &args);
    config
        .validate()
        .map_err(|e| CliError::Config(e.to_string()))?;

    let feed_config = NvdFeedConfig::from_core(&config.feed);
    let run_id = Uuid::new_v4();
    info!(
        %run_id,
        config = %source,
        feed = %feed_config.feed_path,
        dry_run = feed_config.dry_run,
        "starting feed ingest"
    );

    let ingestor = FeedIngestor::from_config(feed_config.clone())?;

    // The reader does synchronous file I/O
    let summary = tokio::task::spawn_blocking(move || ingestor.run())
        .await
        .map_err(|e| CliError::Command(format!("ingest task failed: {}", e)))?;

    let report = IngestReport::new(run_id, &feed_config, &summary);
    writer.render(&report)?;

    match summary.error {
        Some(e) => Err(e.into()),
        None => Ok(()),
    }
}

/// Apply command-line overrides on top of the `[feed]` section.
///
/// `--store` implies a real run; `--dry-run` always wins over the file.
fn apply_args(feed: &mut FeedConfig, args: &IngestArgs) {
    if let Some(path) = &args.feed {
        feed.feed_path = path.display().to_string();
    }
    if let Some(path) = &args.history {
        feed.history_path = Some(path.display().to_string());
    }
    if let Some(path) = &args.store {
        feed.store_path = Some(path.display().to_string());
        feed.dry_run = false;
    }
    if let Some(path) = &args.index {
        feed.index_path = Some(path.display().to_string());
    }
    if args.dry_run {
        feed.dry_run = true;
    }
}

/// Result of one ingest run.
#[derive(Debug, Serialize)]
pub struct IngestReport {
    /// Unique id of this run (also present in the logs)
    pub run_id: String,
    /// Feed file path
    pub feed: String,
    /// Whether stores and indexes were bypassed
    pub dry_run: bool,
    /// Whether the root schema version was accepted
    pub schema_verified: bool,
    /// Entries seen
    pub total_entries: u64,
    /// Entries with at least one application identifier
    pub relevant_entries: u64,
    /// Entries skipped as not relevant
    pub skipped_entries: u64,
    /// Records persisted to the store
    pub persisted: u64,
    /// Historical ranges merged
    pub merged: u64,
    /// Identifier upserts sent to the index
    pub indexed: u64,
    /// Record store path
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store: Option<String>,
    /// Identifier index output path
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<String>,
    /// Wall-clock duration in milliseconds
    pub duration_ms: u64,
    /// Whether the stream was fully processed
    pub success: bool,
    /// Abort cause
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl IngestReport {
    fn new(run_id: Uuid, config: &NvdFeedConfig, summary: &IngestSummary) -> Self {
        let (store, index) = if config.dry_run {
            (None, None)
        } else {
            (config.store_path.clone(), config.index_path.clone())
        };

        Self {
            run_id: run_id.to_string(),
            feed: summary.source.clone(),
            dry_run: config.dry_run,
            schema_verified: summary.schema_verified,
            total_entries: summary.counters.total_entries,
            relevant_entries: summary.counters.relevant_entries,
            skipped_entries: summary.counters.skipped_entries(),
            persisted: summary.totals.persisted,
            merged: summary.totals.merged,
            indexed: summary.totals.indexed,
            store,
            index,
            duration_ms: u64::try_from(summary.elapsed.as_millis()).unwrap_or(u64::MAX),
            success: summary.is_success(),
            error: summary.error.as_ref().map(|e| e.to_string()),
        }
    }
}

impl Render for IngestReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(w, "Feed Ingest: {} (run {})", self.feed.bold(), self.run_id)?;

        let result = if !self.success {
            "ABORTED".red().bold()
        } else if self.dry_run {
            "OK (dry run)".yellow().bold()
        } else {
            "OK".green().bold()
        };
        writeln!(w, "  Result:   {}", result)?;

        let schema = if self.schema_verified {
            "verified".green()
        } else {
            "not verified".red()
        };
        writeln!(w, "  Schema:   {}", schema)?;

        writeln!(
            w,
            "  Entries:  {} total, {} relevant, {} skipped",
            self.total_entries, self.relevant_entries, self.skipped_entries
        )?;
        writeln!(
            w,
            "  Commits:  {} persisted, {} merged, {} indexed",
            self.persisted, self.merged, self.indexed
        )?;

        if let Some(ref store) = self.store {
            writeln!(w, "  Store:    {}", store)?;
        }
        if let Some(ref index) = self.index {
            writeln!(w, "  Index:    {}", index)?;
        }

        writeln!(w, "  Duration: {} ms", self.duration_ms)?;

        if let Some(ref error) = self.error {
            writeln!(w, "  Error:    {}", error.red())?;
        }

        Ok(())
    }
}
