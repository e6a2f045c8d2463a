//! `vulnfeed config` command handler

use std::io::Write;
use std::path::Path;

use serde::Serialize;
use tracing::info;

use vulnfeed_core::config::VulnFeedConfig;
use vulnfeed_nvd::NvdFeedConfig;

use crate::cli::{ConfigAction, ConfigArgs};
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Sections accepted by `config show --section`.
const SECTIONS: [&str; 2] = ["general", "feed"];

/// Execute the `config` command.
pub async fn execute(
    args: ConfigArgs,
    config_path: &Path,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    match args.action {
        ConfigAction::Validate => execute_validate(config_path, writer).await,
        ConfigAction::Show { section } => execute_show(config_path, section, writer).await,
    }
}

/// Execute the config validate subcommand.
///
/// Loads the file with env overrides, runs the core validation and then the
/// feed-level checks (path traversal, size limits) the ingestor applies.
///
/// # Errors
///
/// Returns `CliError::Config` if validation fails (missing file, invalid values, parse errors).
async fn execute_validate(config_path: &Path, writer: &OutputWriter) -> Result<(), CliError> {
    info!(path = %config_path.display(), "validating configuration");

    let report = ConfigValidationReport::from_result(
        config_path.display().to_string(),
        validate_config(config_path).await,
    );

    writer.render(&report)?;

    if !report.valid {
        return Err(CliError::Config("configuration is invalid".to_owned()));
    }

    Ok(())
}

async fn validate_config(config_path: &Path) -> Result<(), String> {
    let config = VulnFeedConfig::load(config_path)
        .await
        .map_err(|e| e.to_string())?;
    NvdFeedConfig::from_core(&config.feed)
        .validate()
        .map_err(|e| e.to_string())
}

/// Execute the config show subcommand.
///
/// Displays the effective configuration (file + env overrides + defaults),
/// optionally restricted to one section.
///
/// # Errors
///
/// Returns `CliError::Core` if loading fails or `CliError::Command` if the section name is invalid.
async fn execute_show(
    config_path: &Path,
    section: Option<String>,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    info!(path = %config_path.display(), "loading configuration");

    let config = VulnFeedConfig::load(config_path).await?;
    let report = ConfigReport::build(config_path.display().to_string(), &config, section)?;

    writer.render(&report)?;

    Ok(())
}

fn to_toml<T: Serialize>(value: &T) -> String {
    toml::to_string_pretty(value).unwrap_or_else(|e| format!("(serialization error: {})", e))
}

/// Configuration display report.
///
/// The `config_toml` field is skipped during JSON serialization; JSON output
/// carries the structured `config` value instead.
#[derive(Serialize)]
pub struct ConfigReport {
    /// Configuration file path
    pub source: String,
    /// Optional section name (None = full config)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    /// Structured configuration (full or one section)
    pub config: serde_json::Value,
    /// Serialized TOML configuration
    #[serde(skip)]
    pub config_toml: String,
}

impl ConfigReport {
    fn build(
        source: String,
        config: &VulnFeedConfig,
        section: Option<String>,
    ) -> Result<Self, CliError> {
        let (value, config_toml) = match section.as_deref() {
            None => (serde_json::to_value(config)?, to_toml(config)),
            Some("general") => (
                serde_json::to_value(&config.general)?,
                to_toml(&config.general),
            ),
            Some("feed") => (serde_json::to_value(&config.feed)?, to_toml(&config.feed)),
            Some(other) => {
                return Err(CliError::Command(format!(
                    "unknown section: {} (expected: {})",
                    other,
                    SECTIONS.join(", ")
                )));
            }
        };

        Ok(Self {
            source,
            section,
            config: value,
            config_toml,
        })
    }
}

impl Render for ConfigReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        if let Some(ref section) = self.section {
            let section_label = format!("[{}]", section);
            writeln!(
                w,
                "Configuration {} (source: {})",
                section_label.bold(),
                self.source
            )?;
        } else {
            writeln!(w, "Configuration (source: {})", self.source.bold())?;
        }

        writeln!(w)?;
        write!(w, "{}", self.config_toml)?;

        Ok(())
    }
}

/// Configuration validation report.
#[derive(Serialize)]
pub struct ConfigValidationReport {
    /// Configuration file path
    pub source: String,
    /// Whether the configuration is valid
    pub valid: bool,
    /// Validation error messages (empty if valid)
    pub errors: Vec<String>,
}

impl ConfigValidationReport {
    fn from_result(source: String, result: Result<(), String>) -> Self {
        match result {
            Ok(()) => Self {
                source,
                valid: true,
                errors: Vec::new(),
            },
            Err(e) => Self {
                source,
                valid: false,
                errors: vec![e],
            },
        }
    }
}

impl Render for ConfigValidationReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(w, "Config Validation: {}", self.source.bold())?;

        if self.valid {
            writeln!(w, "  Result: {}", "VALID".green().bold())?;
        } else {
            writeln!(w, "  Result: {}", "INVALID".red().bold())?;
            for err in &self.errors {
                writeln!(w, "  Error: {}", err.red())?;
            }
        }

        Ok(())
    }
}
