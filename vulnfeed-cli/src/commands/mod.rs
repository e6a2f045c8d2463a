//! Command handlers -- one module per subcommand

pub mod config;
pub mod ingest;

use std::path::Path;

use vulnfeed_core::config::VulnFeedConfig;
use vulnfeed_core::error::VulnFeedError;

use crate::error::CliError;

/// Where the effective configuration came from.
pub const DEFAULTS_SOURCE: &str = "(defaults)";

/// Load the configuration file with env overrides applied, without validating it.
///
/// A missing file yields the built-in defaults so that `vulnfeed ingest FEED`
/// works without any configuration. The caller applies its own overrides and
/// then calls `VulnFeedConfig::validate`.
///
/// Returns the configuration and a display label for its source.
pub async fn load_unvalidated(path: &Path) -> Result<(VulnFeedConfig, String), CliError> {
    let (mut config, source) = match tokio::fs::read_to_string(path).await {
        Ok(content) => (
            VulnFeedConfig::parse(&content)?,
            path.display().to_string(),
        ),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "config file not found, using defaults");
            (VulnFeedConfig::default(), DEFAULTS_SOURCE.to_owned())
        }
        Err(e) => return Err(CliError::Core(VulnFeedError::Io(e))),
    };

    config.apply_env_overrides();
    Ok((config, source))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_load_unvalidated_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().expect("should create temp dir");
        let (config, source) = load_unvalidated(&dir.path().join("absent.toml"))
            .await
            .expect("missing file should fall back to defaults");

        assert_eq!(source, DEFAULTS_SOURCE);
        assert_eq!(config.general.log_level, "info");
    }

    #[tokio::test]
    async fn test_load_unvalidated_skips_validation() {
        let dir = tempfile::tempdir().expect("should create temp dir");
        let path = dir.path().join("vulnfeed.toml");
        // dry_run = false without store_path fails validation, but loads here
        std::fs::write(&path, "[feed]\ndry_run = false\n").expect("should write config");

        let (config, source) = load_unvalidated(&path).await.expect("should load");
        assert!(!config.feed.dry_run);
        assert!(config.validate().is_err());
        assert_eq!(source, path.display().to_string());
    }

    #[tokio::test]
    async fn test_load_unvalidated_malformed_toml_fails() {
        let dir = tempfile::tempdir().expect("should create temp dir");
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[feed\nfeed_path = 1").expect("should write config");

        let err = load_unvalidated(&path).await.unwrap_err();
        assert_eq!(err.exit_code(), 2, "parse failure is a config error");
    }
}
