//! stderr log subscriber for the `vulnfeed` binary.
//!
//! stdout carries the command report, so every log line goes to stderr.

use anyhow::{Result, bail};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use vulnfeed_core::config::GeneralConfig;

/// Install the global subscriber from `[general] log_level` / `log_format`.
///
/// `RUST_LOG`, when set, replaces `log_level`. `log_format` is `json` or `pretty`.
pub fn init_tracing(config: &GeneralConfig) -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    let registry = tracing_subscriber::registry().with(filter);

    let installed = match config.log_format.as_str() {
        "json" => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init(),
        "pretty" => registry
            .with(fmt::layer().pretty().with_writer(std::io::stderr))
            .try_init(),
        other => bail!("unknown log format '{other}', expected 'json' or 'pretty'"),
    };

    installed.map_err(|e| anyhow::anyhow!("{} log subscriber not installed: {e}", config.log_format))
}
