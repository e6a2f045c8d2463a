//! CLI-specific error types and exit code mapping

use vulnfeed_core::error::VulnFeedError;
use vulnfeed_nvd::FeedError;

/// CLI-specific error type.
///
/// Each variant carries enough context for a user-friendly message.
/// The `exit_code()` method maps errors to standard Unix exit codes.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration loading or validation failure.
    #[error("configuration error: {0}")]
    Config(String),

    /// A subcommand-specific operation failed.
    #[error("{0}")]
    Command(String),

    /// JSON serialisation failed during output rendering.
    #[error("json output error: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    /// IO error (file read, stdout write, etc.).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Wrapped domain error from vulnfeed-core.
    #[error("{0}")]
    Core(#[from] VulnFeedError),
}

impl CliError {
    /// Map the error to a process exit code.
    ///
    /// | Code | Meaning                                  |
    /// |------|------------------------------------------|
    /// | 0    | Success                                  |
    /// | 1    | General / command error                  |
    /// | 2    | Configuration error                      |
    /// | 4    | Ingest aborted (schema, XML, commit)     |
    /// | 10   | IO error                                 |
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::Core(VulnFeedError::Config(_)) => 2,
            Self::Core(VulnFeedError::Ingest(_)) => 4,
            Self::Io(_) | Self::Core(VulnFeedError::Io(_)) => 10,
            Self::JsonSerialize(_) | Self::Command(_) => 1,
        }
    }
}

impl From<FeedError> for CliError {
    fn from(e: FeedError) -> Self {
        Self::Core(e.into())
    }
}
