//! Unified error types for the report tool.

use thiserror::Error;

/// Unified error type for the report tool.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration loading error.
    #[error("configuration error: {0}")]
    Config(#[from] envy::Error),

    /// Configuration present but invalid.
    #[error("invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigError),

    /// Market data could not be obtained.
    #[error("market data unavailable: {0}")]
    Fetch(#[from] FetchError),

    /// Discord transport error.
    #[error("discord error: {0}")]
    Discord(#[from] DiscordError),
}

/// Validation failures for a loaded configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Server URL does not parse.
    #[error("ECO_SERVER_URL is not a valid URL: {0}")]
    InvalidServerUrl(String),

    /// A value that must be positive was zero.
    #[error("{0} must be greater than zero")]
    NotPositive(&'static str),

    /// Report interval cannot be aligned to the wall clock.
    #[error("REPORT_INTERVAL_MINUTES must divide 60 or be a multiple of 60, got {0}")]
    UnalignedInterval(u32),

    /// A setting required by the selected command is missing.
    #[error("{0} is required")]
    Missing(&'static str),
}

/// Market data fetch failures.
///
/// Every variant means the same thing to callers: there is no data for this
/// cycle and the engine must not run.
#[derive(Error, Debug)]
pub enum FetchError {
    /// Network or transport failure.
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a non-success status.
    #[error("server returned HTTP {status}")]
    Status {
        /// Response status code.
        status: u16,
    },

    /// Payload was not the expected JSON shape.
    #[error("failed to parse store data: {0}")]
    Parse(String),

    /// Snapshot file could not be read or written.
    #[error("snapshot io failed for {path}: {source}")]
    Snapshot {
        /// Snapshot path.
        path: String,
        /// Underlying IO error.
        source: std::io::Error,
    },
}

/// Discord bot errors.
#[derive(Error, Debug)]
pub enum DiscordError {
    /// Serenity client or HTTP failure.
    #[error("serenity error: {0}")]
    Serenity(#[from] poise::serenity_prelude::Error),

    /// Report could not be produced for a command.
    #[error("report failed: {0}")]
    Report(String),
}

/// Convenient Result type alias.
pub type Result<T> = std::result::Result<T, AppError>;
