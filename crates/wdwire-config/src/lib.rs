//! Shared configuration for the wdwire client and command-line front end.
//!
//! Configuration is layered by `ortho_config`: built-in defaults, an optional
//! configuration file, `WDWIRE_*` environment variables and finally CLI
//! flags. The resulting [`Config`] carries the remote end address, the
//! per-command transport settings and the logging preferences.

use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

mod defaults;
mod logging;

pub use defaults::{
    DEFAULT_COMMAND_TIMEOUT_MS, DEFAULT_LOG_FILTER, DEFAULT_REMOTE_URL,
    DEFAULT_STARTUP_TIMEOUT_MS, default_command_timeout_ms, default_keep_alive,
    default_log_filter, default_log_filter_string, default_log_format, default_remote_url,
    default_startup_timeout_ms,
};
pub use logging::{LogFormat, LogFormatParseError};

/// Runtime configuration shared by the library consumers and the CLI.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "WDWIRE")]
pub struct Config {
    /// Base URL of the remote end. User-info, when present, becomes HTTP
    /// Basic credentials.
    #[serde(default = "defaults::default_remote_url")]
    pub remote_url: String,
    /// Per-command HTTP timeout in milliseconds.
    #[serde(default = "defaults::default_command_timeout_ms")]
    pub command_timeout_ms: u64,
    /// Whether requests ask the remote end to keep the connection open.
    #[serde(default = "defaults::default_keep_alive")]
    pub keep_alive: bool,
    /// Readiness deadline for a managed driver service in milliseconds.
    #[serde(default = "defaults::default_startup_timeout_ms")]
    pub startup_timeout_ms: u64,
    /// Tracing filter expression.
    #[serde(default = "defaults::default_log_filter_string")]
    pub log_filter: String,
    /// Output format for log records.
    #[serde(default = "defaults::default_log_format")]
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            remote_url: default_remote_url(),
            command_timeout_ms: default_command_timeout_ms(),
            keep_alive: default_keep_alive(),
            startup_timeout_ms: default_startup_timeout_ms(),
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
        }
    }
}

impl Config {
    /// Raw remote end URL as configured.
    #[must_use]
    pub fn remote_url(&self) -> &str {
        self.remote_url.as_str()
    }

    /// Parses the configured remote URL.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidRemoteUrl`] when the value is not an
    /// absolute `http` or `https` URL.
    pub fn parsed_remote_url(&self) -> Result<Url, ConfigError> {
        let url = Url::parse(self.remote_url()).map_err(|source| ConfigError::InvalidRemoteUrl {
            url: self.remote_url.clone(),
            reason: source.to_string(),
        })?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(ConfigError::InvalidRemoteUrl {
                url: self.remote_url.clone(),
                reason: format!("unsupported scheme '{other}'"),
            }),
        }
    }

    /// Per-command HTTP timeout.
    #[must_use]
    pub const fn command_timeout(&self) -> Duration {
        Duration::from_millis(self.command_timeout_ms)
    }

    /// Readiness deadline for a managed driver service.
    #[must_use]
    pub const fn startup_timeout(&self) -> Duration {
        Duration::from_millis(self.startup_timeout_ms)
    }

    /// Whether connections should be kept alive between commands.
    #[must_use]
    pub const fn keep_alive(&self) -> bool {
        self.keep_alive
    }

    /// Tracing filter expression.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        self.log_filter.as_str()
    }

    /// Output format for log records.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }
}

/// Errors raised while interpreting loaded configuration values.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// The remote URL could not be used as an HTTP base address.
    #[error("invalid remote url '{url}': {reason}")]
    InvalidRemoteUrl {
        /// Offending value.
        url: String,
        /// Parser or validation message.
        reason: String,
    },
}
