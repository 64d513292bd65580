//! Error types for the CLI runtime.

use std::io;
use std::sync::Arc;

use thiserror::Error;
use wdwire::WebDriverError;
use wdwire_config::ConfigError;

use crate::telemetry::TelemetryError;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("failed to load configuration: {0}")]
    LoadConfiguration(Arc<ortho_config::OrthoError>),
    #[error(transparent)]
    InvalidConfiguration(#[from] ConfigError),
    #[error("{0}")]
    CliUsage(clap::Error),
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),
    #[error("invalid --payload JSON: {0}")]
    InvalidPayload(serde_json::Error),
    #[error(transparent)]
    WebDriver(#[from] WebDriverError),
    #[error("failed to serialise command output: {0}")]
    SerialiseOutput(serde_json::Error),
    #[error("failed to write command output: {0}")]
    WriteOutput(io::Error),
}
