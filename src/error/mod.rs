use thiserror::Error;

use crate::build::BuildError;
use crate::postgres::PostgresPoolError;
use crate::telemetry::TelemetryError;
use crate::template::TemplateStoreError;

/// Top-level error for the binaries' startup and run paths.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Telemetry error: {0}")]
    Telemetry(#[from] TelemetryError),

    #[error("Build error: {0}")]
    Build(#[from] BuildError),

    #[error("Database error: {0}")]
    Database(#[from] PostgresPoolError),

    #[error("Template store error: {0}")]
    Store(#[from] TemplateStoreError),
}

pub type Result<T> = std::result::Result<T, AppError>;
