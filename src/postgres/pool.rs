//! PostgreSQL connection pool.

use std::time::Duration;

use sqlx::postgres::{PgPool, PgPoolOptions};
use thiserror::Error;

use crate::config::DatabaseConfig;

const SCHEMA: &str = include_str!("../../migrations/0001_email_templates.sql");

/// Errors that can occur with the PostgreSQL pool.
#[derive(Debug, Error)]
pub enum PostgresPoolError {
    #[error("SQLx error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("Connection unavailable: {0}")]
    ConnectionUnavailable(String),
}

/// PostgreSQL connection pool.
#[derive(Clone)]
pub struct PostgresPool {
    pool: PgPool,

    /// Database URL (for logging purposes)
    database_url: String,
}

impl PostgresPool {
    /// Create a new PostgreSQL pool from configuration.
    pub async fn new(config: &DatabaseConfig) -> Result<Self, PostgresPoolError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.pool_size)
            .acquire_timeout(Duration::from_secs(config.connect_timeout_seconds as u64))
            .idle_timeout(Duration::from_secs(config.idle_timeout_seconds as u64))
            .connect(&config.url)
            .await
            .map_err(|e| {
                PostgresPoolError::ConnectionUnavailable(format!(
                    "{}: {}",
                    mask_database_url(&config.url),
                    e
                ))
            })?;

        tracing::info!(
            pool_size = config.pool_size,
            url = %mask_database_url(&config.url),
            "PostgreSQL connection pool created"
        );

        Ok(Self {
            pool,
            database_url: config.url.clone(),
        })
    }

    /// Get a reference to the underlying pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Create the template table and its indexes if they are missing.
    pub async fn ensure_schema(&self) -> Result<(), PostgresPoolError> {
        sqlx::raw_sql(SCHEMA).execute(&self.pool).await?;
        tracing::debug!("Template schema ensured");
        Ok(())
    }

    /// Get the database URL (masked for logging).
    pub fn database_url_masked(&self) -> String {
        mask_database_url(&self.database_url)
    }

    /// Close the pool gracefully.
    pub async fn close(&self) {
        self.pool.close().await;
        tracing::info!(url = %self.database_url_masked(), "PostgreSQL connection pool closed");
    }
}

/// Replace the password portion of a connection URL with `***`.
pub fn mask_database_url(url: &str) -> String {
    let authority_start = url.find("://").map(|i| i + 3).unwrap_or(0);
    if let Some(at_pos) = url.find('@') {
        if let Some(colon_pos) = url[..at_pos].rfind(':') {
            if colon_pos >= authority_start {
                let prefix = &url[..colon_pos + 1];
                let suffix = &url[at_pos..];
                return format!("{}***{}", prefix, suffix);
            }
        }
    }
    url.to_string()
}
