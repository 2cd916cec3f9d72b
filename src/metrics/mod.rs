//! Prometheus metrics for the build and template registration runs.
//!
//! - Template registration outcomes (inserted, already present, failed)
//! - Bundler runs and their duration
//!
//! Both binaries exit after one run, so the registry is written to a
//! textfile-collector file at the end instead of being scraped.

use std::path::Path;

use lazy_static::lazy_static;
use prometheus::{
    register_histogram, register_int_counter_vec, Encoder, Histogram, IntCounterVec, TextEncoder,
};
use thiserror::Error;

use crate::config::MetricsConfig;

/// Prefix for all metrics
const METRIC_PREFIX: &str = "auth_tooling";

lazy_static! {
    /// Template registration outcomes by terminal state
    pub static ref TEMPLATE_REGISTRATIONS_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_template_registrations_total", METRIC_PREFIX),
        "Template registration outcomes",
        &["outcome"]
    ).unwrap();

    /// Bundler runs by result
    pub static ref BUILDS_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_builds_total", METRIC_PREFIX),
        "Bundler invocations by result",
        &["result"]
    ).unwrap();

    /// Wall-clock time spent in the bundler
    pub static ref BUILD_DURATION: Histogram = register_histogram!(
        format!("{}_build_duration_seconds", METRIC_PREFIX),
        "Bundler run duration in seconds",
        vec![0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0]
    ).unwrap();
}

/// Encode all registered metrics in the Prometheus text format
pub fn encode_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8(buffer).unwrap_or_default())
}

#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("Failed to encode metrics: {0}")]
    Encode(#[from] prometheus::Error),

    #[error("Failed to write metrics to {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Write the registry to `path`, replacing it atomically.
pub async fn write_textfile(path: &Path) -> Result<(), MetricsError> {
    let text = encode_metrics()?;
    let staging = path.with_extension("prom.tmp");
    let write_error = |source| MetricsError::Write {
        path: path.display().to_string(),
        source,
    };

    tokio::fs::write(&staging, text).await.map_err(write_error)?;
    tokio::fs::rename(&staging, path).await.map_err(write_error)?;
    Ok(())
}

/// Export the metrics recorded during this run, if a textfile is configured.
pub async fn export_metrics(config: &MetricsConfig) -> Result<(), MetricsError> {
    match &config.textfile_path {
        Some(path) => {
            write_textfile(path).await?;
            tracing::debug!(path = %path.display(), "Metrics written");
        }
        None => tracing::debug!("No metrics textfile configured"),
    }
    Ok(())
}

/// Helper for recording registration outcomes
pub struct RegistrationMetrics;

impl RegistrationMetrics {
    pub fn record_inserted() {
        TEMPLATE_REGISTRATIONS_TOTAL
            .with_label_values(&["inserted"])
            .inc();
    }

    pub fn record_exists() {
        TEMPLATE_REGISTRATIONS_TOTAL
            .with_label_values(&["exists"])
            .inc();
    }

    pub fn record_failed() {
        TEMPLATE_REGISTRATIONS_TOTAL
            .with_label_values(&["failed"])
            .inc();
    }
}

/// Helper for recording bundler runs
pub struct BuildMetrics;

impl BuildMetrics {
    pub fn record(success: bool, duration_secs: f64) {
        let result = if success { "success" } else { "failure" };
        BUILDS_TOTAL.with_label_values(&[result]).inc();
        BUILD_DURATION.observe(duration_secs);
    }
}
