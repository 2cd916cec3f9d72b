//! Logging and OpenTelemetry setup shared by both binaries.
//!
//! This module provides:
//! - The logger factory: a `tracing` subscriber whose format and level follow
//!   the explicit `logging.production` switch
//! - Optional OTLP export of spans to collectors like Jaeger or Tempo
//! - The [`StructuredLogger`] capability injected into the template registrar
//!
//! # Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `RUST_LOG` | Filter directives, overrides the configured level | unset |
//! | `APP_LOGGING__PRODUCTION` | JSON output at `info` | from `RUN_MODE` |
//! | `APP_OTEL__ENABLED` | Enable OpenTelemetry tracing | `false` |
//! | `APP_OTEL__ENDPOINT` | OTLP gRPC endpoint | `http://localhost:4317` |

mod logger;

pub use logger::{NoopLogger, StructuredLogger, TracingLogger};

use opentelemetry::trace::TracerProvider;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{
    runtime,
    trace::{RandomIdGenerator, Sampler, TracerProvider as SdkTracerProvider},
    Resource,
};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::config::{LoggingConfig, OtelConfig};

/// Result type for telemetry operations
pub type TelemetryResult<T> = Result<T, TelemetryError>;

/// Telemetry-specific error type
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    #[error("Failed to initialize tracing subscriber: {0}")]
    TracerInit(String),
    #[error("Failed to build OTLP exporter: {0}")]
    ExporterBuild(String),
}

/// Keeps the OpenTelemetry provider alive until the process exits.
pub struct TelemetryGuard {
    provider: Option<SdkTracerProvider>,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        if let Some(provider) = self.provider.take() {
            if let Err(e) = provider.shutdown() {
                eprintln!("Failed to shutdown OpenTelemetry provider: {e}");
            }
        }
    }
}

/// Build the level filter. `RUST_LOG` wins over the configured level.
pub fn build_env_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let filter = EnvFilter::new(config.effective_level());
        match "sqlx::query=warn".parse() {
            Ok(directive) => filter.add_directive(directive),
            Err(_) => filter,
        }
    })
}

/// Initialize the global subscriber.
///
/// Production builds log JSON at `info`; everything else logs compact,
/// human-readable lines at `debug`. Both are overridable through
/// `LoggingConfig`. When `otel.enabled` is set spans are also exported
/// over OTLP.
pub fn init_telemetry(
    logging: &LoggingConfig,
    otel: &OtelConfig,
) -> TelemetryResult<TelemetryGuard> {
    let env_filter = build_env_filter(logging);

    let fmt_layer = if logging.use_json() {
        fmt::layer().json().with_target(true).boxed()
    } else {
        fmt::layer()
            .compact()
            .with_target(true)
            .with_file(false)
            .with_line_number(false)
            .boxed()
    };

    if otel.enabled {
        let provider = init_otel_tracer(otel)?;
        let tracer = provider.tracer("auth-api-tooling");
        let otel_layer = tracing_opentelemetry::layer().with_tracer(tracer);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .with(otel_layer)
            .try_init()
            .map_err(|e| TelemetryError::TracerInit(e.to_string()))?;

        tracing::info!(
            endpoint = %otel.endpoint,
            service_name = %otel.service_name,
            sampling_ratio = %otel.sampling_ratio,
            production = logging.production,
            "OpenTelemetry tracing initialized"
        );

        Ok(TelemetryGuard {
            provider: Some(provider),
        })
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()
            .map_err(|e| TelemetryError::TracerInit(e.to_string()))?;

        tracing::debug!(
            production = logging.production,
            "Tracing initialized (OpenTelemetry disabled)"
        );

        Ok(TelemetryGuard { provider: None })
    }
}

/// Map a ratio onto a sampler, clamping the edges to always-on/off.
fn sampler_for(ratio: f64) -> Sampler {
    if ratio >= 1.0 {
        Sampler::AlwaysOn
    } else if ratio <= 0.0 {
        Sampler::AlwaysOff
    } else {
        Sampler::TraceIdRatioBased(ratio)
    }
}

fn init_otel_tracer(config: &OtelConfig) -> TelemetryResult<SdkTracerProvider> {
    use opentelemetry::KeyValue;

    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(&config.endpoint)
        .build()
        .map_err(|e| TelemetryError::ExporterBuild(e.to_string()))?;

    let provider = SdkTracerProvider::builder()
        .with_batch_exporter(exporter, runtime::Tokio)
        .with_sampler(sampler_for(config.sampling_ratio))
        .with_id_generator(RandomIdGenerator::default())
        .with_resource(Resource::new(vec![
            KeyValue::new(
                opentelemetry_semantic_conventions::resource::SERVICE_NAME,
                config.service_name.clone(),
            ),
            KeyValue::new(
                opentelemetry_semantic_conventions::resource::SERVICE_VERSION,
                env!("CARGO_PKG_VERSION"),
            ),
        ]))
        .build();

    Ok(provider)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_otel_config() {
        let config = OtelConfig::default();
        assert!(!config.enabled);
        assert_eq!(config.endpoint, "http://localhost:4317");
        assert_eq!(config.service_name, "auth-api-tooling");
        assert_eq!(config.sampling_ratio, 1.0);
    }

    #[test]
    fn test_sampler_edges() {
        assert!(matches!(sampler_for(1.5), Sampler::AlwaysOn));
        assert!(matches!(sampler_for(0.0), Sampler::AlwaysOff));
        assert!(matches!(sampler_for(0.25), Sampler::TraceIdRatioBased(_)));
    }

    #[test]
    fn test_guard_without_provider_drops_cleanly() {
        let guard = TelemetryGuard { provider: None };
        drop(guard);
    }
}
