use std::process::ExitCode;

use anyhow::{Context, Result};

use auth_api_tooling::config::Settings;
use auth_api_tooling::metrics::export_metrics;
use auth_api_tooling::telemetry::{init_telemetry, TracingLogger};
use auth_api_tooling::template::{seed_templates, AUTH_EMAIL_TEMPLATES};

#[tokio::main]
async fn main() -> ExitCode {
    // No subscriber yet, so startup failures go to stderr
    let settings = match Settings::new() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            return ExitCode::FAILURE;
        }
    };
    let _telemetry = match init_telemetry(&settings.logging, &settings.otel) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize telemetry: {e}");
            return ExitCode::FAILURE;
        }
    };

    let code = match run(&settings).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = format!("{e:#}"), "Template registration failed");
            ExitCode::FAILURE
        }
    };

    if let Err(e) = export_metrics(&settings.metrics).await {
        tracing::warn!(error = %e, "Failed to export metrics");
    }

    code
}

async fn run(settings: &Settings) -> Result<()> {
    let logger = TracingLogger::new("template-registrar");
    seed_templates(settings, &AUTH_EMAIL_TEMPLATES, &logger)
        .await
        .context("Template registration could not complete")
}
