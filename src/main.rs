use std::process::ExitCode;

use anyhow::{Context, Result};

use auth_api_tooling::build::run_build;
use auth_api_tooling::config::Settings;
use auth_api_tooling::metrics::export_metrics;
use auth_api_tooling::telemetry::init_telemetry;

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

    let success = match run(&settings).await {
        Ok(success) => success,
        Err(e) => {
            tracing::error!(error = format!("{e:#}"), "Build failed");
            false
        }
    };

    if let Err(e) = export_metrics(&settings.metrics).await {
        tracing::warn!(error = %e, "Failed to export metrics");
    }

    if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

async fn run(settings: &Settings) -> Result<bool> {
    tracing::debug!(
        entry_point = %settings.build.entry_point,
        out_dir = %settings.build.out_dir,
        "Configuration loaded"
    );

    let outcome = run_build(&settings.build)
        .await
        .context("Bundler could not be run")?;

    if outcome.success {
        tracing::info!(
            version = %outcome.constants.version,
            git_commit = %outcome.constants.git_commit,
            "Build completed"
        );
    } else {
        tracing::error!("Build failed");
    }

    Ok(outcome.success)
}
