//! One-shot seeding run: connect, bootstrap the schema, register definitions.

use std::sync::Arc;

use crate::config::Settings;
use crate::error::Result;
use crate::postgres::PostgresPool;
use crate::telemetry::StructuredLogger;

use super::factory::create_template_repository;
use super::registrar::register_templates;
use super::types::TemplateDefinition;

/// Register `definitions` against the configured repository.
///
/// Connection and schema failures are returned; per-template failures are
/// only logged.
pub async fn seed_templates(
    settings: &Settings,
    definitions: &[TemplateDefinition],
    logger: &dyn StructuredLogger,
) -> Result<()> {
    let pool = if settings.templates.backend == "postgres" {
        let pool = PostgresPool::new(&settings.database).await?;
        pool.ensure_schema().await?;
        Some(Arc::new(pool))
    } else {
        None
    };

    let repository = create_template_repository(&settings.templates, pool.clone());

    tracing::info!(
        count = definitions.len(),
        backend = repository.backend_name(),
        "Registering email templates"
    );
    register_templates(repository.as_ref(), definitions, logger).await;
    tracing::info!("Email template registration finished");

    if let Some(pool) = pool {
        pool.close().await;
    }

    Ok(())
}
