//! Template repository factory

use std::sync::Arc;

use crate::config::TemplateStoreConfig;
use crate::postgres::PostgresPool;

use super::memory::MemoryTemplateRepository;
use super::postgres::PostgresTemplateRepository;
use super::repository::EmailTemplateRepository;

/// Create a template repository based on configuration.
///
/// - `"postgres"`: a `PostgresTemplateRepository` if a pool is provided
/// - `"memory"` (and anything unrecognised): a `MemoryTemplateRepository`
///
/// # Example
///
/// ```rust,ignore
/// let repository = create_template_repository(&settings.templates, Some(pool.clone()));
/// ```
pub fn create_template_repository(
    settings: &TemplateStoreConfig,
    postgres_pool: Option<Arc<PostgresPool>>,
) -> Arc<dyn EmailTemplateRepository> {
    match settings.backend.as_str() {
        "postgres" => {
            if let Some(pool) = postgres_pool {
                tracing::info!(backend = "postgres", "Creating PostgreSQL template repository");
                Arc::new(PostgresTemplateRepository::new(pool.pool().clone()))
            } else {
                tracing::warn!(
                    "PostgreSQL template backend requested but no pool provided, falling back to memory"
                );
                Arc::new(MemoryTemplateRepository::new())
            }
        }
        "memory" => {
            tracing::info!(backend = "memory", "Creating in-memory template repository");
            Arc::new(MemoryTemplateRepository::new())
        }
        other => {
            tracing::warn!(backend = %other, "Unknown template backend, using memory");
            Arc::new(MemoryTemplateRepository::new())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_backend() {
        let settings = TemplateStoreConfig {
            backend: "memory".to_string(),
        };
        assert_eq!(create_template_repository(&settings, None).backend_name(), "memory");
    }

    #[test]
    fn test_postgres_without_pool_falls_back() {
        let settings = TemplateStoreConfig::default();
        assert_eq!(settings.backend, "postgres");
        assert_eq!(create_template_repository(&settings, None).backend_name(), "memory");
    }

    #[test]
    fn test_unknown_backend_falls_back() {
        let settings = TemplateStoreConfig {
            backend: "redis".to_string(),
        };
        assert_eq!(create_template_repository(&settings, None).backend_name(), "memory");
    }
}
