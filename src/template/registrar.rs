//! Idempotent registration of template definitions.
//!
//! Each definition is looked up by tag set and inserted only when nothing
//! matches. Definitions are processed sequentially and a failure on one
//! never stops the rest.
//!
//! Matching is by tag set alone: a second definition that reuses an
//! existing tag set is skipped even if its content differs.

use serde_json::json;
use uuid::Uuid;

use crate::metrics::RegistrationMetrics;
use crate::telemetry::StructuredLogger;

use super::repository::{EmailTemplateRepository, Pagination, TemplateFilter, TemplateStoreError};
use super::types::{NewEmailTemplate, TemplateDefinition};

/// Terminal state of one definition's registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationOutcome {
    /// A template with the same tag set was already stored
    Exists,
    /// The template was inserted under this id
    Inserted(Uuid),
    /// The lookup or the insert failed; logged at error level
    Failed,
}

/// Register one definition against the repository.
pub async fn register_template(
    repository: &dyn EmailTemplateRepository,
    definition: &TemplateDefinition,
    logger: &dyn StructuredLogger,
) -> RegistrationOutcome {
    let metadata = &definition.metadata;
    let context = json!({
        "name": metadata.name,
        "tags": metadata.tags,
        "backend": repository.backend_name(),
    });

    let outcome = match try_register(repository, definition).await {
        Ok(Some(id)) => {
            logger.debug(
                &json!({ "name": metadata.name, "tags": metadata.tags, "id": id.to_string() }),
                "Email template registered",
            );
            RegistrationOutcome::Inserted(id)
        }
        Ok(None) => {
            logger.debug(&context, "Email template already exists, skipping");
            RegistrationOutcome::Exists
        }
        Err(TemplateStoreError::Conflict(_)) => {
            // Another run inserted the same tag set between lookup and insert
            logger.debug(&context, "Email template inserted concurrently, skipping");
            RegistrationOutcome::Exists
        }
        Err(e) => {
            logger.error(
                &json!({
                    "name": metadata.name,
                    "tags": metadata.tags,
                    "error": e.to_string(),
                }),
                "Failed to register email template",
            );
            RegistrationOutcome::Failed
        }
    };

    match outcome {
        RegistrationOutcome::Inserted(_) => RegistrationMetrics::record_inserted(),
        RegistrationOutcome::Exists => RegistrationMetrics::record_exists(),
        RegistrationOutcome::Failed => RegistrationMetrics::record_failed(),
    }

    outcome
}

/// `Ok(None)` when the tag set is already present.
async fn try_register(
    repository: &dyn EmailTemplateRepository,
    definition: &TemplateDefinition,
) -> Result<Option<Uuid>, TemplateStoreError> {
    let filter = TemplateFilter::by_tags(&definition.metadata.tags);
    let existing = repository.find_many(&filter, Pagination::first()).await?;
    if !existing.is_empty() {
        return Ok(None);
    }

    let created = repository
        .create_template(NewEmailTemplate::from(definition))
        .await?;
    Ok(Some(created.id))
}

/// Register every definition in order.
///
/// Per-template failures are logged and skipped; the only effects are
/// repository inserts and log lines.
pub async fn register_templates(
    repository: &dyn EmailTemplateRepository,
    definitions: &[TemplateDefinition],
    logger: &dyn StructuredLogger,
) {
    for definition in definitions {
        register_template(repository, definition, logger).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::NoopLogger;
    use crate::template::memory::MemoryTemplateRepository;
    use crate::template::types::{TemplateContent, TemplateMetadata, VariableSpec};

    fn definition(name: &str, tags: &[&str]) -> TemplateDefinition {
        TemplateDefinition {
            metadata: TemplateMetadata {
                name: name.to_string(),
                description: String::new(),
                subject: format!("{name} subject"),
                tags: tags.iter().map(|t| t.to_string()).collect(),
                variables: vec![VariableSpec::required("url", "Link")],
            },
            content: TemplateContent {
                html: format!("<a href=\"{{{{url}}}}\">{name}</a>"),
                text: None,
            },
        }
    }

    #[tokio::test]
    async fn test_insert_then_exists() {
        let repo = MemoryTemplateRepository::new();
        let def = definition("verify", &["auth", "verify-email"]);

        let first = register_template(&repo, &def, &NoopLogger).await;
        assert!(matches!(first, RegistrationOutcome::Inserted(_)));

        let second = register_template(&repo, &def, &NoopLogger).await;
        assert_eq!(second, RegistrationOutcome::Exists);
        assert_eq!(repo.len(), 1);
    }

    #[tokio::test]
    async fn test_batch_is_idempotent() {
        let repo = MemoryTemplateRepository::new();
        let defs = vec![
            definition("verify", &["auth", "verify-email"]),
            definition("reset", &["auth", "password-reset"]),
        ];

        register_templates(&repo, &defs, &NoopLogger).await;
        register_templates(&repo, &defs, &NoopLogger).await;
        assert_eq!(repo.len(), 2);
    }
}
