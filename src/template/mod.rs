//! Authentication email template system.
//!
//! This module provides:
//! - Static template definitions (subject, bodies, tags, variables)
//! - A repository abstraction with in-memory and PostgreSQL backends
//! - The registrar that seeds definitions idempotently, keyed by tag set
//! - Variable substitution for rendering stored templates
//!
//! # Example
//!
//! ```ignore
//! let repository = create_template_repository(&settings.templates, Some(pool));
//! let logger = TracingLogger::new("template-registrar");
//!
//! register_templates(repository.as_ref(), &AUTH_EMAIL_TEMPLATES, &logger).await;
//!
//! let stored = repository
//!     .find_many(&TemplateFilter::by_tags(&tags), Pagination::first())
//!     .await?;
//! let email = render_template(&stored[0], &json!({"url": "https://..."}))?;
//! ```

mod definitions;
mod factory;
mod memory;
mod postgres;
mod registrar;
mod repository;
mod seed;
mod substitution;
mod types;

pub use definitions::AUTH_EMAIL_TEMPLATES;
pub use factory::create_template_repository;
pub use memory::MemoryTemplateRepository;
pub use postgres::PostgresTemplateRepository;
pub use registrar::{register_template, register_templates, RegistrationOutcome};
pub use repository::{EmailTemplateRepository, Pagination, TemplateFilter, TemplateStoreError};
pub use seed::seed_templates;
pub use substitution::{render_template, substitute_html, substitute_string};
pub use types::{
    tag_key, NewEmailTemplate, RenderedEmail, StoredEmailTemplate, TemplateContent,
    TemplateDefinition, TemplateError, TemplateMetadata, TemplateResult, TemplateStatus,
    VariableSpec,
};
