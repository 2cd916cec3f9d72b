//! Repository trait for persisted email templates.
//!
//! Implementations (memory, PostgreSQL) are interchangeable behind
//! `Arc<dyn EmailTemplateRepository>`.

use async_trait::async_trait;
use thiserror::Error;

use super::types::{tag_key, NewEmailTemplate, StoredEmailTemplate, TemplateStatus};

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum TemplateStoreError {
    /// PostgreSQL operation failed
    #[error("PostgreSQL error: {0}")]
    Postgres(#[from] sqlx::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A template with the same tag set already exists
    #[error("Template with tags [{0}] already exists")]
    Conflict(String),

    /// Backend is temporarily unavailable
    #[error("Backend unavailable: {0}")]
    Unavailable(String),
}

/// Query filter. `None` fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateFilter {
    /// Matches templates with exactly this tag set (order and duplicates ignored)
    pub tags: Option<Vec<String>>,
    pub status: Option<TemplateStatus>,
}

impl TemplateFilter {
    pub fn by_tags(tags: &[String]) -> Self {
        Self {
            tags: Some(tags.to_vec()),
            status: None,
        }
    }

    /// Canonical key of the tag filter, if any.
    pub fn tag_key(&self) -> Option<String> {
        self.tags.as_deref().map(tag_key)
    }

    pub fn matches(&self, template: &StoredEmailTemplate) -> bool {
        if let Some(key) = self.tag_key() {
            if template.tag_key != key {
                return false;
            }
        }
        if let Some(status) = self.status {
            if template.status != status {
                return false;
            }
        }
        true
    }
}

/// Limit/offset window over query results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub limit: usize,
    pub offset: usize,
}

impl Pagination {
    pub fn new(limit: usize, offset: usize) -> Self {
        Self { limit, offset }
    }

    /// Only the first match.
    pub fn first() -> Self {
        Self::new(1, 0)
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(50, 0)
    }
}

/// Persistent storage for email templates.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`; a single repository is shared
/// across tasks.
#[async_trait]
pub trait EmailTemplateRepository: Send + Sync {
    /// Backend identifier for logging
    fn backend_name(&self) -> &'static str;

    /// Templates matching `filter`, oldest first, windowed by `pagination`.
    async fn find_many(
        &self,
        filter: &TemplateFilter,
        pagination: Pagination,
    ) -> Result<Vec<StoredEmailTemplate>, TemplateStoreError>;

    /// Insert a template and return it with its generated id.
    ///
    /// # Errors
    ///
    /// Returns `TemplateStoreError::Conflict` when a template with the same
    /// tag set already exists.
    async fn create_template(
        &self,
        template: NewEmailTemplate,
    ) -> Result<StoredEmailTemplate, TemplateStoreError>;
}
