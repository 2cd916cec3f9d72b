//! In-memory template repository using DashMap.
//!
//! Templates are lost on restart; used by tests and by the registrar when no
//! database is configured.

use async_trait::async_trait;
use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use uuid::Uuid;

use super::repository::{EmailTemplateRepository, Pagination, TemplateFilter, TemplateStoreError};
use super::types::{NewEmailTemplate, StoredEmailTemplate};

/// In-memory template repository.
///
/// `tag_index` reserves a tag key before the template is stored, so two
/// concurrent inserts with the same tag set cannot both succeed.
#[derive(Default)]
pub struct MemoryTemplateRepository {
    templates: DashMap<Uuid, StoredEmailTemplate>,
    tag_index: DashMap<String, Uuid>,
}

impl MemoryTemplateRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    pub fn get(&self, id: Uuid) -> Option<StoredEmailTemplate> {
        self.templates.get(&id).map(|t| t.clone())
    }
}

#[async_trait]
impl EmailTemplateRepository for MemoryTemplateRepository {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn find_many(
        &self,
        filter: &TemplateFilter,
        pagination: Pagination,
    ) -> Result<Vec<StoredEmailTemplate>, TemplateStoreError> {
        let mut matches: Vec<StoredEmailTemplate> = self
            .templates
            .iter()
            .filter(|entry| filter.matches(entry.value()))
            .map(|entry| entry.value().clone())
            .collect();

        matches.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));

        Ok(matches
            .into_iter()
            .skip(pagination.offset)
            .take(pagination.limit)
            .collect())
    }

    async fn create_template(
        &self,
        template: NewEmailTemplate,
    ) -> Result<StoredEmailTemplate, TemplateStoreError> {
        let key = template.tag_key();

        match self.tag_index.entry(key) {
            Entry::Occupied(entry) => Err(TemplateStoreError::Conflict(entry.key().clone())),
            Entry::Vacant(entry) => {
                let stored = StoredEmailTemplate::from_new(template, Uuid::new_v4(), Utc::now());
                entry.insert(stored.id);
                self.templates.insert(stored.id, stored.clone());

                tracing::debug!(
                    id = %stored.id,
                    name = %stored.name,
                    tag_key = %stored.tag_key,
                    "Template stored in memory"
                );

                Ok(stored)
            }
        }
    }
}
