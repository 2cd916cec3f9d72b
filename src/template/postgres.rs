//! PostgreSQL-based template repository.
//!
//! Templates live in the `email_templates` table. The unique index on
//! `tag_key` makes inserts for an already-registered tag set a no-op that is
//! reported as `TemplateStoreError::Conflict`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use super::repository::{EmailTemplateRepository, Pagination, TemplateFilter, TemplateStoreError};
use super::types::{NewEmailTemplate, StoredEmailTemplate, TemplateStatus, VariableSpec};

type TemplateRow = (
    Uuid,
    String,
    String,
    String,
    String,
    Option<String>,
    Vec<String>,
    String,
    Json<Vec<VariableSpec>>,
    String,
    DateTime<Utc>,
    DateTime<Utc>,
);

/// PostgreSQL-based template repository.
pub struct PostgresTemplateRepository {
    pool: PgPool,
}

impl PostgresTemplateRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn row_to_template(row: TemplateRow) -> Result<StoredEmailTemplate, TemplateStoreError> {
    let (
        id,
        name,
        description,
        subject,
        html_content,
        text_content,
        tags,
        tag_key,
        Json(variables),
        status,
        created_at,
        updated_at,
    ) = row;

    let status = status
        .parse::<TemplateStatus>()
        .map_err(|e| TemplateStoreError::Unavailable(format!("corrupt row {id}: {e}")))?;

    Ok(StoredEmailTemplate {
        id,
        name,
        description,
        subject,
        html_content,
        text_content,
        tags,
        tag_key,
        variables,
        status,
        created_at,
        updated_at,
    })
}

#[async_trait]
impl EmailTemplateRepository for PostgresTemplateRepository {
    fn backend_name(&self) -> &'static str {
        "postgres"
    }

    async fn find_many(
        &self,
        filter: &TemplateFilter,
        pagination: Pagination,
    ) -> Result<Vec<StoredEmailTemplate>, TemplateStoreError> {
        let rows: Vec<TemplateRow> = sqlx::query_as(
            r#"
            SELECT id, name, description, subject, html_content, text_content,
                   tags, tag_key, variables, status, created_at, updated_at
            FROM email_templates
            WHERE ($1::text IS NULL OR tag_key = $1)
              AND ($2::text IS NULL OR status = $2)
            ORDER BY created_at ASC, id ASC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(filter.tag_key())
        .bind(filter.status.map(|s| s.as_str()))
        .bind(pagination.limit as i64)
        .bind(pagination.offset as i64)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(row_to_template).collect()
    }

    async fn create_template(
        &self,
        template: NewEmailTemplate,
    ) -> Result<StoredEmailTemplate, TemplateStoreError> {
        let stored = StoredEmailTemplate::from_new(template, Uuid::new_v4(), Utc::now());

        // No row back means the tag_key index rejected the insert
        let inserted: Option<(Uuid,)> = sqlx::query_as(
            r#"
            INSERT INTO email_templates
                (id, name, description, subject, html_content, text_content,
                 tags, tag_key, variables, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            ON CONFLICT (tag_key) DO NOTHING
            RETURNING id
            "#,
        )
        .bind(stored.id)
        .bind(&stored.name)
        .bind(&stored.description)
        .bind(&stored.subject)
        .bind(&stored.html_content)
        .bind(&stored.text_content)
        .bind(&stored.tags)
        .bind(&stored.tag_key)
        .bind(Json(&stored.variables))
        .bind(stored.status.as_str())
        .bind(stored.created_at)
        .bind(stored.updated_at)
        .fetch_optional(&self.pool)
        .await?;

        match inserted {
            Some(_) => {
                tracing::debug!(
                    id = %stored.id,
                    name = %stored.name,
                    tag_key = %stored.tag_key,
                    "Template inserted into PostgreSQL"
                );
                Ok(stored)
            }
            None => Err(TemplateStoreError::Conflict(stored.tag_key)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_conversion() {
        let now = Utc::now();
        let row: TemplateRow = (
            Uuid::nil(),
            "Reset".to_string(),
            "Password reset".to_string(),
            "Reset your password".to_string(),
            "<p>{{url}}</p>".to_string(),
            None,
            vec!["auth".to_string(), "password-reset".to_string()],
            "auth,password-reset".to_string(),
            Json(vec![VariableSpec::required("url", "Reset link")]),
            "inactive".to_string(),
            now,
            now,
        );

        let template = row_to_template(row).unwrap();
        assert_eq!(template.status, TemplateStatus::Inactive);
        assert_eq!(template.variables.len(), 1);
        assert_eq!(template.tag_key, "auth,password-reset");
    }

    #[test]
    fn test_row_with_unknown_status_is_rejected() {
        let now = Utc::now();
        let row: TemplateRow = (
            Uuid::nil(),
            String::new(),
            String::new(),
            String::new(),
            String::new(),
            None,
            vec![],
            String::new(),
            Json(vec![]),
            "deleted".to_string(),
            now,
            now,
        );

        assert!(matches!(
            row_to_template(row),
            Err(TemplateStoreError::Unavailable(_))
        ));
    }
}
