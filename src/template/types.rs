//! Template types and error definitions

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Rendering error type
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemplateError {
    #[error("Missing required variable: {0}")]
    MissingVariable(String),

    #[error("Invalid variables: {0}")]
    InvalidVariables(String),

    #[error("Unknown template status: {0}")]
    UnknownStatus(String),
}

/// Result type for template operations
pub type TemplateResult<T> = Result<T, TemplateError>;

/// A `{{placeholder}}` a template expects
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableSpec {
    pub name: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub required: bool,

    /// Used when the caller does not supply the variable
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
}

impl VariableSpec {
    pub fn required(name: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            required: true,
            default_value: None,
        }
    }

    pub fn optional(name: &str, description: &str, default_value: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            required: false,
            default_value: default_value.map(str::to_string),
        }
    }
}

/// Descriptive half of a template definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateMetadata {
    pub name: String,
    pub description: String,
    pub subject: String,
    /// Identity of the template for lookup; compared as a set
    pub tags: Vec<String>,
    pub variables: Vec<VariableSpec>,
}

/// Body half of a template definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateContent {
    pub html: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// A compiled-in email template
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateDefinition {
    pub metadata: TemplateMetadata,
    pub content: TemplateContent,
}

impl TemplateDefinition {
    pub fn tag_key(&self) -> String {
        tag_key(&self.metadata.tags)
    }
}

/// Lifecycle status of a stored template
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateStatus {
    #[default]
    Active,
    Inactive,
    Archived,
}

impl TemplateStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateStatus::Active => "active",
            TemplateStatus::Inactive => "inactive",
            TemplateStatus::Archived => "archived",
        }
    }
}

impl fmt::Display for TemplateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TemplateStatus {
    type Err = TemplateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(TemplateStatus::Active),
            "inactive" => Ok(TemplateStatus::Inactive),
            "archived" => Ok(TemplateStatus::Archived),
            other => Err(TemplateError::UnknownStatus(other.to_string())),
        }
    }
}

/// Insert shape for the template repository
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewEmailTemplate {
    pub name: String,
    pub description: String,
    pub subject: String,
    pub html_content: String,
    pub text_content: Option<String>,
    pub tags: Vec<String>,
    pub variables: Vec<VariableSpec>,
    #[serde(default)]
    pub status: TemplateStatus,
}

impl NewEmailTemplate {
    pub fn tag_key(&self) -> String {
        tag_key(&self.tags)
    }
}

impl From<&TemplateDefinition> for NewEmailTemplate {
    fn from(definition: &TemplateDefinition) -> Self {
        let metadata = &definition.metadata;
        NewEmailTemplate {
            name: metadata.name.clone(),
            description: metadata.description.clone(),
            subject: metadata.subject.clone(),
            html_content: definition.content.html.clone(),
            text_content: definition.content.text.clone(),
            tags: metadata.tags.clone(),
            variables: metadata.variables.clone(),
            status: TemplateStatus::Active,
        }
    }
}

/// A persisted email template
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredEmailTemplate {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub subject: String,
    pub html_content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_content: Option<String>,
    pub tags: Vec<String>,
    /// Canonical form of `tags`, unique per repository
    pub tag_key: String,
    pub variables: Vec<VariableSpec>,
    pub status: TemplateStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StoredEmailTemplate {
    pub fn from_new(template: NewEmailTemplate, id: Uuid, now: DateTime<Utc>) -> Self {
        let tag_key = template.tag_key();
        Self {
            id,
            name: template.name,
            description: template.description,
            subject: template.subject,
            html_content: template.html_content,
            text_content: template.text_content,
            tags: template.tags,
            tag_key,
            variables: template.variables,
            status: template.status,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Canonical tag-set key: sorted, de-duplicated, joined by `,`.
pub fn tag_key<S: AsRef<str>>(tags: &[S]) -> String {
    tags.iter()
        .map(|t| t.as_ref())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect::<Vec<_>>()
        .join(",")
}

/// A subject and bodies with placeholders filled in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedEmail {
    pub subject: String,
    pub html: String,
    pub text: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_key_is_order_and_duplicate_insensitive() {
        assert_eq!(tag_key(&["auth", "password-reset"]), "auth,password-reset");
        assert_eq!(
            tag_key(&["password-reset", "auth", "auth"]),
            tag_key(&["auth", "password-reset"])
        );
        assert_ne!(tag_key(&["auth"]), tag_key(&["auth", "otp"]));
        assert_eq!(tag_key::<&str>(&[]), "");
    }

    #[test]
    fn test_status_round_trip() {
        for status in [
            TemplateStatus::Active,
            TemplateStatus::Inactive,
            TemplateStatus::Archived,
        ] {
            assert_eq!(status.as_str().parse::<TemplateStatus>().unwrap(), status);
        }
        assert!(matches!(
            "deleted".parse::<TemplateStatus>(),
            Err(TemplateError::UnknownStatus(_))
        ));
        assert_eq!(serde_json::to_string(&TemplateStatus::Archived).unwrap(), "\"archived\"");
    }

    #[test]
    fn test_new_template_mirrors_definition() {
        let definition = TemplateDefinition {
            metadata: TemplateMetadata {
                name: "Welcome".to_string(),
                description: "Sent after sign-up".to_string(),
                subject: "Welcome, {{name}}".to_string(),
                tags: vec!["welcome".to_string(), "auth".to_string()],
                variables: vec![VariableSpec::required("name", "Display name")],
            },
            content: TemplateContent {
                html: "<p>Hi {{name}}</p>".to_string(),
                text: None,
            },
        };

        let new = NewEmailTemplate::from(&definition);
        assert_eq!(new.subject, definition.metadata.subject);
        assert_eq!(new.html_content, definition.content.html);
        assert_eq!(new.tags, definition.metadata.tags);
        assert_eq!(new.variables, definition.metadata.variables);
        assert_eq!(new.status, TemplateStatus::Active);
        assert_eq!(new.tag_key(), "auth,welcome");

        let stored = StoredEmailTemplate::from_new(new, Uuid::nil(), Utc::now());
        assert_eq!(stored.tag_key, definition.tag_key());
        assert_eq!(stored.created_at, stored.updated_at);
    }
}
