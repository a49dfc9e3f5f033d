//! Data Transfer Objects (DTOs)
//!
//! Objects for transferring data across boundaries.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::PagingConfig;
use crate::domain::aggregates::{Field, FieldValue, Form, Response};
use crate::domain::services::SnapshotEntry;
use crate::domain::value_objects::{
    FieldId, FieldType, FormGroupId, FormId, FormStatus, OwnerId, ResponseId, ResponseStatus, Slug,
};

pub use crate::domain::aggregates::{FieldChanges, FieldSpec};
pub use crate::ports::outbound::{SubmittedWindow, ValueFilter};

// =============================================================================
// Form Commands
// =============================================================================

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CreateFormCommand {
    pub title: String,
    pub description: Option<String>,
    pub settings: Option<serde_json::Value>,
}

/// Partial update; absent attributes are left untouched
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct UpdateFormCommand {
    pub title: Option<String>,
    pub description: Option<String>,
    pub settings: Option<serde_json::Value>,
}

// =============================================================================
// Field Commands
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FieldOrder {
    pub field_id: FieldId,
    pub display_order: i32,
}

// =============================================================================
// Submission
// =============================================================================

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SubmissionCommand {
    pub values: BTreeMap<String, String>,
    /// Hidden field real respondents never fill
    pub honeypot: Option<String>,
    /// Echo of `PublicForm::load_timestamp`, epoch milliseconds
    pub load_timestamp: Option<i64>,
    pub origin: Option<String>,
    pub respondent_id: Option<OwnerId>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SubmissionReceipt {
    pub response_id: ResponseId,
    pub message: String,
}

// =============================================================================
// Paging
// =============================================================================

/// Zero-based page request; `size` falls back to the configured default
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PageRequest {
    #[serde(default)]
    pub page: usize,
    pub size: Option<usize>,
}

impl PageRequest {
    pub fn new(page: usize, size: usize) -> Self {
        Self {
            page,
            size: Some(size),
        }
    }

    /// Effective page size, clamped to `1..=max_size`
    pub fn resolve_size(&self, config: &PagingConfig) -> usize {
        self.size
            .unwrap_or(config.default_size)
            .clamp(1, config.max_size.max(1))
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub page: usize,
    pub size: usize,
    pub total_pages: usize,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: usize, page: usize, size: usize) -> Self {
        let total_pages = if size == 0 { 0 } else { total.div_ceil(size) };
        Self {
            items,
            total,
            page,
            size,
            total_pages,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseQuery {
    #[serde(flatten)]
    pub window: SubmittedWindow,
    #[serde(flatten)]
    pub page: PageRequest,
}

// =============================================================================
// Views
// =============================================================================

#[derive(Clone, Debug, Serialize)]
pub struct FormSummary {
    pub id: FormId,
    pub group_id: FormGroupId,
    pub slug: Slug,
    pub title: String,
    pub status: FormStatus,
    pub version: i32,
    pub field_count: usize,
    pub response_count: usize,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FormSummary {
    pub fn from_form(form: &Form, field_count: usize, response_count: usize) -> Self {
        Self {
            id: form.id(),
            group_id: form.group_id(),
            slug: form.slug().clone(),
            title: form.title().to_string(),
            status: form.status(),
            version: form.version(),
            field_count,
            response_count,
            published_at: form.published_at(),
            created_at: form.created_at(),
            updated_at: form.updated_at(),
        }
    }
}

/// Form plus its active fields in display order
#[derive(Clone, Debug, Serialize)]
pub struct FormDetails {
    #[serde(flatten)]
    pub form: Form,
    pub fields: Vec<Field>,
}

/// What an anonymous respondent sees
#[derive(Clone, Debug, Serialize)]
pub struct PublicForm {
    pub slug: Slug,
    pub title: String,
    pub description: Option<String>,
    pub settings: Option<serde_json::Value>,
    pub fields: Vec<PublicField>,
    /// Epoch milliseconds; echoed back on submit
    pub load_timestamp: i64,
}

#[derive(Clone, Debug, Serialize)]
pub struct PublicField {
    pub key: String,
    pub field_type: FieldType,
    pub label: String,
    pub placeholder: Option<String>,
    pub help_text: Option<String>,
    pub required: bool,
    pub display_order: i32,
    pub validation_rules: Option<serde_json::Value>,
    pub config: Option<serde_json::Value>,
    pub default_value: Option<String>,
}

impl From<Field> for PublicField {
    fn from(field: Field) -> Self {
        Self {
            key: field.key,
            field_type: field.field_type,
            label: field.label,
            placeholder: field.placeholder,
            help_text: field.help_text,
            required: field.required,
            display_order: field.display_order,
            validation_rules: field.validation_rules,
            config: field.config,
            default_value: field.default_value,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ResponseSummary {
    pub id: ResponseId,
    pub form_id: FormId,
    pub form_version: i32,
    pub status: ResponseStatus,
    pub submission_ip: Option<String>,
    pub submitted_at: DateTime<Utc>,
}

impl From<&Response> for ResponseSummary {
    fn from(response: &Response) -> Self {
        Self {
            id: response.id,
            form_id: response.form_id,
            form_version: response.form_version,
            status: response.status,
            submission_ip: response.submission_ip.clone(),
            submitted_at: response.submitted_at,
        }
    }
}

/// Whole-record view decoded from the stored blobs
#[derive(Clone, Debug, Serialize)]
pub struct ResponseDetails {
    #[serde(flatten)]
    pub summary: ResponseSummary,
    pub respondent_id: Option<OwnerId>,
    pub values: BTreeMap<String, String>,
    pub schema: Vec<SnapshotEntry>,
    pub typed_values: Vec<FieldValue>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_math() {
        let page = Page::new((40..45).collect::<Vec<_>>(), 45, 2, 20);
        assert_eq!(page.total, 45);
        assert_eq!(page.total_pages, 3);

        let empty: Page<u8> = Page::new(vec![], 0, 0, 20);
        assert_eq!(empty.total_pages, 0);
        assert!(empty.items.is_empty());
    }

    #[test]
    fn test_page_size_resolution() {
        let config = PagingConfig::default();
        assert_eq!(PageRequest::default().resolve_size(&config), 20);
        assert_eq!(PageRequest::new(0, 500).resolve_size(&config), 100);
        assert_eq!(PageRequest::new(0, 0).resolve_size(&config), 1);
    }

    #[test]
    fn test_submission_command_defaults() {
        let command: SubmissionCommand =
            serde_json::from_str(r#"{"values":{"name":"Ada"}}"#).unwrap();
        assert_eq!(command.values.get("name").map(String::as_str), Some("Ada"));
        assert!(command.honeypot.is_none());
        assert!(command.load_timestamp.is_none());
    }
}
