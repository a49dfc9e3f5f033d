//! Field entity
//!
//! A field definition scoped to one form version. Never physically removed:
//! captured responses keep referring to field ids after a soft delete.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{FieldId, FieldType, FormId};

/// Field definition
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Field {
    pub id: FieldId,
    pub form_id: FormId,
    /// Stable key used in submissions, unique among active fields of a form
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
    pub deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Everything needed to define a new field
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub key: String,
    pub field_type: Option<FieldType>,
    pub label: String,
    pub placeholder: Option<String>,
    pub help_text: Option<String>,
    #[serde(default)]
    pub required: bool,
    pub validation_rules: Option<serde_json::Value>,
    pub config: Option<serde_json::Value>,
    pub default_value: Option<String>,
}

/// Partial update of a field; `None` leaves the attribute untouched.
/// The key is immutable once created.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldChanges {
    pub field_type: Option<FieldType>,
    pub label: Option<String>,
    pub placeholder: Option<String>,
    pub help_text: Option<String>,
    pub required: Option<bool>,
    pub validation_rules: Option<serde_json::Value>,
    pub config: Option<serde_json::Value>,
    pub default_value: Option<String>,
}

impl Field {
    pub fn define(
        id: FieldId,
        form_id: FormId,
        spec: FieldSpec,
        display_order: i32,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            form_id,
            key: spec.key,
            field_type: spec.field_type.unwrap_or(FieldType::Text),
            label: spec.label,
            placeholder: spec.placeholder,
            help_text: spec.help_text,
            required: spec.required,
            display_order,
            validation_rules: spec.validation_rules,
            config: spec.config,
            default_value: spec.default_value,
            deleted: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Copy into another form version under a fresh id
    pub fn copy_to(&self, form_id: FormId, id: FieldId, now: DateTime<Utc>) -> Self {
        Self {
            id,
            form_id,
            created_at: now,
            updated_at: now,
            ..self.clone()
        }
    }

    pub fn apply(&mut self, changes: FieldChanges, now: DateTime<Utc>) {
        if let Some(field_type) = changes.field_type {
            self.field_type = field_type;
        }
        if let Some(label) = changes.label {
            self.label = label;
        }
        if changes.placeholder.is_some() {
            self.placeholder = changes.placeholder;
        }
        if changes.help_text.is_some() {
            self.help_text = changes.help_text;
        }
        if let Some(required) = changes.required {
            self.required = required;
        }
        if changes.validation_rules.is_some() {
            self.validation_rules = changes.validation_rules;
        }
        if changes.config.is_some() {
            self.config = changes.config;
        }
        if changes.default_value.is_some() {
            self.default_value = changes.default_value;
        }
        self.updated_at = now;
    }

    pub fn mark_deleted(&mut self, now: DateTime<Utc>) {
        self.deleted = true;
        self.updated_at = now;
    }

    pub fn is_active(&self) -> bool {
        !self.deleted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec() -> FieldSpec {
        FieldSpec {
            key: "email".into(),
            field_type: Some(FieldType::Email),
            label: "Email".into(),
            required: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_define_defaults_to_text() {
        let field = Field::define(
            FieldId::new(1),
            FormId::new(1),
            FieldSpec {
                key: "note".into(),
                label: "Note".into(),
                ..Default::default()
            },
            1,
            Utc::now(),
        );
        assert_eq!(field.field_type, FieldType::Text);
        assert!(!field.required);
        assert!(field.is_active());
    }

    #[test]
    fn test_apply_is_partial() {
        let mut field = Field::define(FieldId::new(1), FormId::new(1), spec(), 1, Utc::now());
        field.apply(
            FieldChanges {
                label: Some("Work email".into()),
                ..Default::default()
            },
            Utc::now(),
        );
        assert_eq!(field.label, "Work email");
        assert_eq!(field.field_type, FieldType::Email);
        assert!(field.required);
    }

    #[test]
    fn test_copy_to_other_version() {
        let field = Field::define(FieldId::new(1), FormId::new(1), spec(), 3, Utc::now());
        let copy = field.copy_to(FormId::new(2), FieldId::new(8), Utc::now());
        assert_eq!(copy.form_id, FormId::new(2));
        assert_eq!(copy.id, FieldId::new(8));
        assert_eq!(copy.key, "email");
        assert_eq!(copy.display_order, 3);
    }
}
