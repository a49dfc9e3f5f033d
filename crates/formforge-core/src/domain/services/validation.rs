//! Submission and request validation

use std::collections::BTreeMap;

use regex::Regex;

use crate::domain::aggregates::{Field, FieldChanges, FieldSpec};
use crate::domain::value_objects::typed_value::parse_number;
use crate::domain::value_objects::FieldType;
use crate::error::FormsError;

// ASCII word characters; the regex crate's `\w` is Unicode-aware
const EMAIL_PATTERN: &str = r"^[A-Za-z0-9_\-.]+@([A-Za-z0-9_-]+\.)+[A-Za-z0-9_-]{2,4}$";
const FIELD_KEY_PATTERN: &str = r"^[a-zA-Z][a-zA-Z0-9_]*$";

const TITLE_MAX: usize = 255;
const DESCRIPTION_MAX: usize = 5000;
const KEY_MAX: usize = 100;
const LABEL_MAX: usize = 255;
const PLACEHOLDER_MAX: usize = 255;
const HELP_TEXT_MAX: usize = 1000;
const DEFAULT_VALUE_MAX: usize = 500;

/// Checks submitted values against the active fields of a form
pub struct SubmissionValidator {
    email: Regex,
}

impl SubmissionValidator {
    pub fn new() -> Self {
        Self {
            email: Regex::new(EMAIL_PATTERN).expect("email pattern compiles"),
        }
    }

    /// Every failing field is reported, keyed by field key. Empty map means valid.
    pub fn validate(
        &self,
        fields: &[Field],
        values: &BTreeMap<String, String>,
    ) -> BTreeMap<String, String> {
        let mut errors = BTreeMap::new();

        for field in fields.iter().filter(|f| f.is_active()) {
            let value = values.get(&field.key).map(|v| v.trim()).unwrap_or("");

            if value.is_empty() {
                if field.required {
                    errors.insert(field.key.clone(), format!("{} is required", field.label));
                }
                continue;
            }

            match field.field_type {
                FieldType::Email if !self.email.is_match(value) => {
                    errors.insert(field.key.clone(), "Invalid email format".to_string());
                }
                FieldType::Number if parse_number(value).is_none() => {
                    errors.insert(field.key.clone(), "Must be a valid number".to_string());
                }
                _ => {}
            }
        }

        errors
    }
}

impl Default for SubmissionValidator {
    fn default() -> Self {
        Self::new()
    }
}

/// Attribute constraints on creator input
pub struct RequestRules;

impl RequestRules {
    pub fn form_details(
        title: Option<&str>,
        description: Option<&str>,
        title_required: bool,
    ) -> Result<(), FormsError> {
        let mut errors = BTreeMap::new();

        match title {
            Some(t) if t.trim().is_empty() => {
                errors.insert("title".into(), "Title is required".into());
            }
            Some(t) if t.chars().count() > TITLE_MAX => {
                errors.insert("title".into(), too_long("Title", TITLE_MAX));
            }
            None if title_required => {
                errors.insert("title".into(), "Title is required".into());
            }
            _ => {}
        }
        check_max(&mut errors, "description", "Description", description, DESCRIPTION_MAX);

        finish(errors)
    }

    pub fn field_spec(spec: &FieldSpec, key_pattern: &Regex) -> Result<(), FormsError> {
        let mut errors = BTreeMap::new();

        if spec.key.trim().is_empty() {
            errors.insert("key".into(), "Field key is required".into());
        } else if spec.key.chars().count() > KEY_MAX {
            errors.insert("key".into(), too_long("Field key", KEY_MAX));
        } else if !key_pattern.is_match(&spec.key) {
            errors.insert(
                "key".into(),
                "Field key must start with a letter and contain only letters, numbers, and underscores"
                    .into(),
            );
        }

        if spec.label.trim().is_empty() {
            errors.insert("label".into(), "Label is required".into());
        }
        check_max(&mut errors, "label", "Label", Some(&spec.label), LABEL_MAX);
        check_optional_attributes(
            &mut errors,
            spec.placeholder.as_deref(),
            spec.help_text.as_deref(),
            spec.default_value.as_deref(),
        );

        finish(errors)
    }

    pub fn field_changes(changes: &FieldChanges) -> Result<(), FormsError> {
        let mut errors = BTreeMap::new();

        if let Some(label) = &changes.label {
            if label.trim().is_empty() {
                errors.insert("label".into(), "Label is required".into());
            }
            check_max(&mut errors, "label", "Label", Some(label), LABEL_MAX);
        }
        check_optional_attributes(
            &mut errors,
            changes.placeholder.as_deref(),
            changes.help_text.as_deref(),
            changes.default_value.as_deref(),
        );

        finish(errors)
    }

    pub fn key_pattern() -> Regex {
        Regex::new(FIELD_KEY_PATTERN).expect("field key pattern compiles")
    }
}

fn check_optional_attributes(
    errors: &mut BTreeMap<String, String>,
    placeholder: Option<&str>,
    help_text: Option<&str>,
    default_value: Option<&str>,
) {
    check_max(errors, "placeholder", "Placeholder", placeholder, PLACEHOLDER_MAX);
    check_max(errors, "help_text", "Help text", help_text, HELP_TEXT_MAX);
    check_max(errors, "default_value", "Default value", default_value, DEFAULT_VALUE_MAX);
}

fn check_max(
    errors: &mut BTreeMap<String, String>,
    attribute: &str,
    name: &str,
    value: Option<&str>,
    max: usize,
) {
    if let Some(value) = value {
        if value.chars().count() > max && !errors.contains_key(attribute) {
            errors.insert(attribute.to_string(), too_long(name, max));
        }
    }
}

fn too_long(name: &str, max: usize) -> String {
    format!("{} must not exceed {} characters", name, max)
}

fn finish(errors: BTreeMap<String, String>) -> Result<(), FormsError> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(FormsError::validation("Validation failed", errors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::{FieldId, FormId};
    use chrono::Utc;

    fn field(key: &str, field_type: FieldType, required: bool) -> Field {
        Field::define(
            FieldId::new(1),
            FormId::new(1),
            FieldSpec {
                key: key.into(),
                label: key.to_string(),
                field_type: Some(field_type),
                required,
                ..Default::default()
            },
            1,
            Utc::now(),
        )
    }

    fn values(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_required_field_missing() {
        let validator = SubmissionValidator::new();
        let errors = validator.validate(&[field("name", FieldType::Text, true)], &values(&[]));
        assert_eq!(errors.get("name").map(String::as_str), Some("name is required"));
    }

    #[test]
    fn test_blank_counts_as_missing() {
        let validator = SubmissionValidator::new();
        let errors =
            validator.validate(&[field("name", FieldType::Text, true)], &values(&[("name", "  ")]));
        assert!(errors.contains_key("name"));
    }

    #[test]
    fn test_collects_every_failure() {
        let validator = SubmissionValidator::new();
        let fields = vec![
            field("email", FieldType::Email, false),
            field("age", FieldType::Number, false),
            field("name", FieldType::Text, true),
        ];
        let errors = validator.validate(&fields, &values(&[("email", "nope"), ("age", "old")]));
        assert_eq!(errors.len(), 3);
        assert_eq!(errors["email"], "Invalid email format");
        assert_eq!(errors["age"], "Must be a valid number");
    }

    #[test]
    fn test_valid_values_pass() {
        let validator = SubmissionValidator::new();
        let fields = vec![
            field("email", FieldType::Email, true),
            field("age", FieldType::Number, true),
        ];
        let errors = validator.validate(
            &fields,
            &values(&[("email", "first.last@mail.example.org"), ("age", "25")]),
        );
        assert!(errors.is_empty());
    }

    #[test]
    fn test_email_rejects_non_ascii_letters() {
        let validator = SubmissionValidator::new();
        let fields = vec![field("email", FieldType::Email, true)];

        let errors = validator.validate(&fields, &values(&[("email", "jöhn@b.com")]));
        assert_eq!(errors["email"], "Invalid email format");

        let errors = validator.validate(&fields, &values(&[("email", "john_doe-1@b.com")]));
        assert!(errors.is_empty());
    }

    #[test]
    fn test_optional_empty_skips_type_checks() {
        let validator = SubmissionValidator::new();
        let errors = validator.validate(&[field("email", FieldType::Email, false)], &values(&[]));
        assert!(errors.is_empty());
    }

    #[test]
    fn test_form_details_rules() {
        assert!(RequestRules::form_details(Some("Survey"), None, true).is_ok());
        assert!(RequestRules::form_details(None, None, false).is_ok());

        let err = RequestRules::form_details(None, Some(&"x".repeat(5001)), true).unwrap_err();
        match err {
            FormsError::ValidationFailed { errors, .. } => {
                assert!(errors.contains_key("title"));
                assert!(errors.contains_key("description"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_field_key_rules() {
        let pattern = RequestRules::key_pattern();
        let mut spec = FieldSpec {
            key: "first_name".into(),
            label: "First name".into(),
            ..Default::default()
        };
        assert!(RequestRules::field_spec(&spec, &pattern).is_ok());

        for bad in ["1st", "first-name", "", "a b"] {
            spec.key = bad.into();
            assert!(RequestRules::field_spec(&spec, &pattern).is_err(), "{bad}");
        }

        spec.key = format!("a{}", "b".repeat(100));
        assert!(RequestRules::field_spec(&spec, &pattern).is_err());
    }

    #[test]
    fn test_field_changes_rules() {
        assert!(RequestRules::field_changes(&FieldChanges::default()).is_ok());
        let changes = FieldChanges {
            help_text: Some("h".repeat(1001)),
            ..Default::default()
        };
        assert!(RequestRules::field_changes(&changes).is_err());
    }
}
