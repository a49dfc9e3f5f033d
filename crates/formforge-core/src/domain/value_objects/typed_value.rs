//! Typed Value Object
//!
//! Secondary, filterable rendition of one submitted value. The canonical
//! record is the response payload blob; a typed value only ever narrows it.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::FieldType;

const CHECKBOX_TRUE: [&str; 4] = ["true", "yes", "1", "on"];

const LOCAL_DATE_TIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// Exactly one populated slot
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "slot", content = "value", rename_all = "snake_case")]
pub enum TypedValue {
    Text(String),
    Number(f64),
    Timestamp(NaiveDateTime),
    Boolean(bool),
}

impl TypedValue {
    /// Map a raw submitted string for a field of `field_type`.
    ///
    /// Never fails: anything that does not parse as the declared type is kept
    /// as text. Blank input yields `None` (no typed row is recorded).
    pub fn map(field_type: FieldType, raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }

        let value = match field_type {
            FieldType::Text
            | FieldType::Email
            | FieldType::Textarea
            | FieldType::Dropdown
            | FieldType::Radio => Self::Text(raw.to_string()),
            FieldType::Number => match parse_number(trimmed) {
                Some(number) => Self::Number(number),
                None => Self::Text(raw.to_string()),
            },
            FieldType::Date => match parse_timestamp(trimmed) {
                Some(timestamp) => Self::Timestamp(timestamp),
                None => Self::Text(raw.to_string()),
            },
            FieldType::Checkbox => {
                let lowered = trimmed.to_lowercase();
                Self::Boolean(CHECKBOX_TRUE.contains(&lowered.as_str()))
            }
        };

        Some(value)
    }
}

/// Decimal parse; non-finite results are not numbers worth indexing
pub(crate) fn parse_number(value: &str) -> Option<f64> {
    value.parse::<f64>().ok().filter(|n| n.is_finite())
}

fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    if let Ok(with_offset) = DateTime::parse_from_rfc3339(value) {
        return Some(with_offset.naive_utc());
    }

    for format in LOCAL_DATE_TIME_FORMATS {
        if let Ok(local) = NaiveDateTime::parse_from_str(value, format) {
            return Some(local);
        }
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    #[test]
    fn test_blank_input_maps_to_none() {
        for field_type in [FieldType::Text, FieldType::Number, FieldType::Checkbox, FieldType::Date] {
            assert_eq!(TypedValue::map(field_type, ""), None);
            assert_eq!(TypedValue::map(field_type, "   \t"), None);
        }
    }

    #[test]
    fn test_text_types_store_verbatim() {
        assert_eq!(
            TypedValue::map(FieldType::Email, "a@b.com"),
            Some(TypedValue::Text("a@b.com".into()))
        );
        assert_eq!(
            TypedValue::map(FieldType::Textarea, "  padded  "),
            Some(TypedValue::Text("  padded  ".into()))
        );
        assert_eq!(
            TypedValue::map(FieldType::Radio, "b"),
            Some(TypedValue::Text("b".into()))
        );
    }

    #[test]
    fn test_number_parse_and_fallback() {
        assert_eq!(TypedValue::map(FieldType::Number, "25"), Some(TypedValue::Number(25.0)));
        assert_eq!(TypedValue::map(FieldType::Number, " -1.5e2 "), Some(TypedValue::Number(-150.0)));
        assert_eq!(
            TypedValue::map(FieldType::Number, "twelve"),
            Some(TypedValue::Text("twelve".into()))
        );
        assert_eq!(
            TypedValue::map(FieldType::Number, "NaN"),
            Some(TypedValue::Text("NaN".into()))
        );
    }

    #[test]
    fn test_date_variants() {
        assert_eq!(
            TypedValue::map(FieldType::Date, "2026-01-15T10:30:00"),
            Some(TypedValue::Timestamp(ts("2026-01-15 10:30:00")))
        );
        assert_eq!(
            TypedValue::map(FieldType::Date, "2026-01-15T10:30"),
            Some(TypedValue::Timestamp(ts("2026-01-15 10:30:00")))
        );
        assert_eq!(
            TypedValue::map(FieldType::Date, "2026-01-15T12:00:00+02:00"),
            Some(TypedValue::Timestamp(ts("2026-01-15 10:00:00")))
        );
        assert_eq!(
            TypedValue::map(FieldType::Date, "2026-01-15"),
            Some(TypedValue::Timestamp(ts("2026-01-15 00:00:00")))
        );
        assert_eq!(
            TypedValue::map(FieldType::Date, "next tuesday"),
            Some(TypedValue::Text("next tuesday".into()))
        );
    }

    #[test]
    fn test_checkbox_truthy_values() {
        for raw in ["on", "1", "yes", "true", "TRUE", " Yes "] {
            assert_eq!(TypedValue::map(FieldType::Checkbox, raw), Some(TypedValue::Boolean(true)));
        }
        for raw in ["false", "no", "0", "off"] {
            assert_eq!(TypedValue::map(FieldType::Checkbox, raw), Some(TypedValue::Boolean(false)));
        }
        assert_eq!(TypedValue::map(FieldType::Checkbox, ""), None);
    }
}
