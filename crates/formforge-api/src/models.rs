//! API Models

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use formforge_core::{FieldId, FormStatus, PageRequest, ResponseQuery, SubmittedWindow, ValueFilter};
use serde::{Deserialize, Serialize};

/// Standard API response
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<ErrorResponse>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self { success: true, data: Some(data), error: None }
    }

    pub fn error(code: &str, message: &str) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(ErrorResponse {
                code: code.to_string(),
                message: message.to_string(),
                errors: None,
            }),
        }
    }
}

/// Error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    /// Per-attribute messages of a validation failure
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<BTreeMap<String, String>>,
}

// ============ Forms ============

/// `GET /api/forms` query string
#[derive(Debug, Default, Deserialize)]
pub struct ListFormsParams {
    pub status: Option<FormStatus>,
    pub page: Option<usize>,
    pub size: Option<usize>,
}

impl ListFormsParams {
    pub fn page_request(&self) -> PageRequest {
        PageRequest {
            page: self.page.unwrap_or_default(),
            size: self.size,
        }
    }
}

// ============ Responses ============

/// `GET /api/forms/:form_id/responses` query string
#[derive(Debug, Default, Deserialize)]
pub struct ListResponsesParams {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub page: Option<usize>,
    pub size: Option<usize>,
}

impl From<ListResponsesParams> for ResponseQuery {
    fn from(params: ListResponsesParams) -> Self {
        Self {
            window: SubmittedWindow {
                from: params.from,
                to: params.to,
            },
            page: PageRequest {
                page: params.page.unwrap_or_default(),
                size: params.size,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct FilterRequest {
    pub field_id: FieldId,
    pub filter: ValueFilter,
}

// ============ Public ============

/// Respondent submission body. Values may arrive as any JSON scalar or
/// list and are captured as strings.
#[derive(Debug, Default, Deserialize)]
pub struct SubmitRequest {
    #[serde(default)]
    pub values: BTreeMap<String, serde_json::Value>,
    #[serde(default, alias = "_honeypot")]
    pub honeypot: Option<String>,
    #[serde(default, alias = "_loadTimestamp")]
    pub load_timestamp: Option<i64>,
}

impl SubmitRequest {
    pub fn string_values(&self) -> BTreeMap<String, String> {
        self.values
            .iter()
            .filter_map(|(key, value)| stringify(value).map(|value| (key.clone(), value)))
            .collect()
    }
}

fn stringify(value: &serde_json::Value) -> Option<String> {
    use serde_json::Value;

    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(items) => Some(
            items
                .iter()
                .filter_map(stringify)
                .collect::<Vec<_>>()
                .join(","),
        ),
        Value::Object(_) => Some(value.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submit_values_are_stringified() {
        let request: SubmitRequest = serde_json::from_str(
            r#"{"values":{"name":"Ada","age":36,"agree":true,"tags":["a","b"],"gone":null},"_honeypot":""}"#,
        )
        .unwrap();

        let values = request.string_values();
        assert_eq!(values["name"], "Ada");
        assert_eq!(values["age"], "36");
        assert_eq!(values["agree"], "true");
        assert_eq!(values["tags"], "a,b");
        assert!(!values.contains_key("gone"));
        assert_eq!(request.honeypot.as_deref(), Some(""));
    }

    #[test]
    fn test_response_params_convert() {
        let query: ResponseQuery = ListResponsesParams {
            page: Some(2),
            ..Default::default()
        }
        .into();
        assert_eq!(query.page.page, 2);
        assert!(query.page.size.is_none());
        assert!(query.window.from.is_none());
    }
}
