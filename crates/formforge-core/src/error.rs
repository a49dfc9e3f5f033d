//! Error types for the form engine

use std::collections::BTreeMap;

use thiserror::Error;

use crate::domain::aggregates::FormError;
use crate::ports::outbound::RepositoryError;

/// Caller-facing error taxonomy
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FormsError {
    /// Unknown id or slug, or an owner mismatch that must not leak existence
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("not permitted to access this {0}")]
    Unauthorized(&'static str),

    #[error("{entity} already exists: {key}")]
    Duplicate { entity: &'static str, key: String },

    /// Operation invalid for the current lifecycle state
    #[error("{0}")]
    StateConflict(String),

    /// Carries every per-field message, never just the first
    #[error("{message}")]
    ValidationFailed {
        message: String,
        errors: BTreeMap<String, String>,
    },

    #[error("too many submissions, try again later")]
    RateLimited,

    #[error("internal error: {0}")]
    Internal(String),
}

/// Result type for the form engine
pub type Result<T> = std::result::Result<T, FormsError>;

impl FormsError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn validation(message: impl Into<String>, errors: BTreeMap<String, String>) -> Self {
        Self::ValidationFailed {
            message: message.into(),
            errors,
        }
    }

    /// Single-attribute validation failure
    pub fn invalid_attribute(attribute: &str, message: impl Into<String>) -> Self {
        let message = message.into();
        let mut errors = BTreeMap::new();
        errors.insert(attribute.to_string(), message.clone());
        Self::ValidationFailed { message, errors }
    }
}

impl From<RepositoryError> for FormsError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Duplicate { entity, key } => Self::Duplicate { entity, key },
            RepositoryError::Conflict(message) => Self::StateConflict(message),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<FormError> for FormsError {
    fn from(err: FormError) -> Self {
        Self::StateConflict(err.to_string())
    }
}

/// Blob encoding failures are never the caller's fault
impl From<serde_json::Error> for FormsError {
    fn from(err: serde_json::Error) -> Self {
        Self::Internal(format!("serialization error: {}", err))
    }
}
