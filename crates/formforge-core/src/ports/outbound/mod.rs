//! Outbound ports
//!
//! Hexagonal architecture: these are the interfaces that infrastructure must implement.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::aggregates::{Field, FieldValue, Form, Response};
use crate::domain::value_objects::{
    FieldId, FormGroupId, FormId, FormStatus, OwnerId, ResponseId, Slug, TypedValue,
};
use crate::domain::DomainEvent;

/// Repository result type
pub type RepoResult<T> = Result<T, RepositoryError>;

/// Transactional record store.
///
/// Every engine operation runs inside exactly one transaction. Dropping a
/// transaction without calling [`Transaction::commit`] rolls it back.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn begin(&self) -> RepoResult<Box<dyn Transaction>>;
}

/// One isolated unit of work.
///
/// Lookups exclude soft-deleted forms and fields. Implementations must
/// reject writes that would leave two PUBLISHED forms sharing a slug or a
/// group, a duplicate (group, version) pair, a duplicate active field key,
/// or a duplicate (response, field) typed row.
#[async_trait]
pub trait Transaction: Send {
    // Forms

    async fn next_form_id(&mut self) -> RepoResult<FormId>;

    async fn insert_form(&mut self, form: &Form) -> RepoResult<()>;

    async fn update_form(&mut self, form: &Form) -> RepoResult<()>;

    async fn find_form(&mut self, id: FormId) -> RepoResult<Option<Form>>;

    async fn find_published_by_slug(&mut self, slug: &Slug) -> RepoResult<Option<Form>>;

    /// Every PUBLISHED row sharing the group or slug, deleted rows included
    async fn published_rows(&mut self, group_id: FormGroupId, slug: &Slug) -> RepoResult<Vec<Form>>;

    /// Highest version in the group, deleted rows included
    async fn max_version(&mut self, group_id: FormGroupId) -> RepoResult<i32>;

    /// Newest first
    async fn list_forms(
        &mut self,
        owner_id: OwnerId,
        status: Option<FormStatus>,
    ) -> RepoResult<Vec<Form>>;

    /// Ascending by version
    async fn list_group(&mut self, group_id: FormGroupId) -> RepoResult<Vec<Form>>;

    // Fields

    async fn next_field_id(&mut self) -> RepoResult<FieldId>;

    async fn insert_field(&mut self, field: &Field) -> RepoResult<()>;

    async fn update_field(&mut self, field: &Field) -> RepoResult<()>;

    async fn find_field(&mut self, form_id: FormId, field_id: FieldId) -> RepoResult<Option<Field>>;

    /// Active fields ascending by display order
    async fn list_fields(&mut self, form_id: FormId) -> RepoResult<Vec<Field>>;

    /// Zero when the form has no active field
    async fn max_display_order(&mut self, form_id: FormId) -> RepoResult<i32>;

    async fn key_exists(&mut self, form_id: FormId, key: &str) -> RepoResult<bool>;

    // Responses

    async fn next_response_id(&mut self) -> RepoResult<ResponseId>;

    /// Response row and its typed rows in one write
    async fn insert_response(&mut self, response: &Response, values: &[FieldValue]) -> RepoResult<()>;

    async fn find_response(
        &mut self,
        form_id: FormId,
        response_id: ResponseId,
    ) -> RepoResult<Option<Response>>;

    /// One page, newest submission first, plus the unpaged total
    async fn list_responses(
        &mut self,
        form_id: FormId,
        window: &SubmittedWindow,
        offset: usize,
        limit: usize,
    ) -> RepoResult<(Vec<Response>, usize)>;

    /// Newest submission first
    async fn all_responses(&mut self, form_id: FormId) -> RepoResult<Vec<Response>>;

    async fn count_responses(&mut self, form_id: FormId) -> RepoResult<usize>;

    /// Hard delete; typed rows go with it
    async fn delete_response(&mut self, response_id: ResponseId) -> RepoResult<()>;

    async fn field_values(&mut self, response_id: ResponseId) -> RepoResult<Vec<FieldValue>>;

    async fn query_field_values(
        &mut self,
        field_id: FieldId,
        filter: &ValueFilter,
    ) -> RepoResult<Vec<FieldValue>>;

    async fn commit(self: Box<Self>) -> RepoResult<()>;
}

/// Inclusive submitted-at bounds
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SubmittedWindow {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl SubmittedWindow {
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.from.map_or(true, |from| at >= from) && self.to.map_or(true, |to| at <= to)
    }
}

/// Predicate over typed rows of one field. Ranges are inclusive.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValueFilter {
    TextContains { value: String },
    NumberRange { min: Option<f64>, max: Option<f64> },
    TimestampRange {
        from: Option<NaiveDateTime>,
        to: Option<NaiveDateTime>,
    },
    Boolean { value: bool },
}

impl ValueFilter {
    pub fn matches(&self, value: &TypedValue) -> bool {
        match (self, value) {
            (Self::TextContains { value: needle }, TypedValue::Text(text)) => text.contains(needle.as_str()),
            (Self::NumberRange { min, max }, TypedValue::Number(n)) => {
                min.map_or(true, |min| *n >= min) && max.map_or(true, |max| *n <= max)
            }
            (Self::TimestampRange { from, to }, TypedValue::Timestamp(ts)) => {
                from.map_or(true, |from| *ts >= from) && to.map_or(true, |to| *ts <= to)
            }
            (Self::Boolean { value: wanted }, TypedValue::Boolean(flag)) => wanted == flag,
            _ => false,
        }
    }
}

/// Time source
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Submission rate policy, consulted before a submission reaches the store
pub trait SubmissionThrottle: Send + Sync {
    /// `origin` is the client network address when the transport knows it
    fn try_acquire(&self, origin: Option<&str>) -> bool;
}

/// Event publisher port
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish domain events
    async fn publish(&self, events: Vec<DomainEvent>) -> RepoResult<()>;
}

/// Repository error type
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RepositoryError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("duplicate {entity}: {key}")]
    Duplicate { entity: &'static str, key: String },

    #[error("storage error: {0}")]
    Storage(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    #[test]
    fn test_window_bounds_are_inclusive() {
        let now = Utc::now();
        let window = SubmittedWindow {
            from: Some(now),
            to: Some(now + Duration::seconds(10)),
        };
        assert!(window.contains(now));
        assert!(window.contains(now + Duration::seconds(10)));
        assert!(!window.contains(now - Duration::seconds(1)));
        assert!(SubmittedWindow::default().contains(now));
    }

    #[test]
    fn test_filters_only_match_their_slot() {
        let range = ValueFilter::NumberRange {
            min: Some(18.0),
            max: Some(30.0),
        };
        assert!(range.matches(&TypedValue::Number(18.0)));
        assert!(range.matches(&TypedValue::Number(30.0)));
        assert!(!range.matches(&TypedValue::Number(31.0)));
        assert!(!range.matches(&TypedValue::Text("25".into())));

        let contains = ValueFilter::TextContains { value: "example".into() };
        assert!(contains.matches(&TypedValue::Text("a@example.com".into())));
        assert!(!contains.matches(&TypedValue::Boolean(true)));

        let day = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
        let since = ValueFilter::TimestampRange { from: Some(day), to: None };
        assert!(since.matches(&TypedValue::Timestamp(day)));

        let checked = ValueFilter::Boolean { value: true };
        assert!(checked.matches(&TypedValue::Boolean(true)));
        assert!(!checked.matches(&TypedValue::Boolean(false)));
    }

    #[test]
    fn test_filter_wire_format() {
        let filter: ValueFilter =
            serde_json::from_str(r#"{"kind":"number_range","min":1.5,"max":null}"#).unwrap();
        assert_eq!(filter, ValueFilter::NumberRange { min: Some(1.5), max: None });
    }
}
