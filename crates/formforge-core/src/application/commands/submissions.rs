//! Response capture pipeline
//!
//! throttle -> resolve live form -> anti-automation -> validate ->
//! snapshot -> payload -> typed rows -> persist, all inside one
//! transaction after the throttle.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::application::dto::*;
use crate::application::publish_events;
use crate::domain::aggregates::{FieldValue, Form, Response};
use crate::domain::events::{DomainEvent, ResponseEvent};
use crate::domain::services::{BotDefense, SchemaSnapshot, SubmissionValidator};
use crate::domain::value_objects::{ResponseStatus, Slug, TypedValue};
use crate::error::{FormsError, Result};
use crate::ports::inbound::SubmissionUseCases;
use crate::ports::outbound::{Clock, EventPublisher, RecordStore, SubmissionThrottle, Transaction};

pub const SUBMISSION_ACCEPTED: &str = "Response submitted successfully";

/// Generic message for anti-automation rejections
const INVALID_SUBMISSION: &str = "Invalid submission";

/// Submission application service
pub struct SubmissionService {
    store: Arc<dyn RecordStore>,
    event_publisher: Arc<dyn EventPublisher>,
    clock: Arc<dyn Clock>,
    throttle: Arc<dyn SubmissionThrottle>,
    bot_defense: BotDefense,
    validator: SubmissionValidator,
}

impl SubmissionService {
    pub fn new(
        store: Arc<dyn RecordStore>,
        event_publisher: Arc<dyn EventPublisher>,
        clock: Arc<dyn Clock>,
        throttle: Arc<dyn SubmissionThrottle>,
        bot_defense: BotDefense,
    ) -> Self {
        Self {
            store,
            event_publisher,
            clock,
            throttle,
            bot_defense,
            validator: SubmissionValidator::new(),
        }
    }
}

async fn live_form(tx: &mut dyn Transaction, slug: &str) -> Result<Form> {
    tx.find_published_by_slug(&Slug::from_string(slug))
        .await?
        .ok_or_else(|| FormsError::not_found("form", slug))
}

#[async_trait]
impl SubmissionUseCases for SubmissionService {
    async fn public_form(&self, slug: &str) -> Result<PublicForm> {
        let mut tx = self.store.begin().await?;
        let form = live_form(tx.as_mut(), slug).await?;
        let fields = tx.list_fields(form.id()).await?;

        Ok(PublicForm {
            slug: form.slug().clone(),
            title: form.title().to_string(),
            description: form.description().map(str::to_string),
            settings: form.settings().cloned(),
            fields: fields.into_iter().map(PublicField::from).collect(),
            load_timestamp: self.clock.now().timestamp_millis(),
        })
    }

    async fn submit(&self, slug: &str, command: SubmissionCommand) -> Result<SubmissionReceipt> {
        if !self.throttle.try_acquire(command.origin.as_deref()) {
            warn!(slug, origin = ?command.origin, "submission throttled");
            return Err(FormsError::RateLimited);
        }

        let now = self.clock.now();
        let mut tx = self.store.begin().await?;
        let form = live_form(tx.as_mut(), slug).await?;

        if let Err(signal) =
            self.bot_defense
                .inspect(command.honeypot.as_deref(), command.load_timestamp, now)
        {
            warn!(
                slug,
                origin = ?command.origin,
                signal = signal.as_str(),
                "submission rejected as automated"
            );
            return Err(FormsError::validation(INVALID_SUBMISSION, BTreeMap::new()));
        }

        let fields = tx.list_fields(form.id()).await?;
        let errors = self.validator.validate(&fields, &command.values);
        if !errors.is_empty() {
            return Err(FormsError::validation("Validation failed", errors));
        }

        let schema_snapshot = SchemaSnapshot::encode(&fields)?;
        let payload = serde_json::to_string(&command.values)?;

        let response_id = tx.next_response_id().await?;
        let values: Vec<FieldValue> = fields
            .iter()
            .filter_map(|field| {
                let raw = command.values.get(&field.key)?;
                TypedValue::map(field.field_type, raw).map(|value| FieldValue {
                    response_id,
                    field_id: field.id,
                    value,
                })
            })
            .collect();

        let response = Response {
            id: response_id,
            form_id: form.id(),
            respondent_id: command.respondent_id,
            submission_ip: command.origin,
            status: ResponseStatus::Completed,
            form_version: form.version(),
            payload,
            schema_snapshot,
            submitted_at: now,
            created_at: now,
        };

        tx.insert_response(&response, &values).await?;
        tx.commit().await?;

        info!(
            form_id = %form.id(),
            response_id = %response_id,
            version = form.version(),
            typed_rows = values.len(),
            "response captured"
        );
        publish_events(
            self.event_publisher.as_ref(),
            vec![DomainEvent::Response(ResponseEvent::Submitted {
                response_id,
                form_id: form.id(),
                form_version: form.version(),
                submitted_at: now,
            })],
        )
        .await;

        Ok(SubmissionReceipt {
            response_id,
            message: SUBMISSION_ACCEPTED.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::Arc;

    use super::SUBMISSION_ACCEPTED;
    use crate::application::dto::*;
    use crate::domain::value_objects::{FieldType, OwnerId, TypedValue};
    use crate::error::FormsError;
    use crate::infrastructure::TokenBucketThrottle;
    use crate::test_support::Harness;

    const OWNER: OwnerId = OwnerId::new(1);

    fn values(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[tokio::test]
    async fn test_round_trip_payload_and_typed_rows() {
        let h = Harness::new();
        let form = h
            .published_form(&[("email", FieldType::Email, true), ("age", FieldType::Number, true)])
            .await;

        let receipt = h
            .submit(form.slug().as_str(), &[("email", "a@b.com"), ("age", "25")])
            .await
            .unwrap();
        assert_eq!(receipt.message, SUBMISSION_ACCEPTED);

        let details = h
            .engine
            .responses()
            .get_response(form.id(), receipt.response_id, OWNER)
            .await
            .unwrap();
        assert_eq!(details.values, values(&[("email", "a@b.com"), ("age", "25")]));
        assert_eq!(details.typed_values.len(), 2);

        let fields = h.engine.fields().list_fields(form.id(), OWNER).await.unwrap();
        let typed = |key: &str| {
            let field_id = fields.iter().find(|f| f.key == key).unwrap().id;
            details
                .typed_values
                .iter()
                .find(|v| v.field_id == field_id)
                .unwrap()
                .value
                .clone()
        };
        assert_eq!(typed("email"), TypedValue::Text("a@b.com".into()));
        assert_eq!(typed("age"), TypedValue::Number(25.0));
        assert_eq!(h.events.event_types().last(), Some(&"response.submitted"));
    }

    #[tokio::test]
    async fn test_unknown_keys_stay_in_payload_only() {
        let h = Harness::new();
        let form = h.published_form(&[("name", FieldType::Text, false)]).await;

        let receipt = h
            .submit(form.slug().as_str(), &[("name", "Ada"), ("utm", "mail")])
            .await
            .unwrap();
        let details = h
            .engine
            .responses()
            .get_response(form.id(), receipt.response_id, OWNER)
            .await
            .unwrap();
        assert_eq!(details.values.get("utm").map(String::as_str), Some("mail"));
        assert_eq!(details.typed_values.len(), 1);
    }

    #[tokio::test]
    async fn test_blank_values_get_no_typed_row() {
        let h = Harness::new();
        let form = h
            .published_form(&[("note", FieldType::Textarea, false), ("agree", FieldType::Checkbox, false)])
            .await;

        let receipt = h
            .submit(form.slug().as_str(), &[("note", " "), ("agree", "")])
            .await
            .unwrap();
        let details = h
            .engine
            .responses()
            .get_response(form.id(), receipt.response_id, OWNER)
            .await
            .unwrap();
        assert!(details.typed_values.is_empty());
    }

    #[tokio::test]
    async fn test_checkbox_values() {
        let h = Harness::new();
        let form = h.published_form(&[("agree", FieldType::Checkbox, false)]).await;

        for (raw, expected) in [("on", true), ("1", true), ("yes", true), ("true", true), ("no", false)] {
            let receipt = h.submit(form.slug().as_str(), &[("agree", raw)]).await.unwrap();
            let details = h
                .engine
                .responses()
                .get_response(form.id(), receipt.response_id, OWNER)
                .await
                .unwrap();
            assert_eq!(details.typed_values[0].value, TypedValue::Boolean(expected), "{raw}");
        }
    }

    #[tokio::test]
    async fn test_required_field_missing_reports_key() {
        let h = Harness::new();
        let form = h.published_form(&[("name", FieldType::Text, true)]).await;

        let err = h.submit(form.slug().as_str(), &[]).await.unwrap_err();
        match err {
            FormsError::ValidationFailed { errors, .. } => {
                assert_eq!(errors.get("name").map(String::as_str), Some("name is required"));
            }
            other => panic!("unexpected {other:?}"),
        }
        let page = h
            .engine
            .responses()
            .list_responses(form.id(), OWNER, ResponseQuery::default())
            .await
            .unwrap();
        assert_eq!(page.total, 0);
    }

    #[tokio::test]
    async fn test_all_field_errors_reported_together() {
        let h = Harness::new();
        let form = h
            .published_form(&[
                ("email", FieldType::Email, true),
                ("age", FieldType::Number, false),
                ("name", FieldType::Text, true),
            ])
            .await;

        let err = h
            .submit(form.slug().as_str(), &[("email", "not-an-email"), ("age", "abc")])
            .await
            .unwrap_err();
        match err {
            FormsError::ValidationFailed { errors, .. } => {
                assert_eq!(errors.len(), 3);
                assert_eq!(errors["email"], "Invalid email format");
                assert_eq!(errors["age"], "Must be a valid number");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_only_published_forms_accept_submissions() {
        let h = Harness::new();
        let draft = h.create_form(OWNER, "Draft only").await;
        let err = h.submit(draft.slug().as_str(), &[]).await.unwrap_err();
        assert!(matches!(err, FormsError::NotFound { .. }));

        let live = h.published_form(&[]).await;
        h.engine.forms().archive_form(live.id(), OWNER).await.unwrap();
        let err = h.submit(live.slug().as_str(), &[]).await.unwrap_err();
        assert!(matches!(err, FormsError::NotFound { .. }));

        let err = h.submit("no-such-form-abc123", &[]).await.unwrap_err();
        assert!(matches!(err, FormsError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_fill_time_threshold() {
        let h = Harness::new();
        let form = h.published_form(&[]).await;
        let slug = form.slug().as_str();
        let now_ms = h.clock_ms();

        let instant = SubmissionCommand {
            load_timestamp: Some(now_ms),
            ..Default::default()
        };
        let err = h.engine.submissions().submit(slug, instant).await.unwrap_err();
        assert_eq!(
            err,
            FormsError::ValidationFailed {
                message: "Invalid submission".into(),
                errors: BTreeMap::new()
            }
        );

        let patient = SubmissionCommand {
            load_timestamp: Some(now_ms - 5000),
            ..Default::default()
        };
        assert!(h.engine.submissions().submit(slug, patient).await.is_ok());

        let no_timestamp = SubmissionCommand::default();
        assert!(h.engine.submissions().submit(slug, no_timestamp).await.is_ok());
    }

    #[tokio::test]
    async fn test_honeypot_rejected_generically() {
        let h = Harness::new();
        let form = h.published_form(&[]).await;

        let command = SubmissionCommand {
            honeypot: Some("http://spam.example".into()),
            load_timestamp: Some(h.clock_ms() - 10_000),
            ..Default::default()
        };
        let err = h
            .engine
            .submissions()
            .submit(form.slug().as_str(), command)
            .await
            .unwrap_err();
        match err {
            FormsError::ValidationFailed { message, errors } => {
                assert_eq!(message, "Invalid submission");
                assert!(errors.is_empty());
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_snapshot_survives_field_changes() {
        let h = Harness::new();
        let v1 = h.published_form(&[("name", FieldType::Text, true)]).await;
        let receipt = h.submit(v1.slug().as_str(), &[("name", "Ada")]).await.unwrap();

        let v2 = h.engine.forms().create_draft(v1.id(), OWNER).await.unwrap();
        let fields = h.engine.fields().list_fields(v2.id(), OWNER).await.unwrap();
        h.engine
            .fields()
            .delete_field(v2.id(), fields[0].id, OWNER)
            .await
            .unwrap();
        h.add_field(v2.id(), "city", FieldType::Text, false).await;
        h.engine.forms().publish_form(v2.id(), OWNER).await.unwrap();

        let details = h
            .engine
            .responses()
            .get_response(v1.id(), receipt.response_id, OWNER)
            .await
            .unwrap();
        assert_eq!(details.summary.form_version, 1);
        assert_eq!(details.schema.len(), 1);
        assert_eq!(details.schema[0].field_key, "name");
        assert_eq!(details.typed_values.len(), 1);

        // New submissions land on version 2
        let receipt = h.submit(v1.slug().as_str(), &[("city", "Lagos")]).await.unwrap();
        let details = h
            .engine
            .responses()
            .get_response(v2.id(), receipt.response_id, OWNER)
            .await
            .unwrap();
        assert_eq!(details.summary.form_version, 2);
        assert_eq!(details.schema[0].field_key, "city");
    }

    #[tokio::test]
    async fn test_soft_deleted_field_keeps_typed_rows() {
        let h = Harness::new();
        let form = h.create_form(OWNER, "Survey").await;
        let field = h.add_field(form.id(), "age", FieldType::Number, false).await;
        h.engine.forms().publish_form(form.id(), OWNER).await.unwrap();
        let receipt = h.submit(form.slug().as_str(), &[("age", "40")]).await.unwrap();

        // Deleting the field on a new draft leaves the published version's rows alone
        let draft = h.engine.forms().create_draft(form.id(), OWNER).await.unwrap();
        let copied = h.engine.fields().list_fields(draft.id(), OWNER).await.unwrap();
        h.engine
            .fields()
            .delete_field(draft.id(), copied[0].id, OWNER)
            .await
            .unwrap();

        let details = h
            .engine
            .responses()
            .get_response(form.id(), receipt.response_id, OWNER)
            .await
            .unwrap();
        assert_eq!(details.typed_values[0].field_id, field.id);
    }

    #[tokio::test]
    async fn test_throttle_rejects_before_pipeline() {
        let h = Harness::with_throttle(|clock| Arc::new(TokenBucketThrottle::new(1, 1, clock)));
        let form = h.published_form(&[]).await;

        let command = || SubmissionCommand {
            origin: Some("203.0.113.9".into()),
            ..Default::default()
        };
        let submissions = h.engine.submissions();
        assert!(submissions.submit(form.slug().as_str(), command()).await.is_ok());
        assert_eq!(
            submissions.submit(form.slug().as_str(), command()).await.unwrap_err(),
            FormsError::RateLimited
        );
    }

    #[tokio::test]
    async fn test_public_form_view() {
        let h = Harness::new();
        let form = h
            .published_form(&[("name", FieldType::Text, true), ("age", FieldType::Number, false)])
            .await;

        let view = h.engine.submissions().public_form(form.slug().as_str()).await.unwrap();
        assert_eq!(view.slug, *form.slug());
        assert_eq!(view.fields.len(), 2);
        assert_eq!(view.fields[0].key, "name");
        assert_eq!(view.load_timestamp, h.clock_ms());
    }
}
