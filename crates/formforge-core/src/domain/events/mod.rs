//! Domain Events
//!
//! Events raised by aggregates and services to communicate state changes.
//! They are published only after the owning transaction commits.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::value_objects::{FormGroupId, FormId, OwnerId, ResponseId, Slug};

/// All domain events in the forms bounded context
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DomainEvent {
    Form(FormEvent),
    Response(ResponseEvent),
}

/// Form lifecycle events
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum FormEvent {
    Created {
        form_id: FormId,
        group_id: FormGroupId,
        slug: Slug,
        owner_id: OwnerId,
        created_at: DateTime<Utc>,
    },

    DraftCreated {
        form_id: FormId,
        source_form_id: FormId,
        version: i32,
        created_at: DateTime<Utc>,
    },

    Published {
        form_id: FormId,
        slug: Slug,
        version: i32,
        /// Previously live sibling, archived in the same transaction
        archived: Option<FormId>,
        published_at: DateTime<Utc>,
    },

    Archived {
        form_id: FormId,
        archived_at: DateTime<Utc>,
    },

    Updated {
        form_id: FormId,
        updated_at: DateTime<Utc>,
    },

    Deleted {
        form_id: FormId,
        deleted_at: DateTime<Utc>,
    },
}

/// Response capture events
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum ResponseEvent {
    Submitted {
        response_id: ResponseId,
        form_id: FormId,
        form_version: i32,
        submitted_at: DateTime<Utc>,
    },

    Deleted {
        response_id: ResponseId,
        form_id: FormId,
    },
}

impl DomainEvent {
    /// Numeric id of the aggregate the event belongs to
    pub fn aggregate_id(&self) -> i64 {
        match self {
            DomainEvent::Form(e) => match e {
                FormEvent::Created { form_id, .. }
                | FormEvent::DraftCreated { form_id, .. }
                | FormEvent::Published { form_id, .. }
                | FormEvent::Archived { form_id, .. }
                | FormEvent::Updated { form_id, .. }
                | FormEvent::Deleted { form_id, .. } => form_id.value(),
            },
            DomainEvent::Response(e) => match e {
                ResponseEvent::Submitted { response_id, .. }
                | ResponseEvent::Deleted { response_id, .. } => response_id.value(),
            },
        }
    }

    /// Get event type name
    pub fn event_type(&self) -> &'static str {
        match self {
            DomainEvent::Form(e) => match e {
                FormEvent::Created { .. } => "form.created",
                FormEvent::DraftCreated { .. } => "form.draft_created",
                FormEvent::Published { .. } => "form.published",
                FormEvent::Archived { .. } => "form.archived",
                FormEvent::Updated { .. } => "form.updated",
                FormEvent::Deleted { .. } => "form.deleted",
            },
            DomainEvent::Response(e) => match e {
                ResponseEvent::Submitted { .. } => "response.submitted",
                ResponseEvent::Deleted { .. } => "response.deleted",
            },
        }
    }
}
