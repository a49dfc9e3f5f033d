//! Application layer
//!
//! Orchestrates use cases and coordinates domain objects. Each use case
//! runs in exactly one store transaction; events are published only after
//! it commits.

pub mod commands;
pub mod queries;
pub mod dto;

pub use commands::{FieldService, FormService, SubmissionService};
pub use dto::*;
pub use queries::ResponseService;

use crate::domain::aggregates::Form;
use crate::domain::value_objects::{FormId, OwnerId};
use crate::domain::DomainEvent;
use crate::error::{FormsError, Result};
use crate::ports::outbound::{EventPublisher, Transaction};

/// Lifecycle lookup: a form owned by someone else is reported as such
pub(crate) async fn owned_form(
    tx: &mut dyn Transaction,
    form_id: FormId,
    owner_id: OwnerId,
) -> Result<Form> {
    let form = tx
        .find_form(form_id)
        .await?
        .ok_or_else(|| FormsError::not_found("form", form_id))?;

    if !form.is_owned_by(owner_id) {
        tracing::warn!(form_id = %form_id, owner_id = %owner_id, "form access denied");
        return Err(FormsError::Unauthorized("form"));
    }
    Ok(form)
}

/// Field and response lookup: a foreign form does not exist for the caller
pub(crate) async fn visible_form(
    tx: &mut dyn Transaction,
    form_id: FormId,
    owner_id: OwnerId,
) -> Result<Form> {
    tx.find_form(form_id)
        .await?
        .filter(|form| form.is_owned_by(owner_id))
        .ok_or_else(|| FormsError::not_found("form", form_id))
}

/// Publish after commit; a publisher failure cannot undo the write
pub(crate) async fn publish_events(publisher: &dyn EventPublisher, events: Vec<DomainEvent>) {
    if events.is_empty() {
        return;
    }
    if let Err(err) = publisher.publish(events).await {
        tracing::warn!(error = %err, "failed to publish domain events");
    }
}
