//! Captured response reads, export and deletion

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::application::dto::*;
use crate::application::{publish_events, visible_form};
use crate::config::PagingConfig;
use crate::domain::aggregates::Response;
use crate::domain::events::{DomainEvent, ResponseEvent};
use crate::domain::services::CsvExporter;
use crate::domain::value_objects::{FieldId, FormId, OwnerId, ResponseId};
use crate::error::{FormsError, Result};
use crate::ports::inbound::ResponseUseCases;
use crate::ports::outbound::{EventPublisher, RecordStore, Transaction};

/// Response query service
pub struct ResponseService {
    store: Arc<dyn RecordStore>,
    event_publisher: Arc<dyn EventPublisher>,
    paging: PagingConfig,
}

impl ResponseService {
    pub fn new(
        store: Arc<dyn RecordStore>,
        event_publisher: Arc<dyn EventPublisher>,
        paging: PagingConfig,
    ) -> Self {
        Self {
            store,
            event_publisher,
            paging,
        }
    }
}

async fn owned_response(
    tx: &mut dyn Transaction,
    form_id: FormId,
    response_id: ResponseId,
    owner_id: OwnerId,
) -> Result<Response> {
    visible_form(tx, form_id, owner_id).await?;
    tx.find_response(form_id, response_id)
        .await?
        .ok_or_else(|| FormsError::not_found("response", response_id))
}

#[async_trait]
impl ResponseUseCases for ResponseService {
    async fn list_responses(
        &self,
        form_id: FormId,
        owner_id: OwnerId,
        query: ResponseQuery,
    ) -> Result<Page<ResponseSummary>> {
        let mut tx = self.store.begin().await?;
        visible_form(tx.as_mut(), form_id, owner_id).await?;

        let size = query.page.resolve_size(&self.paging);
        let offset = query.page.page.saturating_mul(size);
        let (responses, total) = tx
            .list_responses(form_id, &query.window, offset, size)
            .await?;

        let items = responses.iter().map(ResponseSummary::from).collect();
        Ok(Page::new(items, total, query.page.page, size))
    }

    async fn get_response(
        &self,
        form_id: FormId,
        response_id: ResponseId,
        owner_id: OwnerId,
    ) -> Result<ResponseDetails> {
        let mut tx = self.store.begin().await?;
        let response = owned_response(tx.as_mut(), form_id, response_id, owner_id).await?;
        let typed_values = tx.field_values(response_id).await?;

        Ok(ResponseDetails {
            summary: ResponseSummary::from(&response),
            respondent_id: response.respondent_id,
            values: response.decode_payload()?,
            schema: response.decode_snapshot()?,
            typed_values,
        })
    }

    async fn delete_response(
        &self,
        form_id: FormId,
        response_id: ResponseId,
        owner_id: OwnerId,
    ) -> Result<()> {
        let mut tx = self.store.begin().await?;
        owned_response(tx.as_mut(), form_id, response_id, owner_id).await?;

        tx.delete_response(response_id).await?;
        tx.commit().await?;

        info!(form_id = %form_id, response_id = %response_id, "response deleted");
        publish_events(
            self.event_publisher.as_ref(),
            vec![DomainEvent::Response(ResponseEvent::Deleted { response_id, form_id })],
        )
        .await;
        Ok(())
    }

    async fn export_csv(&self, form_id: FormId, owner_id: OwnerId) -> Result<String> {
        let mut tx = self.store.begin().await?;
        visible_form(tx.as_mut(), form_id, owner_id).await?;

        let responses = tx.all_responses(form_id).await?;
        debug!(form_id = %form_id, rows = responses.len(), "exporting responses");
        CsvExporter::export(&responses)
    }

    async fn filter_by_field(
        &self,
        form_id: FormId,
        owner_id: OwnerId,
        field_id: FieldId,
        filter: ValueFilter,
    ) -> Result<Vec<ResponseSummary>> {
        let mut tx = self.store.begin().await?;
        visible_form(tx.as_mut(), form_id, owner_id).await?;
        tx.find_field(form_id, field_id)
            .await?
            .ok_or_else(|| FormsError::not_found("field", field_id))?;

        let mut matched = Vec::new();
        for row in tx.query_field_values(field_id, &filter).await? {
            if let Some(response) = tx.find_response(form_id, row.response_id).await? {
                matched.push(response);
            }
        }
        matched.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at).then(b.id.cmp(&a.id)));

        Ok(matched.iter().map(ResponseSummary::from).collect())
    }
}
