//! Field definitions of an editable form version

use std::sync::Arc;

use async_trait::async_trait;
use regex::Regex;
use tracing::info;

use crate::application::dto::*;
use crate::application::visible_form;
use crate::domain::aggregates::{Field, Form};
use crate::domain::services::RequestRules;
use crate::domain::value_objects::{FieldId, FormId, OwnerId};
use crate::error::{FormsError, Result};
use crate::ports::inbound::FieldUseCases;
use crate::ports::outbound::{Clock, RecordStore, Transaction};

/// Field application service
pub struct FieldService {
    store: Arc<dyn RecordStore>,
    clock: Arc<dyn Clock>,
    key_pattern: Regex,
}

impl FieldService {
    pub fn new(store: Arc<dyn RecordStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            key_pattern: RequestRules::key_pattern(),
        }
    }
}

async fn editable_form(tx: &mut dyn Transaction, form_id: FormId, owner_id: OwnerId) -> Result<Form> {
    let form = visible_form(tx, form_id, owner_id).await?;
    form.ensure_editable()?;
    Ok(form)
}

async fn active_field(tx: &mut dyn Transaction, form_id: FormId, field_id: FieldId) -> Result<Field> {
    tx.find_field(form_id, field_id)
        .await?
        .ok_or_else(|| FormsError::not_found("field", field_id))
}

#[async_trait]
impl FieldUseCases for FieldService {
    async fn create_field(&self, form_id: FormId, owner_id: OwnerId, spec: FieldSpec) -> Result<Field> {
        RequestRules::field_spec(&spec, &self.key_pattern)?;

        let now = self.clock.now();
        let mut tx = self.store.begin().await?;
        editable_form(tx.as_mut(), form_id, owner_id).await?;

        if tx.key_exists(form_id, &spec.key).await? {
            return Err(FormsError::Duplicate {
                entity: "field",
                key: spec.key,
            });
        }

        let display_order = tx.max_display_order(form_id).await? + 1;
        let id = tx.next_field_id().await?;
        let field = Field::define(id, form_id, spec, display_order, now);

        tx.insert_field(&field).await?;
        tx.commit().await?;

        info!(form_id = %form_id, field_id = %id, key = %field.key, "field created");
        Ok(field)
    }

    async fn update_field(
        &self,
        form_id: FormId,
        field_id: FieldId,
        owner_id: OwnerId,
        changes: FieldChanges,
    ) -> Result<Field> {
        RequestRules::field_changes(&changes)?;

        let now = self.clock.now();
        let mut tx = self.store.begin().await?;
        editable_form(tx.as_mut(), form_id, owner_id).await?;

        let mut field = active_field(tx.as_mut(), form_id, field_id).await?;
        field.apply(changes, now);

        tx.update_field(&field).await?;
        tx.commit().await?;

        info!(form_id = %form_id, field_id = %field_id, key = %field.key, "field updated");
        Ok(field)
    }

    async fn delete_field(&self, form_id: FormId, field_id: FieldId, owner_id: OwnerId) -> Result<()> {
        let now = self.clock.now();
        let mut tx = self.store.begin().await?;
        editable_form(tx.as_mut(), form_id, owner_id).await?;

        let mut field = active_field(tx.as_mut(), form_id, field_id).await?;
        field.mark_deleted(now);

        tx.update_field(&field).await?;
        tx.commit().await?;

        info!(form_id = %form_id, field_id = %field_id, key = %field.key, "field deleted");
        Ok(())
    }

    async fn reorder_fields(
        &self,
        form_id: FormId,
        owner_id: OwnerId,
        order: Vec<FieldOrder>,
    ) -> Result<Vec<Field>> {
        let now = self.clock.now();
        let mut tx = self.store.begin().await?;
        editable_form(tx.as_mut(), form_id, owner_id).await?;

        for item in &order {
            let mut field = active_field(tx.as_mut(), form_id, item.field_id).await?;
            field.display_order = item.display_order;
            field.updated_at = now;
            tx.update_field(&field).await?;
        }

        let fields = tx.list_fields(form_id).await?;
        tx.commit().await?;

        info!(form_id = %form_id, moved = order.len(), "fields reordered");
        Ok(fields)
    }

    async fn list_fields(&self, form_id: FormId, owner_id: OwnerId) -> Result<Vec<Field>> {
        let mut tx = self.store.begin().await?;
        visible_form(tx.as_mut(), form_id, owner_id).await?;
        Ok(tx.list_fields(form_id).await?)
    }
}
