//! Form version lifecycle

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::application::dto::*;
use crate::application::{owned_form, publish_events};
use crate::config::PagingConfig;
use crate::domain::aggregates::{Form, FormError};
use crate::domain::services::RequestRules;
use crate::domain::value_objects::{FormId, FormStatus, OwnerId, SlugGenerator};
use crate::error::Result;
use crate::ports::inbound::FormUseCases;
use crate::ports::outbound::{Clock, EventPublisher, RecordStore, Transaction};

/// Form application service
pub struct FormService {
    store: Arc<dyn RecordStore>,
    event_publisher: Arc<dyn EventPublisher>,
    clock: Arc<dyn Clock>,
    slugs: SlugGenerator,
    paging: PagingConfig,
}

impl FormService {
    pub fn new(
        store: Arc<dyn RecordStore>,
        event_publisher: Arc<dyn EventPublisher>,
        clock: Arc<dyn Clock>,
        slugs: SlugGenerator,
        paging: PagingConfig,
    ) -> Self {
        Self {
            store,
            event_publisher,
            clock,
            slugs,
            paging,
        }
    }

    async fn summarize(tx: &mut dyn Transaction, form: &Form) -> Result<FormSummary> {
        let field_count = tx.list_fields(form.id()).await?.len();
        let response_count = tx.count_responses(form.id()).await?;
        Ok(FormSummary::from_form(form, field_count, response_count))
    }
}

#[async_trait]
impl FormUseCases for FormService {
    async fn create_form(&self, owner_id: OwnerId, command: CreateFormCommand) -> Result<Form> {
        RequestRules::form_details(Some(&command.title), command.description.as_deref(), true)?;

        let now = self.clock.now();
        let mut tx = self.store.begin().await?;

        let id = tx.next_form_id().await?;
        let slug = self.slugs.generate(&command.title);
        let mut form = Form::create(
            id,
            owner_id,
            command.title,
            command.description,
            command.settings,
            slug,
            now,
        );
        let events = form.take_events();

        tx.insert_form(&form).await?;
        tx.commit().await?;

        info!(form_id = %form.id(), slug = %form.slug(), "form created");
        publish_events(self.event_publisher.as_ref(), events).await;
        Ok(form)
    }

    async fn get_form(&self, form_id: FormId, owner_id: OwnerId) -> Result<FormDetails> {
        let mut tx = self.store.begin().await?;
        let form = owned_form(tx.as_mut(), form_id, owner_id).await?;
        let fields = tx.list_fields(form_id).await?;
        Ok(FormDetails { form, fields })
    }

    async fn list_forms(
        &self,
        owner_id: OwnerId,
        status: Option<FormStatus>,
        page: PageRequest,
    ) -> Result<Page<FormSummary>> {
        let size = page.resolve_size(&self.paging);
        let mut tx = self.store.begin().await?;

        let forms = tx.list_forms(owner_id, status).await?;
        let total = forms.len();

        let mut items = Vec::with_capacity(size);
        for form in forms.iter().skip(page.page.saturating_mul(size)).take(size) {
            items.push(Self::summarize(tx.as_mut(), form).await?);
        }
        Ok(Page::new(items, total, page.page, size))
    }

    async fn list_versions(&self, form_id: FormId, owner_id: OwnerId) -> Result<Vec<FormSummary>> {
        let mut tx = self.store.begin().await?;
        let form = owned_form(tx.as_mut(), form_id, owner_id).await?;

        let mut versions = Vec::new();
        for version in tx.list_group(form.group_id()).await? {
            versions.push(Self::summarize(tx.as_mut(), &version).await?);
        }
        Ok(versions)
    }

    async fn update_form(
        &self,
        form_id: FormId,
        owner_id: OwnerId,
        command: UpdateFormCommand,
    ) -> Result<Form> {
        RequestRules::form_details(command.title.as_deref(), command.description.as_deref(), false)?;

        let now = self.clock.now();
        let mut tx = self.store.begin().await?;
        let mut form = owned_form(tx.as_mut(), form_id, owner_id).await?;

        form.update_details(command.title, command.description, command.settings, now)?;
        let events = form.take_events();

        tx.update_form(&form).await?;
        tx.commit().await?;

        info!(form_id = %form_id, slug = %form.slug(), "form updated");
        publish_events(self.event_publisher.as_ref(), events).await;
        Ok(form)
    }

    async fn create_draft(&self, source_form_id: FormId, owner_id: OwnerId) -> Result<Form> {
        let now = self.clock.now();
        let mut tx = self.store.begin().await?;
        let source = owned_form(tx.as_mut(), source_form_id, owner_id).await?;

        if source.status() == FormStatus::Draft {
            return Ok(source);
        }

        let version = tx.max_version(source.group_id()).await? + 1;
        let id = tx.next_form_id().await?;
        let mut draft = source.clone_as_draft(id, version, now);
        let events = draft.take_events();
        tx.insert_form(&draft).await?;

        let fields = tx.list_fields(source.id()).await?;
        for field in &fields {
            let field_id = tx.next_field_id().await?;
            tx.insert_field(&field.copy_to(id, field_id, now)).await?;
        }
        tx.commit().await?;

        info!(
            form_id = %id,
            source_form_id = %source_form_id,
            version,
            fields = fields.len(),
            "draft created"
        );
        publish_events(self.event_publisher.as_ref(), events).await;
        Ok(draft)
    }

    async fn publish_form(&self, form_id: FormId, owner_id: OwnerId) -> Result<Form> {
        let now = self.clock.now();
        let mut tx = self.store.begin().await?;
        let mut form = owned_form(tx.as_mut(), form_id, owner_id).await?;

        match form.status() {
            FormStatus::Published => return Ok(form),
            FormStatus::Archived => return Err(FormError::NotDraft(FormStatus::Archived).into()),
            FormStatus::Draft => {}
        }

        // Soft-deleted versions keep PUBLISHED and must be retired as well
        let mut events = Vec::new();
        let mut archived = None;
        for mut live in tx.published_rows(form.group_id(), form.slug()).await? {
            if live.group_id() != form.group_id() {
                warn!(
                    live_form_id = %live.id(),
                    form_id = %form_id,
                    slug = %form.slug(),
                    "slug shared across form groups"
                );
            }
            live.archive(now);
            events.extend(live.take_events());
            tx.update_form(&live).await?;
            if archived.is_none() || !live.is_deleted() {
                archived = Some(live.id());
            }
        }

        form.publish(archived, now)?;
        events.extend(form.take_events());
        tx.update_form(&form).await?;
        tx.commit().await?;

        info!(
            form_id = %form_id,
            slug = %form.slug(),
            version = form.version(),
            archived = ?archived.map(|id| id.value()),
            "form published"
        );
        publish_events(self.event_publisher.as_ref(), events).await;
        Ok(form)
    }

    async fn archive_form(&self, form_id: FormId, owner_id: OwnerId) -> Result<Form> {
        let now = self.clock.now();
        let mut tx = self.store.begin().await?;
        let mut form = owned_form(tx.as_mut(), form_id, owner_id).await?;

        form.archive(now);
        let events = form.take_events();
        tx.update_form(&form).await?;
        tx.commit().await?;

        info!(form_id = %form_id, slug = %form.slug(), "form archived");
        publish_events(self.event_publisher.as_ref(), events).await;
        Ok(form)
    }

    async fn delete_form(&self, form_id: FormId, owner_id: OwnerId) -> Result<()> {
        let now = self.clock.now();
        let mut tx = self.store.begin().await?;
        let mut form = owned_form(tx.as_mut(), form_id, owner_id).await?;

        form.mark_deleted(now);
        let events = form.take_events();
        tx.update_form(&form).await?;
        tx.commit().await?;

        info!(form_id = %form_id, slug = %form.slug(), "form deleted");
        publish_events(self.event_publisher.as_ref(), events).await;
        Ok(())
    }
}
