//! Inbound ports (Use case traits)
//!
//! Hexagonal architecture: application service interfaces. Every
//! owner-scoped operation receives the caller identity from the auth
//! collaborator and trusts it.

use async_trait::async_trait;

use crate::application::dto::*;
use crate::domain::aggregates::{Field, Form};
use crate::domain::value_objects::{FieldId, FormId, FormStatus, OwnerId, ResponseId};
use crate::error::Result;

/// Form version lifecycle
#[async_trait]
pub trait FormUseCases: Send + Sync {
    /// New form group at version 1, DRAFT
    async fn create_form(&self, owner_id: OwnerId, command: CreateFormCommand) -> Result<Form>;

    async fn get_form(&self, form_id: FormId, owner_id: OwnerId) -> Result<FormDetails>;

    async fn list_forms(
        &self,
        owner_id: OwnerId,
        status: Option<FormStatus>,
        page: PageRequest,
    ) -> Result<Page<FormSummary>>;

    /// Every version sharing the form's group
    async fn list_versions(&self, form_id: FormId, owner_id: OwnerId) -> Result<Vec<FormSummary>>;

    async fn update_form(
        &self,
        form_id: FormId,
        owner_id: OwnerId,
        command: UpdateFormCommand,
    ) -> Result<Form>;

    /// Idempotent on a DRAFT source
    async fn create_draft(&self, source_form_id: FormId, owner_id: OwnerId) -> Result<Form>;

    /// Archives the live sibling and publishes the draft atomically
    async fn publish_form(&self, form_id: FormId, owner_id: OwnerId) -> Result<Form>;

    async fn archive_form(&self, form_id: FormId, owner_id: OwnerId) -> Result<Form>;

    async fn delete_form(&self, form_id: FormId, owner_id: OwnerId) -> Result<()>;
}

/// Field definitions of one editable form version
#[async_trait]
pub trait FieldUseCases: Send + Sync {
    async fn create_field(&self, form_id: FormId, owner_id: OwnerId, spec: FieldSpec) -> Result<Field>;

    async fn update_field(
        &self,
        form_id: FormId,
        field_id: FieldId,
        owner_id: OwnerId,
        changes: FieldChanges,
    ) -> Result<Field>;

    async fn delete_field(&self, form_id: FormId, field_id: FieldId, owner_id: OwnerId) -> Result<()>;

    /// Applies the given orders; fields not listed keep theirs
    async fn reorder_fields(
        &self,
        form_id: FormId,
        owner_id: OwnerId,
        order: Vec<FieldOrder>,
    ) -> Result<Vec<Field>>;

    async fn list_fields(&self, form_id: FormId, owner_id: OwnerId) -> Result<Vec<Field>>;
}

/// Anonymous respondent surface
#[async_trait]
pub trait SubmissionUseCases: Send + Sync {
    async fn public_form(&self, slug: &str) -> Result<PublicForm>;

    async fn submit(&self, slug: &str, command: SubmissionCommand) -> Result<SubmissionReceipt>;
}

/// Read side over captured responses
#[async_trait]
pub trait ResponseUseCases: Send + Sync {
    async fn list_responses(
        &self,
        form_id: FormId,
        owner_id: OwnerId,
        query: ResponseQuery,
    ) -> Result<Page<ResponseSummary>>;

    async fn get_response(
        &self,
        form_id: FormId,
        response_id: ResponseId,
        owner_id: OwnerId,
    ) -> Result<ResponseDetails>;

    async fn delete_response(
        &self,
        form_id: FormId,
        response_id: ResponseId,
        owner_id: OwnerId,
    ) -> Result<()>;

    async fn export_csv(&self, form_id: FormId, owner_id: OwnerId) -> Result<String>;

    /// Filter using typed rows only, newest submission first
    async fn filter_by_field(
        &self,
        form_id: FormId,
        owner_id: OwnerId,
        field_id: FieldId,
        filter: ValueFilter,
    ) -> Result<Vec<ResponseSummary>>;
}
