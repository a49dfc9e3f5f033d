//! In-memory record store
//!
//! A transaction holds the whole store lock from `begin` until it is
//! committed or dropped, so transactions are serializable. Writes go
//! straight to the tables and record their previous value in an undo log;
//! dropping an uncommitted transaction replays the log in reverse.
//! Id sequences are not rolled back.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::domain::aggregates::{Field, FieldValue, Form, Response};
use crate::domain::value_objects::{
    FieldId, FormGroupId, FormId, FormStatus, OwnerId, ResponseId, Slug, TypedValue,
};
use crate::ports::outbound::{
    RecordStore, RepoResult, RepositoryError, SubmittedWindow, Transaction, ValueFilter,
};

#[derive(Default)]
struct Tables {
    forms: BTreeMap<FormId, Form>,
    fields: BTreeMap<FieldId, Field>,
    responses: BTreeMap<ResponseId, Response>,
    /// EAV rows keyed by (response, field)
    values: BTreeMap<(ResponseId, FieldId), TypedValue>,
    /// Secondary index for per-field scans
    values_by_field: BTreeSet<(FieldId, ResponseId)>,
    form_seq: i64,
    field_seq: i64,
    response_seq: i64,
}

impl Tables {
    fn put_response(&mut self, response: Response, values: Vec<FieldValue>) {
        for value in values {
            self.values_by_field.insert((value.field_id, value.response_id));
            self.values.insert((value.response_id, value.field_id), value.value);
        }
        self.responses.insert(response.id, response);
    }

    fn take_response(&mut self, id: ResponseId) -> Option<(Response, Vec<FieldValue>)> {
        let response = self.responses.remove(&id)?;
        let values = self.values_of(id);
        for value in &values {
            self.values.remove(&(id, value.field_id));
            self.values_by_field.remove(&(value.field_id, id));
        }
        Some((response, values))
    }

    fn values_of(&self, id: ResponseId) -> Vec<FieldValue> {
        self.values
            .range((id, FieldId::new(i64::MIN))..=(id, FieldId::new(i64::MAX)))
            .map(|(&(response_id, field_id), value)| FieldValue {
                response_id,
                field_id,
                value: value.clone(),
            })
            .collect()
    }

    fn responses_of(&self, form_id: FormId, window: &SubmittedWindow) -> Vec<Response> {
        let mut responses: Vec<Response> = self
            .responses
            .values()
            .filter(|r| r.form_id == form_id && window.contains(r.submitted_at))
            .cloned()
            .collect();
        responses.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at).then(b.id.cmp(&a.id)));
        responses
    }

    fn active_fields(&self, form_id: FormId) -> impl Iterator<Item = &Field> {
        self.fields
            .values()
            .filter(move |f| f.form_id == form_id && f.is_active())
    }

    /// Store-level guard for the one-live-version rule
    fn check_live_uniqueness(&self, form: &Form) -> RepoResult<()> {
        if form.status() != FormStatus::Published {
            return Ok(());
        }
        let clash = self.forms.values().any(|other| {
            other.id() != form.id()
                && other.status() == FormStatus::Published
                && (other.slug() == form.slug() || other.group_id() == form.group_id())
        });
        if clash {
            return Err(RepositoryError::Conflict(format!(
                "another version of '{}' is already published",
                form.slug()
            )));
        }
        Ok(())
    }
}

enum Undo {
    Form { id: FormId, previous: Option<Form> },
    Field { id: FieldId, previous: Option<Field> },
    Response {
        id: ResponseId,
        previous: Option<(Response, Vec<FieldValue>)>,
    },
}

/// In-memory record store (for tests and single-process deployments)
#[derive(Clone, Default)]
pub struct InMemoryRecordStore {
    tables: Arc<Mutex<Tables>>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn begin(&self) -> RepoResult<Box<dyn Transaction>> {
        let tables = self.tables.clone().lock_owned().await;
        Ok(Box::new(InMemoryTransaction {
            tables,
            undo: Vec::new(),
            committed: false,
        }))
    }
}

struct InMemoryTransaction {
    tables: OwnedMutexGuard<Tables>,
    undo: Vec<Undo>,
    committed: bool,
}

impl Drop for InMemoryTransaction {
    fn drop(&mut self) {
        if self.committed || self.undo.is_empty() {
            return;
        }

        let undone = self.undo.len();
        while let Some(entry) = self.undo.pop() {
            match entry {
                Undo::Form { id, previous } => match previous {
                    Some(form) => {
                        self.tables.forms.insert(id, form);
                    }
                    None => {
                        self.tables.forms.remove(&id);
                    }
                },
                Undo::Field { id, previous } => match previous {
                    Some(field) => {
                        self.tables.fields.insert(id, field);
                    }
                    None => {
                        self.tables.fields.remove(&id);
                    }
                },
                Undo::Response { id, previous } => {
                    self.tables.take_response(id);
                    if let Some((response, values)) = previous {
                        self.tables.put_response(response, values);
                    }
                }
            }
        }
        tracing::debug!(undone, "transaction rolled back");
    }
}

#[async_trait]
impl Transaction for InMemoryTransaction {
    // -------------------------------------------------------------------------
    // Forms
    // -------------------------------------------------------------------------

    async fn next_form_id(&mut self) -> RepoResult<FormId> {
        self.tables.form_seq += 1;
        Ok(FormId::new(self.tables.form_seq))
    }

    async fn insert_form(&mut self, form: &Form) -> RepoResult<()> {
        if self.tables.forms.contains_key(&form.id()) {
            return Err(RepositoryError::Duplicate {
                entity: "form",
                key: form.id().to_string(),
            });
        }
        let version_taken = self
            .tables
            .forms
            .values()
            .any(|f| f.group_id() == form.group_id() && f.version() == form.version());
        if version_taken {
            return Err(RepositoryError::Duplicate {
                entity: "form version",
                key: format!("{}#{}", form.group_id(), form.version()),
            });
        }
        self.tables.check_live_uniqueness(form)?;

        self.tables.forms.insert(form.id(), form.clone());
        self.undo.push(Undo::Form {
            id: form.id(),
            previous: None,
        });
        Ok(())
    }

    async fn update_form(&mut self, form: &Form) -> RepoResult<()> {
        if !self.tables.forms.contains_key(&form.id()) {
            return Err(RepositoryError::NotFound(format!("form {}", form.id())));
        }
        self.tables.check_live_uniqueness(form)?;

        let previous = self.tables.forms.insert(form.id(), form.clone());
        self.undo.push(Undo::Form {
            id: form.id(),
            previous,
        });
        Ok(())
    }

    async fn find_form(&mut self, id: FormId) -> RepoResult<Option<Form>> {
        Ok(self.tables.forms.get(&id).filter(|f| !f.is_deleted()).cloned())
    }

    async fn find_published_by_slug(&mut self, slug: &Slug) -> RepoResult<Option<Form>> {
        Ok(self
            .tables
            .forms
            .values()
            .find(|f| f.is_live() && f.slug() == slug)
            .cloned())
    }

    async fn published_rows(&mut self, group_id: FormGroupId, slug: &Slug) -> RepoResult<Vec<Form>> {
        let mut rows: Vec<Form> = self
            .tables
            .forms
            .values()
            .filter(|f| f.status() == FormStatus::Published)
            .filter(|f| f.group_id() == group_id || f.slug() == slug)
            .cloned()
            .collect();
        rows.sort_by_key(Form::id);
        Ok(rows)
    }

    async fn max_version(&mut self, group_id: FormGroupId) -> RepoResult<i32> {
        Ok(self
            .tables
            .forms
            .values()
            .filter(|f| f.group_id() == group_id)
            .map(Form::version)
            .max()
            .unwrap_or(0))
    }

    async fn list_forms(
        &mut self,
        owner_id: OwnerId,
        status: Option<FormStatus>,
    ) -> RepoResult<Vec<Form>> {
        let mut forms: Vec<Form> = self
            .tables
            .forms
            .values()
            .filter(|f| !f.is_deleted() && f.is_owned_by(owner_id))
            .filter(|f| status.map_or(true, |s| f.status() == s))
            .cloned()
            .collect();
        forms.sort_by(|a, b| b.created_at().cmp(&a.created_at()).then(b.id().cmp(&a.id())));
        Ok(forms)
    }

    async fn list_group(&mut self, group_id: FormGroupId) -> RepoResult<Vec<Form>> {
        let mut forms: Vec<Form> = self
            .tables
            .forms
            .values()
            .filter(|f| !f.is_deleted() && f.group_id() == group_id)
            .cloned()
            .collect();
        forms.sort_by_key(Form::version);
        Ok(forms)
    }

    // -------------------------------------------------------------------------
    // Fields
    // -------------------------------------------------------------------------

    async fn next_field_id(&mut self) -> RepoResult<FieldId> {
        self.tables.field_seq += 1;
        Ok(FieldId::new(self.tables.field_seq))
    }

    async fn insert_field(&mut self, field: &Field) -> RepoResult<()> {
        if self.tables.fields.contains_key(&field.id) {
            return Err(RepositoryError::Duplicate {
                entity: "field",
                key: field.id.to_string(),
            });
        }
        if field.is_active()
            && self
                .tables
                .active_fields(field.form_id)
                .any(|f| f.key == field.key)
        {
            return Err(RepositoryError::Duplicate {
                entity: "field",
                key: field.key.clone(),
            });
        }

        self.tables.fields.insert(field.id, field.clone());
        self.undo.push(Undo::Field {
            id: field.id,
            previous: None,
        });
        Ok(())
    }

    async fn update_field(&mut self, field: &Field) -> RepoResult<()> {
        if !self.tables.fields.contains_key(&field.id) {
            return Err(RepositoryError::NotFound(format!("field {}", field.id)));
        }
        if field.is_active()
            && self
                .tables
                .active_fields(field.form_id)
                .any(|f| f.id != field.id && f.key == field.key)
        {
            return Err(RepositoryError::Duplicate {
                entity: "field",
                key: field.key.clone(),
            });
        }

        let previous = self.tables.fields.insert(field.id, field.clone());
        self.undo.push(Undo::Field {
            id: field.id,
            previous,
        });
        Ok(())
    }

    async fn find_field(&mut self, form_id: FormId, field_id: FieldId) -> RepoResult<Option<Field>> {
        Ok(self
            .tables
            .fields
            .get(&field_id)
            .filter(|f| f.form_id == form_id && f.is_active())
            .cloned())
    }

    async fn list_fields(&mut self, form_id: FormId) -> RepoResult<Vec<Field>> {
        let mut fields: Vec<Field> = self.tables.active_fields(form_id).cloned().collect();
        fields.sort_by_key(|f| (f.display_order, f.id));
        Ok(fields)
    }

    async fn max_display_order(&mut self, form_id: FormId) -> RepoResult<i32> {
        Ok(self
            .tables
            .active_fields(form_id)
            .map(|f| f.display_order)
            .max()
            .unwrap_or(0))
    }

    async fn key_exists(&mut self, form_id: FormId, key: &str) -> RepoResult<bool> {
        Ok(self.tables.active_fields(form_id).any(|f| f.key == key))
    }

    // -------------------------------------------------------------------------
    // Responses
    // -------------------------------------------------------------------------

    async fn next_response_id(&mut self) -> RepoResult<ResponseId> {
        self.tables.response_seq += 1;
        Ok(ResponseId::new(self.tables.response_seq))
    }

    async fn insert_response(&mut self, response: &Response, values: &[FieldValue]) -> RepoResult<()> {
        if self.tables.responses.contains_key(&response.id) {
            return Err(RepositoryError::Duplicate {
                entity: "response",
                key: response.id.to_string(),
            });
        }

        let mut seen = BTreeSet::new();
        for value in values {
            if value.response_id != response.id {
                return Err(RepositoryError::Conflict(format!(
                    "field value belongs to response {}, not {}",
                    value.response_id, response.id
                )));
            }
            if !seen.insert(value.field_id) {
                return Err(RepositoryError::Duplicate {
                    entity: "field value",
                    key: format!("{}/{}", response.id, value.field_id),
                });
            }
        }

        self.tables.put_response(response.clone(), values.to_vec());
        self.undo.push(Undo::Response {
            id: response.id,
            previous: None,
        });
        Ok(())
    }

    async fn find_response(
        &mut self,
        form_id: FormId,
        response_id: ResponseId,
    ) -> RepoResult<Option<Response>> {
        Ok(self
            .tables
            .responses
            .get(&response_id)
            .filter(|r| r.form_id == form_id)
            .cloned())
    }

    async fn list_responses(
        &mut self,
        form_id: FormId,
        window: &SubmittedWindow,
        offset: usize,
        limit: usize,
    ) -> RepoResult<(Vec<Response>, usize)> {
        let all = self.tables.responses_of(form_id, window);
        let total = all.len();
        let page = all.into_iter().skip(offset).take(limit).collect();
        Ok((page, total))
    }

    async fn all_responses(&mut self, form_id: FormId) -> RepoResult<Vec<Response>> {
        Ok(self.tables.responses_of(form_id, &SubmittedWindow::default()))
    }

    async fn count_responses(&mut self, form_id: FormId) -> RepoResult<usize> {
        Ok(self
            .tables
            .responses
            .values()
            .filter(|r| r.form_id == form_id)
            .count())
    }

    async fn delete_response(&mut self, response_id: ResponseId) -> RepoResult<()> {
        let removed = self
            .tables
            .take_response(response_id)
            .ok_or_else(|| RepositoryError::NotFound(format!("response {}", response_id)))?;
        self.undo.push(Undo::Response {
            id: response_id,
            previous: Some(removed),
        });
        Ok(())
    }

    async fn field_values(&mut self, response_id: ResponseId) -> RepoResult<Vec<FieldValue>> {
        Ok(self.tables.values_of(response_id))
    }

    async fn query_field_values(
        &mut self,
        field_id: FieldId,
        filter: &ValueFilter,
    ) -> RepoResult<Vec<FieldValue>> {
        let tables = &*self.tables;
        Ok(tables
            .values_by_field
            .range((field_id, ResponseId::new(i64::MIN))..=(field_id, ResponseId::new(i64::MAX)))
            .filter_map(|&(field_id, response_id)| {
                let value = tables.values.get(&(response_id, field_id))?;
                filter.matches(value).then(|| FieldValue {
                    response_id,
                    field_id,
                    value: value.clone(),
                })
            })
            .collect())
    }

    async fn commit(self: Box<Self>) -> RepoResult<()> {
        let mut this = self;
        this.committed = true;
        this.undo.clear();
        Ok(())
    }
}
