//! Form Aggregate
//!
//! One row per version. Versions of the same conceptual form share a group
//! id and a slug; the aggregate owns the DRAFT -> PUBLISHED -> ARCHIVED
//! state machine for a single version. Cross-version rules (one live
//! version per slug) are coordinated by the application layer inside a
//! store transaction.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::events::{DomainEvent, FormEvent};
use crate::domain::value_objects::{FormGroupId, FormId, FormStatus, OwnerId, Slug};

/// Form aggregate root
#[derive(Clone, Debug, Serialize)]
pub struct Form {
    id: FormId,
    group_id: FormGroupId,
    owner_id: OwnerId,
    slug: Slug,
    title: String,
    description: Option<String>,
    settings: Option<serde_json::Value>,
    status: FormStatus,
    version: i32,
    deleted: bool,
    published_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    #[serde(skip)]
    events: Vec<DomainEvent>,
}

impl Form {
    /// Create version 1 of a brand new form group
    pub fn create(
        id: FormId,
        owner_id: OwnerId,
        title: impl Into<String>,
        description: Option<String>,
        settings: Option<serde_json::Value>,
        slug: Slug,
        now: DateTime<Utc>,
    ) -> Self {
        let group_id = FormGroupId::new();

        let mut form = Self {
            id,
            group_id,
            owner_id,
            slug: slug.clone(),
            title: title.into(),
            description,
            settings,
            status: FormStatus::Draft,
            version: 1,
            deleted: false,
            published_at: None,
            created_at: now,
            updated_at: now,
            events: vec![],
        };

        form.raise_event(DomainEvent::Form(FormEvent::Created {
            form_id: id,
            group_id,
            slug,
            owner_id,
            created_at: now,
        }));

        form
    }

    /// New DRAFT in the same group carrying this version's content
    pub fn clone_as_draft(&self, id: FormId, version: i32, now: DateTime<Utc>) -> Self {
        let mut draft = Self {
            id,
            group_id: self.group_id,
            owner_id: self.owner_id,
            slug: self.slug.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            settings: self.settings.clone(),
            status: FormStatus::Draft,
            version,
            deleted: false,
            published_at: None,
            created_at: now,
            updated_at: now,
            events: vec![],
        };

        draft.raise_event(DomainEvent::Form(FormEvent::DraftCreated {
            form_id: id,
            source_form_id: self.id,
            version,
            created_at: now,
        }));

        draft
    }

    // =========================================================================
    // Getters
    // =========================================================================

    pub fn id(&self) -> FormId { self.id }
    pub fn group_id(&self) -> FormGroupId { self.group_id }
    pub fn owner_id(&self) -> OwnerId { self.owner_id }
    pub fn slug(&self) -> &Slug { &self.slug }
    pub fn title(&self) -> &str { &self.title }
    pub fn description(&self) -> Option<&str> { self.description.as_deref() }
    pub fn settings(&self) -> Option<&serde_json::Value> { self.settings.as_ref() }
    pub fn status(&self) -> FormStatus { self.status }
    pub fn version(&self) -> i32 { self.version }
    pub fn is_deleted(&self) -> bool { self.deleted }
    pub fn published_at(&self) -> Option<DateTime<Utc>> { self.published_at }
    pub fn created_at(&self) -> DateTime<Utc> { self.created_at }
    pub fn updated_at(&self) -> DateTime<Utc> { self.updated_at }

    pub fn is_owned_by(&self, owner_id: OwnerId) -> bool {
        self.owner_id == owner_id
    }

    pub fn is_live(&self) -> bool {
        self.status == FormStatus::Published && !self.deleted
    }

    // =========================================================================
    // Business Operations
    // =========================================================================

    /// Content and fields may only change while DRAFT
    pub fn ensure_editable(&self) -> Result<(), FormError> {
        match self.status {
            FormStatus::Draft => Ok(()),
            other => Err(FormError::NotEditable(other)),
        }
    }

    /// Partial update: `None` leaves the attribute untouched
    pub fn update_details(
        &mut self,
        title: Option<String>,
        description: Option<String>,
        settings: Option<serde_json::Value>,
        now: DateTime<Utc>,
    ) -> Result<(), FormError> {
        self.ensure_editable()?;

        if let Some(title) = title {
            self.title = title;
        }
        if description.is_some() {
            self.description = description;
        }
        if settings.is_some() {
            self.settings = settings;
        }
        self.touch(now);

        self.raise_event(DomainEvent::Form(FormEvent::Updated {
            form_id: self.id,
            updated_at: now,
        }));

        Ok(())
    }

    /// DRAFT -> PUBLISHED. `archived_sibling` is the previously live version
    /// the caller has already archived in the same transaction.
    pub fn publish(
        &mut self,
        archived_sibling: Option<FormId>,
        now: DateTime<Utc>,
    ) -> Result<(), FormError> {
        if self.status != FormStatus::Draft {
            return Err(FormError::NotDraft(self.status));
        }

        self.status = FormStatus::Published;
        self.published_at = Some(now);
        self.touch(now);

        self.raise_event(DomainEvent::Form(FormEvent::Published {
            form_id: self.id,
            slug: self.slug.clone(),
            version: self.version,
            archived: archived_sibling,
            published_at: now,
        }));

        Ok(())
    }

    /// Unconditional transition to ARCHIVED
    pub fn archive(&mut self, now: DateTime<Utc>) {
        self.status = FormStatus::Archived;
        self.touch(now);

        self.raise_event(DomainEvent::Form(FormEvent::Archived {
            form_id: self.id,
            archived_at: now,
        }));
    }

    /// Soft delete; status is left as is
    pub fn mark_deleted(&mut self, now: DateTime<Utc>) {
        self.deleted = true;
        self.touch(now);

        self.raise_event(DomainEvent::Form(FormEvent::Deleted {
            form_id: self.id,
            deleted_at: now,
        }));
    }

    // =========================================================================
    // Domain Events
    // =========================================================================

    pub fn take_events(&mut self) -> Vec<DomainEvent> {
        std::mem::take(&mut self.events)
    }

    fn raise_event(&mut self, event: DomainEvent) {
        self.events.push(event);
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}

/// Form domain errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FormError {
    #[error("cannot edit a {0} form, create a draft first")]
    NotEditable(FormStatus),

    #[error("only DRAFT forms can be published, this one is {0}")]
    NotDraft(FormStatus),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_form() -> Form {
        Form::create(
            FormId::new(1),
            OwnerId::new(10),
            "Feedback",
            None,
            None,
            Slug::from_string("feedback-abc123"),
            Utc::now(),
        )
    }

    #[test]
    fn test_create_form() {
        let mut form = new_form();
        assert_eq!(form.status(), FormStatus::Draft);
        assert_eq!(form.version(), 1);
        assert!(!form.is_deleted());
        assert!(form.is_owned_by(OwnerId::new(10)));

        let events = form.take_events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type(), "form.created");
        assert!(form.take_events().is_empty());
    }

    #[test]
    fn test_clone_as_draft_keeps_identity() {
        let mut source = new_form();
        source.publish(None, Utc::now()).unwrap();

        let draft = source.clone_as_draft(FormId::new(2), 2, Utc::now());
        assert_eq!(draft.group_id(), source.group_id());
        assert_eq!(draft.slug(), source.slug());
        assert_eq!(draft.title(), source.title());
        assert_eq!(draft.version(), 2);
        assert_eq!(draft.status(), FormStatus::Draft);
        assert!(draft.published_at().is_none());
    }

    #[test]
    fn test_publish_only_from_draft() {
        let mut form = new_form();
        form.publish(Some(FormId::new(99)), Utc::now()).unwrap();
        assert_eq!(form.status(), FormStatus::Published);
        assert!(form.published_at().is_some());
        assert!(form.is_live());

        assert_eq!(
            form.publish(None, Utc::now()),
            Err(FormError::NotDraft(FormStatus::Published))
        );

        form.archive(Utc::now());
        assert_eq!(
            form.publish(None, Utc::now()),
            Err(FormError::NotDraft(FormStatus::Archived))
        );
    }

    #[test]
    fn test_partial_update_requires_draft() {
        let mut form = new_form();
        form.update_details(None, Some("About you".into()), None, Utc::now())
            .unwrap();
        assert_eq!(form.title(), "Feedback");
        assert_eq!(form.description(), Some("About you"));

        form.publish(None, Utc::now()).unwrap();
        let err = form
            .update_details(Some("Other".into()), None, None, Utc::now())
            .unwrap_err();
        assert_eq!(err, FormError::NotEditable(FormStatus::Published));
        assert_eq!(form.title(), "Feedback");
    }

    #[test]
    fn test_archive_is_unconditional() {
        let mut form = new_form();
        form.archive(Utc::now());
        assert_eq!(form.status(), FormStatus::Archived);
        form.archive(Utc::now());
        assert_eq!(form.status(), FormStatus::Archived);
    }

    #[test]
    fn test_soft_delete_keeps_status() {
        let mut form = new_form();
        form.publish(None, Utc::now()).unwrap();
        form.mark_deleted(Utc::now());
        assert!(form.is_deleted());
        assert_eq!(form.status(), FormStatus::Published);
        assert!(!form.is_live());
    }
}
