//! FormForge engine
//!
//! Versioned data-collection forms and the pipeline that captures
//! responses against them.
//!
//! ## Architecture
//!
//! - **Domain Layer**: `Form` lifecycle aggregate, fields, responses, typed values
//! - **Application Layer**: Use case orchestration, DTOs
//! - **Ports Layer**: Hexagonal architecture interfaces
//! - **Infrastructure Layer**: In-memory record store, clocks, throttles, event sinks
//!
//! ## Lifecycle
//!
//! Versions of one form share a group and a public slug. At most one
//! version of a group is PUBLISHED; publishing a draft archives the live
//! sibling in the same transaction. Every response stores its payload and
//! a snapshot of the schema it was validated against, so later edits never
//! change how an old response reads.

pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod ports;

use std::sync::Arc;

// Re-exports for convenience
pub use application::dto::*;
pub use application::{FieldService, FormService, ResponseService, SubmissionService};
pub use config::{EngineConfig, PagingConfig, SlugConfig, SubmissionConfig};
pub use domain::aggregates::{Field, FieldValue, Form, FormError, Response};
pub use domain::events::{DomainEvent, FormEvent, ResponseEvent};
pub use domain::value_objects::{
    FieldId, FieldType, FormGroupId, FormId, FormStatus, OwnerId, ResponseId, ResponseStatus, Slug,
    TypedValue,
};
pub use error::{FormsError, Result};
pub use infrastructure::{
    FixedClock, InMemoryRecordStore, RecordingEventPublisher, SystemClock, TokenBucketThrottle,
    TracingEventPublisher, Unthrottled,
};
pub use ports::inbound::{FieldUseCases, FormUseCases, ResponseUseCases, SubmissionUseCases};
pub use ports::outbound::{
    Clock, EventPublisher, RecordStore, RepositoryError, SubmissionThrottle, Transaction,
};

use domain::services::BotDefense;
use domain::value_objects::SlugGenerator;

/// The four use-case services wired over one record store
#[derive(Clone)]
pub struct Engine {
    forms: Arc<dyn FormUseCases>,
    fields: Arc<dyn FieldUseCases>,
    submissions: Arc<dyn SubmissionUseCases>,
    responses: Arc<dyn ResponseUseCases>,
}

impl Engine {
    pub fn builder(store: Arc<dyn RecordStore>) -> EngineBuilder {
        EngineBuilder::new(store)
    }

    pub fn forms(&self) -> &dyn FormUseCases {
        self.forms.as_ref()
    }

    pub fn fields(&self) -> &dyn FieldUseCases {
        self.fields.as_ref()
    }

    pub fn submissions(&self) -> &dyn SubmissionUseCases {
        self.submissions.as_ref()
    }

    pub fn responses(&self) -> &dyn ResponseUseCases {
        self.responses.as_ref()
    }
}

pub struct EngineBuilder {
    store: Arc<dyn RecordStore>,
    config: EngineConfig,
    clock: Arc<dyn Clock>,
    throttle: Arc<dyn SubmissionThrottle>,
    events: Arc<dyn EventPublisher>,
}

impl EngineBuilder {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            store,
            config: EngineConfig::default(),
            clock: Arc::new(SystemClock),
            throttle: Arc::new(Unthrottled),
            events: Arc::new(TracingEventPublisher),
        }
    }

    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn throttle(mut self, throttle: Arc<dyn SubmissionThrottle>) -> Self {
        self.throttle = throttle;
        self
    }

    pub fn events(mut self, events: Arc<dyn EventPublisher>) -> Self {
        self.events = events;
        self
    }

    pub fn build(self) -> Engine {
        let Self {
            store,
            config,
            clock,
            throttle,
            events,
        } = self;

        Engine {
            forms: Arc::new(FormService::new(
                store.clone(),
                events.clone(),
                clock.clone(),
                SlugGenerator::new(&config.slug),
                config.paging.clone(),
            )),
            fields: Arc::new(FieldService::new(store.clone(), clock.clone())),
            submissions: Arc::new(SubmissionService::new(
                store.clone(),
                events.clone(),
                clock,
                throttle,
                BotDefense::new(&config.submission),
            )),
            responses: Arc::new(ResponseService::new(store, events, config.paging)),
        }
    }
}
