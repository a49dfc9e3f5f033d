//! Event publishers

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::domain::DomainEvent;
use crate::ports::outbound::{EventPublisher, RepoResult};

/// Emits every event as a structured log record
#[derive(Default)]
pub struct TracingEventPublisher;

#[async_trait]
impl EventPublisher for TracingEventPublisher {
    async fn publish(&self, events: Vec<DomainEvent>) -> RepoResult<()> {
        for event in events {
            let payload = serde_json::to_string(&event).unwrap_or_default();
            tracing::info!(
                event_type = event.event_type(),
                aggregate_id = event.aggregate_id(),
                payload = %payload,
                "domain event"
            );
        }
        Ok(())
    }
}

/// Keeps published events in memory
#[derive(Default)]
pub struct RecordingEventPublisher {
    events: Mutex<Vec<DomainEvent>>,
}

impl RecordingEventPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<DomainEvent> {
        self.events.lock().clone()
    }

    pub fn event_types(&self) -> Vec<&'static str> {
        self.events.lock().iter().map(DomainEvent::event_type).collect()
    }
}

#[async_trait]
impl EventPublisher for RecordingEventPublisher {
    async fn publish(&self, events: Vec<DomainEvent>) -> RepoResult<()> {
        self.events.lock().extend(events);
        Ok(())
    }
}
