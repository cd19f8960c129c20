//! Event sink trait and implementations.

use super::{STAGE_FAILED, STAGE_SUSPENDED};
use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value;
use tracing::{debug, info, warn};

/// Receives engine lifecycle events. Must never fail.
#[async_trait]
pub trait EventSink: Send + Sync + std::fmt::Debug {
    /// Emits an event.
    async fn emit(&self, event_type: &str, data: Option<Value>);
}

/// Discards all events. The default sink.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpEventSink;

#[async_trait]
impl EventSink for NoOpEventSink {
    async fn emit(&self, _event_type: &str, _data: Option<Value>) {}
}

/// Writes events to the tracing subscriber. Failures are logged at WARN,
/// suspensions at INFO and everything else at DEBUG.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingEventSink;

#[async_trait]
impl EventSink for LoggingEventSink {
    async fn emit(&self, event_type: &str, data: Option<Value>) {
        let field = |key: &str| data.as_ref().and_then(|d| d.get(key)).cloned();
        let stage = field("stage");
        match event_type {
            STAGE_FAILED => warn!(event = event_type, ?stage, outcome = ?field("outcome"), "Stage failed"),
            STAGE_SUSPENDED => {
                info!(event = event_type, ?stage, delay_seconds = ?field("delay_seconds"), "Stage suspended");
            }
            _ => debug!(event = event_type, ?stage, data = ?data, "Engine event"),
        }
    }
}

/// Keeps every event in memory, in emission order. Meant for tests.
#[derive(Debug, Default)]
pub struct CollectingEventSink {
    events: RwLock<Vec<(String, Option<Value>)>>,
}

impl CollectingEventSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the collected event types.
    #[must_use]
    pub fn event_types(&self) -> Vec<String> {
        self.events.read().iter().map(|(t, _)| t.clone()).collect()
    }

    /// Returns the events whose type starts with `prefix`.
    #[must_use]
    pub fn events_of_type(&self, prefix: &str) -> Vec<(String, Option<Value>)> {
        self.events
            .read()
            .iter()
            .filter(|(t, _)| t.starts_with(prefix))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl EventSink for CollectingEventSink {
    async fn emit(&self, event_type: &str, data: Option<Value>) {
        self.events.write().push((event_type.to_string(), data));
    }
}
