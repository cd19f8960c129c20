//! Lifecycle events emitted while an invocation runs.
//!
//! Sinks receive one event per stage decision plus a start and a completion
//! event for each invocation. Sinks are observers only: nothing they do can
//! change an envelope.

mod sink;

pub use sink::{CollectingEventSink, EventSink, LoggingEventSink, NoOpEventSink};

use chrono::Utc;

/// An invocation started.
pub const INVOCATION_STARTED: &str = "invocation.started";
/// An invocation produced its envelope.
pub const INVOCATION_COMPLETED: &str = "invocation.completed";
/// A stage was skipped because an earlier invocation completed it.
pub const STAGE_SKIPPED: &str = "stage.skipped";
/// A stage continued.
pub const STAGE_COMPLETED: &str = "stage.completed";
/// A stage asked to be re-invoked later.
pub const STAGE_SUSPENDED: &str = "stage.suspended";
/// A stage failed.
pub const STAGE_FAILED: &str = "stage.failed";
/// A stage finished the operation early.
pub const STAGE_DONE: &str = "stage.done";

/// Builds an event payload, stamping it with the emission time.
#[must_use]
pub fn event_payload(fields: serde_json::Value) -> serde_json::Value {
    let mut payload = match fields {
        serde_json::Value::Object(map) => map,
        other => {
            let mut map = serde_json::Map::new();
            map.insert("value".to_string(), other);
            map
        }
    };
    payload.insert(
        "timestamp".to_string(),
        serde_json::Value::String(Utc::now().to_rfc3339()),
    );
    serde_json::Value::Object(payload)
}
