//! Cross-invocation progress record.

use serde::{Deserialize, Serialize};

const PRIMARY_IDENTIFIER_KEY: &str = "primaryIdentifier";
const COMPLETED_STAGES_KEY: &str = "completedStages";

/// Progress carried from one invocation of an operation to the next.
///
/// Created fresh on the first invocation, returned with every IN_PROGRESS
/// envelope and dropped once the operation is terminal. Stages never mutate a
/// state in place; every helper consumes `self` and returns the updated copy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallbackState {
    /// Set once the propagation gate has been passed.
    #[serde(default)]
    pub propagated: bool,
    /// Forced delay cycles served so far.
    #[serde(default)]
    pub forced_delay_count: u32,
    /// Set once the stabilized stage has converged (or given up leniently).
    #[serde(default)]
    pub stabilized: bool,
    /// Stabilization attempts that did not converge.
    #[serde(default)]
    pub stabilization_count: u32,
    /// Opaque per-pipeline fields.
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl CallbackState {
    /// Creates a fresh state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if nothing has been recorded yet.
    #[must_use]
    pub fn is_fresh(&self) -> bool {
        *self == Self::default()
    }

    /// Marks the propagation gate as passed.
    #[must_use]
    pub fn with_propagated(mut self) -> Self {
        self.propagated = true;
        self
    }

    /// Records one more forced delay cycle.
    #[must_use]
    pub fn with_forced_delay(mut self) -> Self {
        self.forced_delay_count = self.forced_delay_count.saturating_add(1);
        self
    }

    /// Marks the stabilized stage as converged.
    #[must_use]
    pub fn with_stabilized(mut self) -> Self {
        self.stabilized = true;
        self
    }

    /// Records one more non-converged stabilization attempt.
    #[must_use]
    pub fn with_stabilization_attempt(mut self) -> Self {
        self.stabilization_count = self.stabilization_count.saturating_add(1);
        self
    }

    /// Sets an opaque per-pipeline field.
    #[must_use]
    pub fn with_extra(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    /// Gets an opaque per-pipeline field.
    #[must_use]
    pub fn extra(&self, key: &str) -> Option<&serde_json::Value> {
        self.extra.get(key)
    }

    /// Records the identifier assigned by a mutating stage.
    ///
    /// The scheduler replays the unchanged desired model, so the identifier
    /// has to travel in the state.
    #[must_use]
    pub fn with_primary_identifier(self, identifier: impl Into<String>) -> Self {
        self.with_extra(
            PRIMARY_IDENTIFIER_KEY,
            serde_json::Value::String(identifier.into()),
        )
    }

    /// Returns the identifier recorded by an earlier invocation.
    #[must_use]
    pub fn primary_identifier(&self) -> Option<&str> {
        self.extra(PRIMARY_IDENTIFIER_KEY)
            .and_then(serde_json::Value::as_str)
    }

    /// Records that a stage has completed its remote effect.
    #[must_use]
    pub fn with_completed_stage(mut self, stage: &str) -> Self {
        if self.is_stage_completed(stage) {
            return self;
        }
        let entry = self
            .extra
            .entry(COMPLETED_STAGES_KEY)
            .or_insert_with(|| serde_json::Value::Array(Vec::new()));
        if let serde_json::Value::Array(stages) = entry {
            stages.push(serde_json::Value::String(stage.to_string()));
        } else {
            *entry = serde_json::json!([stage]);
        }
        self
    }

    /// Returns true if the stage was recorded as completed.
    #[must_use]
    pub fn is_stage_completed(&self, stage: &str) -> bool {
        self.extra(COMPLETED_STAGES_KEY)
            .and_then(serde_json::Value::as_array)
            .is_some_and(|stages| stages.iter().any(|s| s.as_str() == Some(stage)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_state() {
        let state = CallbackState::new();
        assert!(state.is_fresh());
        assert!(!state.propagated);
        assert_eq!(state.forced_delay_count, 0);
        assert!(!state.stabilized);
        assert_eq!(state.stabilization_count, 0);
    }

    #[test]
    fn test_copy_with_changes() {
        let original = CallbackState::new();
        let next = original.clone().with_forced_delay().with_stabilized();

        assert!(original.is_fresh());
        assert_eq!(next.forced_delay_count, 1);
        assert!(next.stabilized);
    }

    #[test]
    fn test_primary_identifier_roundtrip() {
        let state = CallbackState::new().with_primary_identifier("arn:x");
        assert_eq!(state.primary_identifier(), Some("arn:x"));
    }

    #[test]
    fn test_completed_stages_are_recorded_once() {
        let state = CallbackState::new()
            .with_completed_stage("delete")
            .with_completed_stage("delete");

        assert!(state.is_stage_completed("delete"));
        assert!(!state.is_stage_completed("verify"));
        assert_eq!(
            state.extra("completedStages"),
            Some(&serde_json::json!(["delete"]))
        );
    }

    #[test]
    fn test_serialized_shape() {
        let state = CallbackState::new().with_forced_delay();
        let json = serde_json::to_value(&state).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "propagated": false,
                "forcedDelayCount": 1,
                "stabilized": false,
                "stabilizationCount": 0
            })
        );
    }

    #[test]
    fn test_deserialize_missing_fields() {
        let state: CallbackState = serde_json::from_str(r#"{"propagated": true}"#).unwrap();
        assert!(state.propagated);
        assert_eq!(state.forced_delay_count, 0);
    }
}
