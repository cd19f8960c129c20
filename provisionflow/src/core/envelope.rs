//! Progress envelope returned to the scheduler with factory methods.

use super::{CallbackState, OperationStatus, OutcomeCode};
use serde::{Deserialize, Serialize};

/// The single result of one handler invocation.
///
/// Build envelopes through the factory methods; they are the only way to
/// produce values that satisfy the status invariants:
///
/// - `InProgress` carries a callback state and a positive delay.
/// - `Success` and `Failed` carry neither.
/// - `Failed` carries an outcome code; `Success` carries no code and no message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressEnvelope<M> {
    /// The invocation status.
    pub status: OperationStatus,

    /// The resource model (absent after a delete, and for list operations).
    #[serde(default = "Option::default", skip_serializing_if = "Option::is_none")]
    pub resource_model: Option<M>,

    /// Models returned by a list operation.
    #[serde(default = "Option::default", skip_serializing_if = "Option::is_none")]
    pub resource_models: Option<Vec<M>>,

    /// State to hand back on the next invocation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callback_state: Option<CallbackState>,

    /// Minimum delay before the next invocation.
    #[serde(default)]
    pub callback_delay_seconds: u32,

    /// Failure classification.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<OutcomeCode>,

    /// Failure description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Pagination token for list operations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_token: Option<String>,
}

impl<M> ProgressEnvelope<M> {
    /// Creates an IN_PROGRESS envelope.
    ///
    /// A zero delay is raised to one second so the scheduler never spins.
    #[must_use]
    pub fn in_progress(model: M, state: CallbackState, delay_seconds: u32) -> Self {
        Self {
            status: OperationStatus::InProgress,
            resource_model: Some(model),
            resource_models: None,
            callback_state: Some(state),
            callback_delay_seconds: delay_seconds.max(1),
            error_code: None,
            message: None,
            next_token: None,
        }
    }

    /// Creates a SUCCESS envelope carrying a model.
    #[must_use]
    pub fn success(model: M) -> Self {
        Self::terminal_success(Some(model), None, None)
    }

    /// Creates a SUCCESS envelope with no model (e.g. after a delete).
    #[must_use]
    pub fn success_empty() -> Self {
        Self::terminal_success(None, None, None)
    }

    /// Creates a SUCCESS envelope for a list operation.
    #[must_use]
    pub fn success_list(models: Vec<M>, next_token: Option<String>) -> Self {
        Self::terminal_success(None, Some(models), next_token)
    }

    /// Creates a FAILED envelope.
    #[must_use]
    pub fn failed(model: Option<M>, code: OutcomeCode, message: impl Into<String>) -> Self {
        Self {
            status: OperationStatus::Failed,
            resource_model: model,
            resource_models: None,
            callback_state: None,
            callback_delay_seconds: 0,
            error_code: Some(code),
            message: Some(message.into()),
            next_token: None,
        }
    }

    fn terminal_success(
        model: Option<M>,
        models: Option<Vec<M>>,
        next_token: Option<String>,
    ) -> Self {
        Self {
            status: OperationStatus::Success,
            resource_model: model,
            resource_models: models,
            callback_state: None,
            callback_delay_seconds: 0,
            error_code: None,
            message: None,
            next_token,
        }
    }

    /// Returns true if the scheduler must not invoke again.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Returns true if the envelope reports success.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == OperationStatus::Success
    }

    /// Returns true if the envelope reports failure.
    #[must_use]
    pub fn is_failed(&self) -> bool {
        self.status == OperationStatus::Failed
    }

    /// Lists every status invariant the envelope breaks.
    ///
    /// Envelopes built through the factory methods always return an empty
    /// list; deserialized ones may not.
    #[must_use]
    pub fn invariant_violations(&self) -> Vec<&'static str> {
        let mut violations = Vec::new();
        match self.status {
            OperationStatus::InProgress => {
                if self.callback_state.is_none() {
                    violations.push("IN_PROGRESS without callback state");
                }
                if self.callback_delay_seconds == 0 {
                    violations.push("IN_PROGRESS without a positive delay");
                }
            }
            OperationStatus::Success | OperationStatus::Failed => {
                if self.callback_state.is_some() {
                    violations.push("terminal envelope carries callback state");
                }
                if self.callback_delay_seconds != 0 {
                    violations.push("terminal envelope carries a delay");
                }
            }
        }
        match self.status {
            OperationStatus::Failed if self.error_code.is_none() => {
                violations.push("FAILED without an outcome code");
            }
            OperationStatus::Success if self.error_code.is_some() || self.message.is_some() => {
                violations.push("SUCCESS with an outcome code or message");
            }
            _ => {}
        }
        violations
    }
}
