//! Invocation input.

use crate::core::{CallbackState, OperationKind, ProgressEnvelope};
use serde::{Deserialize, Serialize};

/// One invocation as handed over by the scheduler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvocationRequest<M> {
    /// The operation to perform.
    #[serde(rename = "operationKind")]
    pub operation: OperationKind,
    /// The desired model, replayed unchanged on every invocation.
    pub desired_model: M,
    /// The previous model (update/delete only).
    #[serde(default = "Option::default", skip_serializing_if = "Option::is_none")]
    pub previous_model: Option<M>,
    /// State returned by the previous IN_PROGRESS envelope.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callback_state: Option<CallbackState>,
    /// Pagination token (list only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_token: Option<String>,
}

impl<M: Clone> InvocationRequest<M> {
    /// Creates a request for an arbitrary operation.
    #[must_use]
    pub fn new(operation: OperationKind, desired_model: M) -> Self {
        Self {
            operation,
            desired_model,
            previous_model: None,
            callback_state: None,
            next_token: None,
        }
    }

    /// Creates a create request.
    #[must_use]
    pub fn create(desired_model: M) -> Self {
        Self::new(OperationKind::Create, desired_model)
    }

    /// Creates a read request.
    #[must_use]
    pub fn read(desired_model: M) -> Self {
        Self::new(OperationKind::Read, desired_model)
    }

    /// Creates an update request.
    #[must_use]
    pub fn update(desired_model: M, previous_model: Option<M>) -> Self {
        Self {
            previous_model,
            ..Self::new(OperationKind::Update, desired_model)
        }
    }

    /// Creates a delete request.
    #[must_use]
    pub fn delete(desired_model: M) -> Self {
        Self::new(OperationKind::Delete, desired_model)
    }

    /// Creates a list request.
    #[must_use]
    pub fn list(desired_model: M, next_token: Option<String>) -> Self {
        Self {
            next_token,
            ..Self::new(OperationKind::List, desired_model)
        }
    }

    /// Sets the callback state.
    #[must_use]
    pub fn with_callback_state(mut self, state: Option<CallbackState>) -> Self {
        self.callback_state = state;
        self
    }

    /// Builds the follow-up request the scheduler sends after an envelope.
    ///
    /// Returns `None` once the envelope is terminal. The models are replayed
    /// unchanged; only the callback state moves forward.
    #[must_use]
    pub fn next_invocation(&self, envelope: &ProgressEnvelope<M>) -> Option<Self> {
        if envelope.is_terminal() {
            return None;
        }
        Some(self.clone().with_callback_state(envelope.callback_state.clone()))
    }
}
