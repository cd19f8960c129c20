//! Invocation entry point.
//!
//! The orchestrator receives one invocation from the scheduler, selects the
//! pipeline registered for the operation, resumes from the callback state and
//! turns the pipeline outcome into exactly one [`ProgressEnvelope`].
//!
//! It holds no per-operation state: everything that survives between
//! invocations travels in the callback state, so any orchestrator built with
//! the same pipelines can serve the next invocation.

mod request;

pub use request::InvocationRequest;

use crate::core::{CallbackState, OperationKind, OutcomeCode, ProgressEnvelope, ResourceModel};
use crate::events::{self, EventSink, NoOpEventSink};
use crate::pipeline::{Pipeline, PipelineOutcome};
use crate::stages::StageContext;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

/// Routes invocations to the pipeline registered for their operation kind.
pub struct Orchestrator<M> {
    pipelines: HashMap<OperationKind, Arc<Pipeline<M>>>,
    sink: Arc<dyn EventSink>,
}

impl<M: ResourceModel> Default for Orchestrator<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: ResourceModel> Orchestrator<M> {
    /// Creates an orchestrator with no pipelines and a no-op event sink.
    #[must_use]
    pub fn new() -> Self {
        Self {
            pipelines: HashMap::new(),
            sink: Arc::new(NoOpEventSink),
        }
    }

    /// Registers the pipeline for an operation kind, replacing any earlier one.
    #[must_use]
    pub fn with_pipeline(mut self, operation: OperationKind, pipeline: Arc<Pipeline<M>>) -> Self {
        self.pipelines.insert(operation, pipeline);
        self
    }

    /// Sets the event sink.
    #[must_use]
    pub fn with_event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Returns the pipeline registered for an operation kind.
    #[must_use]
    pub fn pipeline(&self, operation: OperationKind) -> Option<&Arc<Pipeline<M>>> {
        self.pipelines.get(&operation)
    }

    /// Returns the registered operation kinds in lifecycle order.
    #[must_use]
    pub fn operations(&self) -> Vec<OperationKind> {
        OperationKind::ALL
            .into_iter()
            .filter(|op| self.pipelines.contains_key(op))
            .collect()
    }

    /// Handles one invocation.
    ///
    /// Never fails: every problem, including a missing pipeline, is reported
    /// as a FAILED envelope.
    pub async fn handle(&self, request: InvocationRequest<M>) -> ProgressEnvelope<M> {
        let invocation_id = Uuid::new_v4();
        let span = info_span!(
            "invocation",
            invocation_id = %invocation_id,
            operation = %request.operation,
            resumed = request.callback_state.is_some(),
        );

        async {
            self.sink
                .emit(
                    events::INVOCATION_STARTED,
                    Some(events::event_payload(serde_json::json!({
                        "invocation_id": invocation_id.to_string(),
                        "operation": request.operation,
                        "resumed": request.callback_state.is_some(),
                    }))),
                )
                .await;

            let envelope = self.dispatch(&request).await;
            debug_assert!(
                envelope.invariant_violations().is_empty(),
                "envelope violates status invariants: {:?}",
                envelope.invariant_violations()
            );

            info!(
                status = %envelope.status,
                outcome = ?envelope.error_code,
                delay_seconds = envelope.callback_delay_seconds,
                "Invocation completed"
            );
            self.sink
                .emit(
                    events::INVOCATION_COMPLETED,
                    Some(events::event_payload(serde_json::json!({
                        "invocation_id": invocation_id.to_string(),
                        "operation": request.operation,
                        "status": envelope.status,
                        "outcome": envelope.error_code,
                        "delay_seconds": envelope.callback_delay_seconds,
                    }))),
                )
                .await;

            envelope
        }
        .instrument(span)
        .await
    }

    async fn dispatch(&self, request: &InvocationRequest<M>) -> ProgressEnvelope<M> {
        let Some(pipeline) = self.pipelines.get(&request.operation) else {
            warn!("No pipeline registered for operation");
            return ProgressEnvelope::failed(
                Some(request.desired_model.clone()),
                OutcomeCode::InvalidRequest,
                format!("Operation {} is not supported", request.operation),
            );
        };

        let state = request.callback_state.clone().unwrap_or_default();
        let model = restore_identifier(request.desired_model.clone(), &state);

        let previous_model = if request.operation.accepts_previous_model() {
            request.previous_model.as_ref()
        } else {
            if request.previous_model.is_some() {
                debug!("Ignoring previous model for an operation that does not take one");
            }
            None
        };
        let next_token = match request.operation {
            OperationKind::List => request.next_token.as_deref(),
            _ => None,
        };

        let ctx = StageContext::new(request.operation, model)
            .with_state(state)
            .with_previous_model(previous_model)
            .with_next_token(next_token);

        envelope_from(pipeline.run(ctx, self.sink.as_ref()).await)
    }
}

/// Puts an identifier assigned by an earlier invocation back into the model
/// the scheduler replayed.
fn restore_identifier<M: ResourceModel>(mut model: M, state: &CallbackState) -> M {
    if let Some(id) = state.primary_identifier() {
        let missing = model
            .primary_identifier()
            .map_or(true, |current| current.trim().is_empty());
        if missing {
            debug!(identifier = id, "Restoring identifier from callback state");
            model.set_primary_identifier(id.to_string());
        }
    }
    model
}

fn envelope_from<M>(outcome: PipelineOutcome<M>) -> ProgressEnvelope<M> {
    match outcome {
        PipelineOutcome::Succeeded {
            models: Some(models),
            next_token,
            ..
        } => ProgressEnvelope::success_list(models, next_token),
        PipelineOutcome::Succeeded {
            model: Some(model), ..
        } => ProgressEnvelope::success(model),
        PipelineOutcome::Succeeded { model: None, .. } => ProgressEnvelope::success_empty(),
        PipelineOutcome::Suspended {
            model,
            state,
            delay_seconds,
            ..
        } => ProgressEnvelope::in_progress(model, state, delay_seconds),
        PipelineOutcome::Failed {
            model,
            code,
            message,
            ..
        } => ProgressEnvelope::failed(Some(model), code, message),
    }
}

impl<M> fmt::Debug for Orchestrator<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut operations: Vec<_> = self.pipelines.keys().map(ToString::to_string).collect();
        operations.sort();
        f.debug_struct("Orchestrator")
            .field("operations", &operations)
            .field("sink", &self.sink)
            .finish()
    }
}
