//! Read-after-write stage.

use super::{Stage, StageContext, StageResult};
use crate::core::{CallbackState, OperationKind, ResourceModel};
use crate::events::NoOpEventSink;
use crate::pipeline::{Pipeline, PipelineOutcome};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// Runs the read pipeline after a mutation so the reported model reflects
/// the backend, merged over the desired model.
#[derive(Debug)]
pub struct ReadAfterWrite<M> {
    read: Arc<Pipeline<M>>,
}

impl<M: ResourceModel> ReadAfterWrite<M> {
    /// Creates the stage over a read pipeline.
    pub fn new(read: Arc<Pipeline<M>>) -> Self {
        Self { read }
    }
}

#[async_trait]
impl<M: ResourceModel> Stage<M> for ReadAfterWrite<M> {
    fn name(&self) -> &str {
        "read-after-write"
    }

    async fn execute(&self, ctx: StageContext<'_, M>) -> StageResult<M> {
        let read_ctx = StageContext::new(OperationKind::Read, ctx.model.clone())
            .with_state(CallbackState::new());

        match self.read.run(read_ctx, &NoOpEventSink).await {
            PipelineOutcome::Succeeded {
                model: Some(fresh), ..
            } => {
                debug!(pipeline = self.read.name(), "Read back after write");
                StageResult::proceed(ctx.model.merge(fresh), ctx.state)
            }
            PipelineOutcome::Succeeded { model: None, .. } => ctx.proceed(),
            PipelineOutcome::Suspended { delay_seconds, .. } => {
                StageResult::suspend(ctx.model, ctx.state, delay_seconds)
            }
            PipelineOutcome::Failed { code, message, .. } => {
                StageResult::fail(ctx.model, code, message)
            }
        }
    }
}
