//! Adapter turning a described remote call into a stage.

use super::{Stage, StageContext, StageResult};
use crate::core::{CallbackState, ResourceModel};
use crate::errors::{ProvisionError, RemoteError};
use async_trait::async_trait;
use std::fmt::Debug;
use tracing::{debug, warn};

/// One remote call described as translate, invoke, and the two outcome
/// handlers.
#[async_trait]
pub trait RemoteCall<M>: Send + Sync + Debug {
    /// Backend request shape.
    type Request: Send;
    /// Backend response shape.
    type Response: Send;

    /// Returns the stage name.
    fn name(&self) -> &str;

    /// Builds the backend request. Validation failures here mean the remote
    /// call is never issued.
    fn translate(&self, ctx: &StageContext<'_, M>) -> Result<Self::Request, ProvisionError>;

    /// Issues the remote call.
    async fn invoke(&self, request: Self::Request) -> Result<Self::Response, RemoteError>;

    /// Folds a successful response into the model and state.
    fn on_success(&self, response: Self::Response, model: M, state: CallbackState)
        -> StageResult<M>;

    /// Decides what a remote failure means. Defaults to a classified failure.
    fn on_error(&self, error: RemoteError, model: M, _state: CallbackState) -> StageResult<M> {
        StageResult::from_remote_error(model, &error)
    }

    /// Returns true if an earlier invocation already finished this call.
    fn is_complete(&self, _state: &CallbackState) -> bool {
        false
    }
}

/// Wraps a [`RemoteCall`] so a pipeline can run it.
#[derive(Debug)]
pub struct RemoteStage<C> {
    call: C,
}

impl<C> RemoteStage<C> {
    /// Creates a new remote stage.
    pub fn new(call: C) -> Self {
        Self { call }
    }

    /// Returns the wrapped call.
    pub fn call(&self) -> &C {
        &self.call
    }
}

#[async_trait]
impl<M, C> Stage<M> for RemoteStage<C>
where
    M: ResourceModel,
    C: RemoteCall<M>,
{
    fn name(&self) -> &str {
        self.call.name()
    }

    fn is_complete(&self, state: &CallbackState) -> bool {
        self.call.is_complete(state)
    }

    async fn execute(&self, ctx: StageContext<'_, M>) -> StageResult<M> {
        let request = match self.call.translate(&ctx) {
            Ok(request) => request,
            Err(err) => {
                debug!(stage = self.call.name(), error = %err, "Request translation failed");
                return StageResult::from_error(ctx.model, &err);
            }
        };

        match self.call.invoke(request).await {
            Ok(response) => self.call.on_success(response, ctx.model, ctx.state),
            Err(err) => {
                warn!(
                    stage = self.call.name(),
                    status = ?err.status_code(),
                    condition = ?err.condition_code(),
                    error = %err,
                    "Remote call failed"
                );
                self.call.on_error(err, ctx.model, ctx.state)
            }
        }
    }
}
