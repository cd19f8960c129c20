//! Stage trait and reusable stage combinators.
//!
//! Stages are the units of remote work a pipeline sequences. A stage consumes
//! the current model and callback state and hands back a [`StageResult`]; it
//! keeps nothing between invocations.

mod guards;
mod pre_existence;
mod read_back;
mod remote;
mod result;

pub use guards::{Conditional, MarkComplete, Require};
pub use pre_existence::{Expectation, PreExistenceCheck, Probe};
pub use read_back::ReadAfterWrite;
pub use remote::{RemoteCall, RemoteStage};
pub use result::StageResult;

use crate::core::{CallbackState, OperationKind, ResourceModel};
use async_trait::async_trait;
use std::fmt::Debug;

/// Everything a stage sees during one invocation.
#[derive(Debug, Clone)]
pub struct StageContext<'a, M> {
    /// The operation being performed.
    pub operation: OperationKind,
    /// The model as updated by earlier stages.
    pub model: M,
    /// The previous model (update/delete only).
    pub previous_model: Option<&'a M>,
    /// Progress carried across invocations.
    pub state: CallbackState,
    /// Pagination token (list only).
    pub next_token: Option<&'a str>,
}

impl<'a, M> StageContext<'a, M> {
    /// Creates a context for a fresh invocation.
    #[must_use]
    pub fn new(operation: OperationKind, model: M) -> Self {
        Self {
            operation,
            model,
            previous_model: None,
            state: CallbackState::new(),
            next_token: None,
        }
    }

    /// Sets the callback state.
    #[must_use]
    pub fn with_state(mut self, state: CallbackState) -> Self {
        self.state = state;
        self
    }

    /// Sets the previous model.
    #[must_use]
    pub fn with_previous_model(mut self, previous: Option<&'a M>) -> Self {
        self.previous_model = previous;
        self
    }

    /// Sets the pagination token.
    #[must_use]
    pub fn with_next_token(mut self, token: Option<&'a str>) -> Self {
        self.next_token = token;
        self
    }

    /// Passes the model and state through unchanged.
    #[must_use]
    pub fn proceed(self) -> StageResult<M> {
        StageResult::proceed(self.model, self.state)
    }
}

/// Trait for pipeline stages.
#[async_trait]
pub trait Stage<M>: Send + Sync + Debug {
    /// Returns the name of the stage.
    fn name(&self) -> &str;

    /// Returns true if an earlier invocation already finished this stage.
    ///
    /// Completed stages are skipped when an operation resumes.
    fn is_complete(&self, _state: &CallbackState) -> bool {
        false
    }

    /// Executes the stage.
    async fn execute(&self, ctx: StageContext<'_, M>) -> StageResult<M>;
}

/// A simple function-based stage.
pub struct FnStage<M> {
    name: String,
    func: Box<dyn Fn(StageContext<'_, M>) -> StageResult<M> + Send + Sync>,
}

impl<M> FnStage<M> {
    /// Creates a new function-based stage.
    pub fn new<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(StageContext<'_, M>) -> StageResult<M> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            func: Box::new(func),
        }
    }
}

impl<M> Debug for FnStage<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnStage").field("name", &self.name).finish()
    }
}

#[async_trait]
impl<M: ResourceModel> Stage<M> for FnStage<M> {
    fn name(&self) -> &str {
        &self.name
    }

    async fn execute(&self, ctx: StageContext<'_, M>) -> StageResult<M> {
        (self.func)(ctx)
    }
}
