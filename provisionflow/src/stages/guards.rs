//! Stages that validate, gate, or remember other stages.

use super::{Stage, StageContext, StageResult};
use crate::core::{CallbackState, OutcomeCode, ResourceModel};
use async_trait::async_trait;
use std::fmt::Debug;
use std::sync::Arc;
use tracing::debug;

/// Fails with `InvalidRequest` when a required attribute is missing.
///
/// Runs before any remote call, so a rejected invocation issues none.
pub struct Require<M> {
    name: String,
    field: String,
    check: fn(&M) -> bool,
}

impl<M: ResourceModel> Require<M> {
    /// Creates a requirement on an arbitrary attribute.
    pub fn attribute(field: impl Into<String>, check: fn(&M) -> bool) -> Self {
        let field = field.into();
        Self {
            name: format!("require-{}", field.to_ascii_lowercase()),
            field,
            check,
        }
    }

    /// Creates a requirement on the primary identifier.
    pub fn identifier(field: impl Into<String>) -> Self {
        Self::attribute(field, |model: &M| {
            model
                .primary_identifier()
                .is_some_and(|id| !id.trim().is_empty())
        })
    }
}

impl<M> Debug for Require<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Require")
            .field("name", &self.name)
            .field("field", &self.field)
            .finish()
    }
}

#[async_trait]
impl<M: ResourceModel> Stage<M> for Require<M> {
    fn name(&self) -> &str {
        &self.name
    }

    async fn execute(&self, ctx: StageContext<'_, M>) -> StageResult<M> {
        if (self.check)(&ctx.model) {
            return ctx.proceed();
        }
        debug!(stage = %self.name, field = %self.field, "Required attribute missing");
        StageResult::fail(
            ctx.model,
            OutcomeCode::InvalidRequest,
            format!("{} is required", self.field),
        )
    }
}

/// Runs the inner stage only when the model supplies the attribute it
/// configures; otherwise passes straight through.
pub struct Conditional<M> {
    inner: Arc<dyn Stage<M>>,
    attribute: String,
    predicate: fn(&M) -> bool,
}

impl<M: ResourceModel> Conditional<M> {
    /// Creates a conditional stage.
    pub fn new(
        attribute: impl Into<String>,
        predicate: fn(&M) -> bool,
        inner: Arc<dyn Stage<M>>,
    ) -> Self {
        Self {
            inner,
            attribute: attribute.into(),
            predicate,
        }
    }
}

impl<M: ResourceModel> Debug for Conditional<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Conditional")
            .field("attribute", &self.attribute)
            .field("inner", &self.inner)
            .finish()
    }
}

#[async_trait]
impl<M: ResourceModel> Stage<M> for Conditional<M> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn is_complete(&self, state: &CallbackState) -> bool {
        self.inner.is_complete(state)
    }

    async fn execute(&self, ctx: StageContext<'_, M>) -> StageResult<M> {
        if (self.predicate)(&ctx.model) {
            self.inner.execute(ctx).await
        } else {
            debug!(stage = self.inner.name(), attribute = %self.attribute, "Attribute absent, skipping");
            ctx.proceed()
        }
    }
}

/// Records the inner stage as completed once it continues, so later
/// invocations of the same operation do not repeat its remote effect.
#[derive(Debug)]
pub struct MarkComplete<M> {
    inner: Arc<dyn Stage<M>>,
}

impl<M: ResourceModel> MarkComplete<M> {
    /// Wraps a stage.
    pub fn new(inner: Arc<dyn Stage<M>>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<M: ResourceModel> Stage<M> for MarkComplete<M> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn is_complete(&self, state: &CallbackState) -> bool {
        state.is_stage_completed(self.inner.name()) || self.inner.is_complete(state)
    }

    async fn execute(&self, ctx: StageContext<'_, M>) -> StageResult<M> {
        match self.inner.execute(ctx).await {
            StageResult::Continue { model, state } => {
                let state = state.with_completed_stage(self.inner.name());
                StageResult::proceed(model, state)
            }
            other => other,
        }
    }
}
