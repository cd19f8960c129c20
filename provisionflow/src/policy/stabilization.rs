//! Bounded stabilization policy.

use crate::core::{CallbackState, OutcomeCode, ResourceModel};
use crate::stages::{Stage, StageContext, StageResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// What happens once the attempt bound is reached without convergence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Exhaustion {
    /// Treat non-convergence as success.
    #[default]
    Succeed,
    /// Fail with the given outcome code.
    Fail(OutcomeCode),
}

/// Configuration for stabilization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StabilizationPolicy {
    /// Non-converged attempts tolerated before exhaustion.
    pub max_attempts: u32,
    /// Delay requested between attempts, in seconds.
    pub delay_seconds: u32,
    /// Outcome once attempts are exhausted.
    pub on_exhausted: Exhaustion,
}

impl Default for StabilizationPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            delay_seconds: 5,
            on_exhausted: Exhaustion::Succeed,
        }
    }
}

/// The decision the policy reached for one invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum StabilizationVerdict {
    /// Converged, or exhausted leniently. Proceed with this state.
    Proceed(CallbackState),
    /// Not yet converged. Suspend with this state and delay.
    Retry(CallbackState, u32),
    /// Exhausted and configured to fail.
    GiveUp(OutcomeCode),
}

impl StabilizationPolicy {
    /// Creates the default policy.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the attempt bound.
    #[must_use]
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    /// Sets the delay between attempts.
    #[must_use]
    pub fn with_delay_seconds(mut self, delay: u32) -> Self {
        self.delay_seconds = delay;
        self
    }

    /// Sets the exhaustion outcome.
    #[must_use]
    pub fn with_on_exhausted(mut self, on_exhausted: Exhaustion) -> Self {
        self.on_exhausted = on_exhausted;
        self
    }

    /// Decides what one invocation does given whether the resource converged.
    ///
    /// The bound is checked before counting, so a predicate that never holds
    /// produces exactly `max_attempts` retries and one final exhausted
    /// invocation.
    #[must_use]
    pub fn evaluate(&self, converged: bool, state: CallbackState) -> StabilizationVerdict {
        if converged {
            return StabilizationVerdict::Proceed(state.with_stabilized());
        }
        if state.stabilization_count >= self.max_attempts {
            return match self.on_exhausted {
                Exhaustion::Succeed => StabilizationVerdict::Proceed(state.with_stabilized()),
                Exhaustion::Fail(code) => StabilizationVerdict::GiveUp(code),
            };
        }
        StabilizationVerdict::Retry(state.with_stabilization_attempt(), self.delay_seconds)
    }
}

/// Runs a mutating stage and holds the pipeline until the predicate reports
/// convergence on the resulting model.
pub struct Stabilize<M> {
    inner: Arc<dyn Stage<M>>,
    converged: fn(&M) -> bool,
    policy: StabilizationPolicy,
}

impl<M: ResourceModel> Stabilize<M> {
    /// Wraps a stage.
    pub fn new(inner: Arc<dyn Stage<M>>, converged: fn(&M) -> bool, policy: StabilizationPolicy) -> Self {
        Self {
            inner,
            converged,
            policy,
        }
    }

    /// Returns the policy.
    pub fn policy(&self) -> &StabilizationPolicy {
        &self.policy
    }
}

impl<M> fmt::Debug for Stabilize<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stabilize")
            .field("inner", &self.inner.name())
            .field("policy", &self.policy)
            .finish()
    }
}

#[async_trait]
impl<M: ResourceModel> Stage<M> for Stabilize<M> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn is_complete(&self, state: &CallbackState) -> bool {
        state.stabilized
    }

    async fn execute(&self, ctx: StageContext<'_, M>) -> StageResult<M> {
        let (model, state) = match self.inner.execute(ctx).await {
            StageResult::Continue { model, state } => (model, state),
            other => return other,
        };

        let converged = (self.converged)(&model);
        match self.policy.evaluate(converged, state) {
            StabilizationVerdict::Proceed(state) => {
                if converged {
                    debug!(stage = self.inner.name(), "Stabilized");
                } else {
                    warn!(
                        stage = self.inner.name(),
                        attempts = state.stabilization_count,
                        "Stabilization attempts exhausted, proceeding"
                    );
                }
                StageResult::proceed(model, state)
            }
            StabilizationVerdict::Retry(state, delay) => {
                info!(
                    stage = self.inner.name(),
                    attempt = state.stabilization_count,
                    max_attempts = self.policy.max_attempts,
                    "Not yet stabilized"
                );
                StageResult::suspend(model, state, delay)
            }
            StabilizationVerdict::GiveUp(code) => StageResult::fail(
                model,
                code,
                format!(
                    "{} did not stabilize after {} attempts",
                    self.inner.name(),
                    self.policy.max_attempts
                ),
            ),
        }
    }
}
