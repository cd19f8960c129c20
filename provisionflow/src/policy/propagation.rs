//! Forced propagation delay.

use crate::core::{CallbackState, ResourceModel};
use crate::stages::{Stage, StageContext, StageResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::marker::PhantomData;
use tracing::{debug, info};

/// Configuration for the propagation gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PropagationPolicy {
    /// Suspend cycles served before the gate opens.
    pub cycles: u32,
    /// Delay requested per cycle, in seconds.
    pub delay_seconds: u32,
}

impl Default for PropagationPolicy {
    fn default() -> Self {
        Self {
            cycles: 4,
            delay_seconds: 20,
        }
    }
}

impl PropagationPolicy {
    /// Creates the default policy.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the number of cycles.
    #[must_use]
    pub fn with_cycles(mut self, cycles: u32) -> Self {
        self.cycles = cycles;
        self
    }

    /// Sets the delay per cycle.
    #[must_use]
    pub fn with_delay_seconds(mut self, delay: u32) -> Self {
        self.delay_seconds = delay;
        self
    }

    /// Total forced wait, in seconds.
    #[must_use]
    pub fn total_delay_seconds(&self) -> u32 {
        self.cycles.saturating_mul(self.delay_seconds)
    }

    /// Applies the gate to a state.
    ///
    /// Returns `Ok` with the state to continue with once the gate is open, or
    /// `Err` with the state and delay to suspend with. Once open it stays open.
    pub fn gate(&self, state: CallbackState) -> Result<CallbackState, (CallbackState, u32)> {
        if state.propagated {
            return Ok(state);
        }
        if state.forced_delay_count >= self.cycles {
            return Ok(state.with_propagated());
        }
        Err((state.with_forced_delay(), self.delay_seconds))
    }
}

/// Holds the pipeline for a fixed number of delayed re-invocations.
#[derive(Debug)]
pub struct PropagationGate<M> {
    policy: PropagationPolicy,
    _model: PhantomData<fn() -> M>,
}

impl<M: ResourceModel> PropagationGate<M> {
    /// Creates a gate.
    pub fn new(policy: PropagationPolicy) -> Self {
        Self {
            policy,
            _model: PhantomData,
        }
    }
}

#[async_trait]
impl<M: ResourceModel> Stage<M> for PropagationGate<M> {
    fn name(&self) -> &str {
        "propagation"
    }

    fn is_complete(&self, state: &CallbackState) -> bool {
        state.propagated
    }

    async fn execute(&self, ctx: StageContext<'_, M>) -> StageResult<M> {
        match self.policy.gate(ctx.state) {
            Ok(state) => {
                debug!(cycles = state.forced_delay_count, "Propagation complete");
                StageResult::proceed(ctx.model, state)
            }
            Err((state, delay)) => {
                info!(
                    cycle = state.forced_delay_count,
                    cycles = self.policy.cycles,
                    delay_seconds = delay,
                    "Waiting for propagation"
                );
                StageResult::suspend(ctx.model, state, delay)
            }
        }
    }
}
