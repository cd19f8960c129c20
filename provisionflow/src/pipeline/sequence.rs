//! Ordered stage sequence and its interpreter loop.

use crate::core::{CallbackState, OutcomeCode, ResourceModel};
use crate::events::{self, EventSink};
use crate::stages::{Stage, StageContext, StageResult};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// How one run of a pipeline ended.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineOutcome<M> {
    /// Every stage continued, or one finished the operation early.
    Succeeded {
        /// Final model (absent after a delete).
        model: Option<M>,
        /// List results.
        models: Option<Vec<M>>,
        /// List pagination token.
        next_token: Option<String>,
    },
    /// A stage asked to be re-invoked.
    Suspended {
        /// Model to report.
        model: M,
        /// State to carry forward.
        state: CallbackState,
        /// Requested delay in seconds.
        delay_seconds: u32,
        /// The suspending stage.
        stage: String,
    },
    /// A stage failed.
    Failed {
        /// Model to report.
        model: M,
        /// Classified outcome.
        code: OutcomeCode,
        /// Failure description.
        message: String,
        /// The failing stage.
        stage: String,
    },
}

impl<M> PipelineOutcome<M> {
    /// Returns true if the run succeeded.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded { .. })
    }

    /// Returns the outcome code of a failure.
    #[must_use]
    pub fn outcome_code(&self) -> Option<OutcomeCode> {
        match self {
            Self::Failed { code, .. } => Some(*code),
            _ => None,
        }
    }
}

/// An ordered list of stages run for one operation kind.
///
/// The run stops at the first stage that does not continue. Stages an earlier
/// invocation already completed are skipped.
pub struct Pipeline<M> {
    name: String,
    stages: Vec<Arc<dyn Stage<M>>>,
}

impl<M: ResourceModel> Pipeline<M> {
    pub(super) fn new(name: String, stages: Vec<Arc<dyn Stage<M>>>) -> Self {
        Self { name, stages }
    }

    /// Returns the pipeline name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the stage names in execution order.
    #[must_use]
    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// Runs the stages in order starting from the given context.
    pub async fn run(&self, ctx: StageContext<'_, M>, sink: &dyn EventSink) -> PipelineOutcome<M> {
        let StageContext {
            operation,
            mut model,
            previous_model,
            mut state,
            next_token,
        } = ctx;

        for stage in &self.stages {
            let stage_name = stage.name();
            if stage.is_complete(&state) {
                debug!(pipeline = %self.name, stage = stage_name, "Stage already complete, skipping");
                sink
                    .emit(
                        events::STAGE_SKIPPED,
                        Some(events::event_payload(serde_json::json!({
                            "pipeline": self.name,
                            "stage": stage_name,
                        }))),
                    )
                    .await;
                continue;
            }

            let stage_ctx = StageContext {
                operation,
                model,
                previous_model,
                state,
                next_token,
            };

            match stage.execute(stage_ctx).await {
                StageResult::Continue {
                    model: next_model,
                    state: next_state,
                } => {
                    debug!(pipeline = %self.name, stage = stage_name, "Stage completed");
                    sink
                        .emit(
                            events::STAGE_COMPLETED,
                            Some(events::event_payload(serde_json::json!({
                                "pipeline": self.name,
                                "stage": stage_name,
                            }))),
                        )
                        .await;
                    model = next_model;
                    state = next_state;
                }
                StageResult::Suspend {
                    model,
                    state,
                    delay_seconds,
                } => {
                    info!(
                        pipeline = %self.name,
                        stage = stage_name,
                        delay_seconds,
                        forced_delay_count = state.forced_delay_count,
                        stabilization_count = state.stabilization_count,
                        "Stage suspended"
                    );
                    sink
                        .emit(
                            events::STAGE_SUSPENDED,
                            Some(events::event_payload(serde_json::json!({
                                "pipeline": self.name,
                                "stage": stage_name,
                                "delay_seconds": delay_seconds,
                                "forced_delay_count": state.forced_delay_count,
                                "stabilization_count": state.stabilization_count,
                            }))),
                        )
                        .await;
                    return PipelineOutcome::Suspended {
                        model,
                        state,
                        delay_seconds,
                        stage: stage_name.to_string(),
                    };
                }
                StageResult::Fail {
                    model,
                    code,
                    message,
                } => {
                    warn!(
                        pipeline = %self.name,
                        stage = stage_name,
                        outcome = %code,
                        message = %message,
                        "Stage failed"
                    );
                    sink
                        .emit(
                            events::STAGE_FAILED,
                            Some(events::event_payload(serde_json::json!({
                                "pipeline": self.name,
                                "stage": stage_name,
                                "outcome": code,
                                "message": message,
                            }))),
                        )
                        .await;
                    return PipelineOutcome::Failed {
                        model,
                        code,
                        message,
                        stage: stage_name.to_string(),
                    };
                }
                StageResult::Done {
                    model,
                    models,
                    next_token,
                } => {
                    debug!(pipeline = %self.name, stage = stage_name, "Stage finished the operation");
                    sink
                        .emit(
                            events::STAGE_DONE,
                            Some(events::event_payload(serde_json::json!({
                                "pipeline": self.name,
                                "stage": stage_name,
                            }))),
                        )
                        .await;
                    return PipelineOutcome::Succeeded {
                        model,
                        models,
                        next_token,
                    };
                }
            }
        }

        PipelineOutcome::Succeeded {
            model: Some(model),
            models: None,
            next_token: None,
        }
    }
}

impl<M> fmt::Debug for Pipeline<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("name", &self.name)
            .field("stages", &self.stages.iter().map(|s| s.name().to_string()).collect::<Vec<_>>())
            .finish()
    }
}
