//! Tagged stage result interpreted by the pipeline loop.

use crate::classify::{classify, classify_remote};
use crate::core::{CallbackState, OutcomeCode};
use crate::errors::{ProvisionError, RemoteError};

/// What a stage decided.
///
/// Only `Continue` lets the pipeline move on; every other variant ends the
/// current invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum StageResult<M> {
    /// Proceed to the next stage with the updated model and state.
    Continue {
        /// Updated model.
        model: M,
        /// Updated state.
        state: CallbackState,
    },
    /// Not yet done; re-invoke after the delay with this state.
    Suspend {
        /// Model to report.
        model: M,
        /// State to carry forward.
        state: CallbackState,
        /// Requested delay in seconds.
        delay_seconds: u32,
    },
    /// Terminal failure.
    Fail {
        /// Model to report.
        model: M,
        /// Classified outcome.
        code: OutcomeCode,
        /// Failure description.
        message: String,
    },
    /// Terminal success, skipping any remaining stages.
    Done {
        /// Model to report (absent after a delete).
        model: Option<M>,
        /// Models for a list operation.
        models: Option<Vec<M>>,
        /// Pagination token for a list operation.
        next_token: Option<String>,
    },
}

impl<M> StageResult<M> {
    /// Creates a continue result.
    #[must_use]
    pub fn proceed(model: M, state: CallbackState) -> Self {
        Self::Continue { model, state }
    }

    /// Creates a suspend result.
    #[must_use]
    pub fn suspend(model: M, state: CallbackState, delay_seconds: u32) -> Self {
        Self::Suspend {
            model,
            state,
            delay_seconds,
        }
    }

    /// Creates a failure result.
    #[must_use]
    pub fn fail(model: M, code: OutcomeCode, message: impl Into<String>) -> Self {
        Self::Fail {
            model,
            code,
            message: message.into(),
        }
    }

    /// Creates a failure result by classifying an engine error.
    #[must_use]
    pub fn from_error(model: M, error: &ProvisionError) -> Self {
        Self::fail(model, classify(error), error.to_string())
    }

    /// Creates a failure result by classifying a remote error.
    #[must_use]
    pub fn from_remote_error(model: M, error: &RemoteError) -> Self {
        Self::fail(model, classify_remote(error), error.message())
    }

    /// Creates a terminal success carrying a model.
    #[must_use]
    pub fn done(model: M) -> Self {
        Self::Done {
            model: Some(model),
            models: None,
            next_token: None,
        }
    }

    /// Creates a terminal success with no model.
    #[must_use]
    pub fn done_empty() -> Self {
        Self::Done {
            model: None,
            models: None,
            next_token: None,
        }
    }

    /// Creates a terminal success for a list page.
    #[must_use]
    pub fn done_list(models: Vec<M>, next_token: Option<String>) -> Self {
        Self::Done {
            model: None,
            models: Some(models),
            next_token,
        }
    }

    /// Returns true if the pipeline may move on.
    #[must_use]
    pub fn is_continue(&self) -> bool {
        matches!(self, Self::Continue { .. })
    }

    /// Returns the outcome code of a failure.
    #[must_use]
    pub fn outcome_code(&self) -> Option<OutcomeCode> {
        match self {
            Self::Fail { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Returns the carried state, if the result carries one.
    #[must_use]
    pub fn state(&self) -> Option<&CallbackState> {
        match self {
            Self::Continue { state, .. } | Self::Suspend { state, .. } => Some(state),
            Self::Fail { .. } | Self::Done { .. } => None,
        }
    }

    /// Short label for logs and events.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Continue { .. } => "continue",
            Self::Suspend { .. } => "suspend",
            Self::Fail { .. } => "fail",
            Self::Done { .. } => "done",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ValidationError;

    #[test]
    fn test_proceed() {
        let result = StageResult::proceed("m", CallbackState::new());
        assert!(result.is_continue());
        assert_eq!(result.label(), "continue");
        assert!(result.state().is_some());
    }

    #[test]
    fn test_from_remote_error_classifies() {
        let err = RemoteError::condition(404, "NoSuchAccessPoint", "missing");
        let result = StageResult::from_remote_error("m", &err);

        assert_eq!(result.outcome_code(), Some(OutcomeCode::NotFound));
        match result {
            StageResult::Fail { message, .. } => assert_eq!(message, "missing"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_from_error_classifies_validation() {
        let err = ProvisionError::from(ValidationError::missing("Arn"));
        let result = StageResult::from_error("m", &err);
        assert_eq!(result.outcome_code(), Some(OutcomeCode::InvalidRequest));
    }

    #[test]
    fn test_done_variants() {
        let result: StageResult<&str> = StageResult::done_empty();
        assert_eq!(result.label(), "done");
        assert!(result.state().is_none());

        let result = StageResult::done_list(vec!["a"], Some("next".to_string()));
        match result {
            StageResult::Done {
                models, next_token, ..
            } => {
                assert_eq!(models, Some(vec!["a"]));
                assert_eq!(next_token.as_deref(), Some("next"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
