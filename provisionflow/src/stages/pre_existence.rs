//! Pre-existence checks for sub-resources limited to one per parent.

use super::{Stage, StageContext, StageResult};
use crate::core::{OutcomeCode, ResourceModel};
use crate::errors::ProvisionError;
use async_trait::async_trait;
use std::fmt::Debug;
use std::sync::Arc;
use tracing::debug;

/// Reads the current value of a sub-resource.
///
/// Implementations turn the backend's specific "no such sub-resource"
/// condition into `Ok(None)`; only other failures are errors.
#[async_trait]
pub trait Probe<M>: Send + Sync + Debug {
    /// Returns the current value, or `None` if there is none.
    async fn probe(&self, model: &M) -> Result<Option<String>, ProvisionError>;
}

/// What the check expects to observe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expectation {
    /// Creating: an existing value is fatal `AlreadyExists`.
    Absent,
    /// Updating: a missing value is fatal `NotFound`.
    Present,
}

/// Probes a sub-resource before it is mutated.
#[derive(Debug)]
pub struct PreExistenceCheck<M> {
    name: String,
    probe: Arc<dyn Probe<M>>,
    expectation: Expectation,
}

impl<M: ResourceModel> PreExistenceCheck<M> {
    /// Creates a check.
    pub fn new(
        name: impl Into<String>,
        probe: Arc<dyn Probe<M>>,
        expectation: Expectation,
    ) -> Self {
        Self {
            name: name.into(),
            probe,
            expectation,
        }
    }

    /// Creates a check expecting no existing value.
    pub fn absent(name: impl Into<String>, probe: Arc<dyn Probe<M>>) -> Self {
        Self::new(name, probe, Expectation::Absent)
    }

    /// Creates a check expecting an existing value.
    pub fn present(name: impl Into<String>, probe: Arc<dyn Probe<M>>) -> Self {
        Self::new(name, probe, Expectation::Present)
    }
}

#[async_trait]
impl<M: ResourceModel> Stage<M> for PreExistenceCheck<M> {
    fn name(&self) -> &str {
        &self.name
    }

    async fn execute(&self, ctx: StageContext<'_, M>) -> StageResult<M> {
        let observed = match self.probe.probe(&ctx.model).await {
            Ok(value) => value,
            Err(err) => return StageResult::from_error(ctx.model, &err),
        };
        // An empty document counts as nothing attached.
        let exists = observed.is_some_and(|v| !v.trim().is_empty());
        debug!(stage = %self.name, exists, expectation = ?self.expectation, "Pre-existence probe");

        match (self.expectation, exists) {
            (Expectation::Absent, false) | (Expectation::Present, true) => ctx.proceed(),
            (Expectation::Absent, true) => StageResult::fail(
                ctx.model,
                OutcomeCode::AlreadyExists,
                format!("{} already exists", self.name),
            ),
            (Expectation::Present, false) => StageResult::fail(
                ctx.model,
                OutcomeCode::NotFound,
                format!("{} does not exist", self.name),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::OperationKind;
    use crate::errors::RemoteError;
    use crate::testing::SampleModel;

    #[derive(Debug)]
    struct FixedProbe(Result<Option<String>, ProvisionError>);

    #[async_trait]
    impl Probe<SampleModel> for FixedProbe {
        async fn probe(&self, _model: &SampleModel) -> Result<Option<String>, ProvisionError> {
            self.0.clone()
        }
    }

    async fn run(
        expectation: Expectation,
        observed: Result<Option<String>, ProvisionError>,
    ) -> StageResult<SampleModel> {
        let check: PreExistenceCheck<SampleModel> =
            PreExistenceCheck::new("policy", Arc::new(FixedProbe(observed)), expectation);
        check
            .execute(StageContext::new(OperationKind::Create, SampleModel::new()))
            .await
    }

    #[tokio::test]
    async fn test_absent_expected_and_absent() {
        assert!(run(Expectation::Absent, Ok(None)).await.is_continue());
        assert!(run(Expectation::Absent, Ok(Some("  ".to_string()))).await.is_continue());
    }

    #[tokio::test]
    async fn test_absent_expected_but_present() {
        let result = run(Expectation::Absent, Ok(Some("{}".to_string()))).await;
        assert_eq!(result.outcome_code(), Some(OutcomeCode::AlreadyExists));
    }

    #[tokio::test]
    async fn test_present_expected_but_absent() {
        let result = run(Expectation::Present, Ok(None)).await;
        assert_eq!(result.outcome_code(), Some(OutcomeCode::NotFound));
    }

    #[tokio::test]
    async fn test_present_expected_and_present() {
        assert!(run(Expectation::Present, Ok(Some("{}".to_string()))).await.is_continue());
    }

    #[tokio::test]
    async fn test_probe_failure_is_classified() {
        let err = ProvisionError::from(RemoteError::status(403, "denied"));
        let result = run(Expectation::Absent, Err(err)).await;
        assert_eq!(result.outcome_code(), Some(OutcomeCode::AccessDenied));
    }
}
