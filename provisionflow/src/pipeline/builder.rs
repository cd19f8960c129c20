//! Pipeline builder with validation.

use super::Pipeline;
use crate::core::ResourceModel;
use crate::errors::ProvisionError;
use crate::stages::Stage;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

/// Builder for creating validated pipelines.
pub struct PipelineBuilder<M> {
    name: String,
    stages: Vec<Arc<dyn Stage<M>>>,
}

impl<M: ResourceModel> PipelineBuilder<M> {
    /// Creates a new pipeline builder.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            stages: Vec::new(),
        }
    }

    /// Appends a stage.
    #[must_use]
    pub fn stage(mut self, stage: impl Stage<M> + 'static) -> Self {
        self.stages.push(Arc::new(stage));
        self
    }

    /// Appends an already shared stage.
    #[must_use]
    pub fn shared_stage(mut self, stage: Arc<dyn Stage<M>>) -> Self {
        self.stages.push(stage);
        self
    }

    /// Returns the pipeline name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the number of stages.
    #[must_use]
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    /// Builds the pipeline.
    ///
    /// Stage names must be unique: completion markers in the callback state
    /// are keyed by name.
    pub fn build(self) -> Result<Pipeline<M>, ProvisionError> {
        if self.name.trim().is_empty() {
            return Err(ProvisionError::internal(
                "Pipeline name cannot be empty or whitespace-only",
            ));
        }
        if self.stages.is_empty() {
            return Err(ProvisionError::internal(format!(
                "Pipeline '{}' has no stages",
                self.name
            )));
        }

        let mut seen = HashSet::new();
        for stage in &self.stages {
            if !seen.insert(stage.name()) {
                return Err(ProvisionError::internal(format!(
                    "Pipeline '{}' declares stage '{}' more than once",
                    self.name,
                    stage.name()
                )));
            }
        }

        Ok(Pipeline::new(self.name, self.stages))
    }
}

impl<M> fmt::Debug for PipelineBuilder<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineBuilder")
            .field("name", &self.name)
            .field("stages", &self.stages.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stages::{Require, StageContext, StageResult, FnStage};
    use crate::testing::SampleModel;

    fn passthrough(name: &str) -> FnStage<SampleModel> {
        FnStage::new(name, |ctx: StageContext<'_, SampleModel>| ctx.proceed())
    }

    #[test]
    fn test_build_pipeline() {
        let pipeline = PipelineBuilder::new("create")
            .stage(Require::<SampleModel>::identifier("Id"))
            .stage(passthrough("a"))
            .build()
            .unwrap();

        assert_eq!(pipeline.name(), "create");
        assert_eq!(pipeline.stage_names(), vec!["require-id", "a"]);
    }

    #[test]
    fn test_empty_pipeline_rejected() {
        let err = PipelineBuilder::<SampleModel>::new("empty").build().unwrap_err();
        assert!(err.to_string().contains("has no stages"));
    }

    #[test]
    fn test_blank_name_rejected() {
        let result = PipelineBuilder::new("  ").stage(passthrough("a")).build();
        assert!(result.is_err());
    }

    #[test]
    fn test_duplicate_stage_names_rejected() {
        let err = PipelineBuilder::new("dup")
            .stage(passthrough("a"))
            .stage(FnStage::new("a", |ctx: StageContext<'_, SampleModel>| {
                StageResult::done(ctx.model)
            }))
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }
}
