//! Test fixtures for pipeline testing.

use crate::core::{ProgressEnvelope, ResourceModel};
use crate::orchestrator::{InvocationRequest, Orchestrator};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A minimal resource model: an optional identifier plus string attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleModel {
    /// Primary identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Other attributes.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attrs: BTreeMap<String, String>,
}

impl SampleModel {
    /// Creates an empty model.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a model with an identifier.
    #[must_use]
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            attrs: BTreeMap::new(),
        }
    }

    /// Sets an attribute.
    #[must_use]
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }

    /// Gets an attribute.
    #[must_use]
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs.get(key).map(String::as_str)
    }
}

impl ResourceModel for SampleModel {
    fn primary_identifier(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn set_primary_identifier(&mut self, identifier: String) {
        self.id = Some(identifier);
    }

    fn merge(mut self, fresh: Self) -> Self {
        if fresh.id.is_some() {
            self.id = fresh.id;
        }
        self.attrs.extend(fresh.attrs);
        self
    }
}

/// Replays the scheduler contract against an orchestrator.
///
/// Feeds every IN_PROGRESS envelope's callback state back with the unchanged
/// models until a terminal envelope arrives or `max_invocations` is reached.
/// Returns every envelope produced, in order.
pub async fn drive_to_completion<M: ResourceModel>(
    orchestrator: &Orchestrator<M>,
    request: InvocationRequest<M>,
    max_invocations: usize,
) -> Vec<ProgressEnvelope<M>> {
    let mut envelopes = Vec::new();
    let mut next = Some(request);

    while let Some(request) = next.take() {
        if envelopes.len() >= max_invocations {
            break;
        }
        let envelope = orchestrator.handle(request.clone()).await;
        next = request.next_invocation(&envelope);
        envelopes.push(envelope);
    }

    envelopes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_model_builders() {
        let model = SampleModel::with_id("id-1").with_attr("name", "web");
        assert_eq!(model.primary_identifier(), Some("id-1"));
        assert_eq!(model.attr("name"), Some("web"));
        assert_eq!(model.attr("missing"), None);
    }

    #[test]
    fn test_merge_prefers_fresh_values() {
        let local = SampleModel::new().with_attr("name", "web").with_attr("size", "1");
        let fresh = SampleModel::with_id("id-1").with_attr("size", "2");

        let merged = local.merge(fresh);
        assert_eq!(merged.primary_identifier(), Some("id-1"));
        assert_eq!(merged.attr("name"), Some("web"));
        assert_eq!(merged.attr("size"), Some("2"));
    }

    #[test]
    fn test_drive_stops_at_invocation_cap() {
        use crate::core::OperationKind;
        use crate::pipeline::PipelineBuilder;
        use crate::stages::{FnStage, StageContext, StageResult};
        use std::sync::Arc;

        let pipeline = PipelineBuilder::<SampleModel>::new("create")
            .stage(FnStage::new("forever", |ctx: StageContext<'_, SampleModel>| {
                StageResult::suspend(ctx.model, ctx.state, 1)
            }))
            .build()
            .unwrap();
        let orchestrator =
            Orchestrator::new().with_pipeline(OperationKind::Create, Arc::new(pipeline));

        let envelopes = tokio_test::block_on(drive_to_completion(
            &orchestrator,
            InvocationRequest::create(SampleModel::new()),
            3,
        ));
        assert_eq!(envelopes.len(), 3);
        assert!(envelopes.iter().all(|e| !e.is_terminal()));
    }
}
