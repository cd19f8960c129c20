//! Outpost access point policy, managed as its own resource.
//!
//! An access point carries at most one policy, so Create refuses to replace
//! a policy it did not attach and Update and Delete refuse to act on one that
//! is not there. The access point ARN is the primary identifier.

use super::api::{OutpostsApi, NO_SUCH_ACCESS_POINT_POLICY};
use super::policy_document::{parse_document, require_arn, PolicyProbe, PutPolicy};
use crate::config::EngineConfig;
use crate::core::{CallbackState, OperationKind, ResourceModel};
use crate::errors::{ProvisionError, RemoteError};
use crate::orchestrator::Orchestrator;
use crate::pipeline::{Pipeline, PipelineBuilder};
use crate::stages::{
    PreExistenceCheck, Probe, ReadAfterWrite, RemoteCall, RemoteStage, Require, StageContext,
    StageResult,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

const POLICY_CHECK: &str = "check-access-point-policy";

/// Desired or observed policy of one access point.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AccessPointPolicy {
    /// ARN of the access point the policy is attached to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_point_arn: Option<String>,
    /// Policy document.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy: Option<Value>,
}

impl AccessPointPolicy {
    /// Creates a desired model.
    #[must_use]
    pub fn new(access_point_arn: impl Into<String>, policy: Value) -> Self {
        Self {
            access_point_arn: Some(access_point_arn.into()),
            policy: Some(policy),
        }
    }

    /// Creates a model naming the access point only.
    #[must_use]
    pub fn for_access_point(access_point_arn: impl Into<String>) -> Self {
        Self {
            access_point_arn: Some(access_point_arn.into()),
            policy: None,
        }
    }
}

impl ResourceModel for AccessPointPolicy {
    fn primary_identifier(&self) -> Option<&str> {
        self.access_point_arn.as_deref()
    }

    fn set_primary_identifier(&mut self, identifier: String) {
        self.access_point_arn = Some(identifier);
    }

    fn merge(self, fresh: Self) -> Self {
        Self {
            access_point_arn: fresh.access_point_arn.or(self.access_point_arn),
            policy: fresh.policy.or(self.policy),
        }
    }
}

fn has_policy(model: &AccessPointPolicy) -> bool {
    model.policy.is_some()
}

fn policy_of(model: &AccessPointPolicy) -> Option<&Value> {
    model.policy.as_ref()
}

/// Reads the attached policy. Read treats a missing policy as a missing
/// resource; List treats it as an empty page.
#[derive(Debug)]
pub struct GetPolicy {
    api: Arc<dyn OutpostsApi>,
    listing: bool,
}

impl GetPolicy {
    /// Creates the call for Read.
    pub fn read(api: Arc<dyn OutpostsApi>) -> Self {
        Self { api, listing: false }
    }

    /// Creates the call for List.
    pub fn list(api: Arc<dyn OutpostsApi>) -> Self {
        Self { api, listing: true }
    }
}

#[async_trait]
impl RemoteCall<AccessPointPolicy> for GetPolicy {
    type Request = String;
    type Response = String;

    fn name(&self) -> &str {
        if self.listing {
            "list-access-point-policies"
        } else {
            "get-access-point-policy"
        }
    }

    fn translate(&self, ctx: &StageContext<'_, AccessPointPolicy>) -> Result<String, ProvisionError> {
        require_arn(&ctx.model, "AccessPointArn")
    }

    async fn invoke(&self, arn: String) -> Result<String, RemoteError> {
        self.api.get_access_point_policy(&arn).await
    }

    fn on_success(
        &self,
        response: String,
        mut model: AccessPointPolicy,
        state: CallbackState,
    ) -> StageResult<AccessPointPolicy> {
        let policy = match parse_document(&response) {
            Ok(policy) => policy,
            Err(err) => return StageResult::from_error(model, &err),
        };
        model.policy = Some(policy);
        if self.listing {
            StageResult::done_list(vec![model], None)
        } else {
            StageResult::proceed(model, state)
        }
    }

    fn on_error(
        &self,
        error: RemoteError,
        model: AccessPointPolicy,
        _state: CallbackState,
    ) -> StageResult<AccessPointPolicy> {
        if self.listing && error.has_condition(NO_SUCH_ACCESS_POINT_POLICY) {
            return StageResult::done_list(Vec::new(), None);
        }
        StageResult::from_remote_error(model, &error)
    }
}

/// Detaches the policy. Success ends the operation with no model.
#[derive(Debug)]
pub struct DeletePolicy {
    api: Arc<dyn OutpostsApi>,
}

impl DeletePolicy {
    /// Creates the call.
    pub fn new(api: Arc<dyn OutpostsApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl RemoteCall<AccessPointPolicy> for DeletePolicy {
    type Request = String;
    type Response = ();

    fn name(&self) -> &str {
        "delete-access-point-policy"
    }

    fn translate(&self, ctx: &StageContext<'_, AccessPointPolicy>) -> Result<String, ProvisionError> {
        require_arn(&ctx.model, "AccessPointArn")
    }

    async fn invoke(&self, arn: String) -> Result<(), RemoteError> {
        self.api.delete_access_point_policy(&arn).await
    }

    fn on_success(
        &self,
        _response: (),
        _model: AccessPointPolicy,
        _state: CallbackState,
    ) -> StageResult<AccessPointPolicy> {
        StageResult::done_empty()
    }
}

fn probe(api: &Arc<dyn OutpostsApi>) -> Arc<dyn Probe<AccessPointPolicy>> {
    Arc::new(PolicyProbe::new(api.clone()))
}

/// Builds the read pipeline.
pub fn read_pipeline(api: &Arc<dyn OutpostsApi>) -> Result<Pipeline<AccessPointPolicy>, ProvisionError> {
    PipelineBuilder::<AccessPointPolicy>::new("access-point-policy-read")
        .stage(Require::identifier("AccessPointArn"))
        .stage(RemoteStage::new(GetPolicy::read(api.clone())))
        .build()
}

/// Builds the create pipeline.
pub fn create_pipeline(
    api: &Arc<dyn OutpostsApi>,
    read: Arc<Pipeline<AccessPointPolicy>>,
) -> Result<Pipeline<AccessPointPolicy>, ProvisionError> {
    PipelineBuilder::<AccessPointPolicy>::new("access-point-policy-create")
        .stage(Require::identifier("AccessPointArn"))
        .stage(Require::attribute("Policy", has_policy))
        .stage(PreExistenceCheck::absent(POLICY_CHECK, probe(api)))
        .stage(RemoteStage::new(PutPolicy::<AccessPointPolicy>::new(api.clone(), policy_of)))
        .stage(ReadAfterWrite::new(read))
        .build()
}

/// Builds the update pipeline.
pub fn update_pipeline(
    api: &Arc<dyn OutpostsApi>,
    read: Arc<Pipeline<AccessPointPolicy>>,
) -> Result<Pipeline<AccessPointPolicy>, ProvisionError> {
    PipelineBuilder::<AccessPointPolicy>::new("access-point-policy-update")
        .stage(Require::identifier("AccessPointArn"))
        .stage(Require::attribute("Policy", has_policy))
        .stage(PreExistenceCheck::present(POLICY_CHECK, probe(api)))
        .stage(RemoteStage::new(PutPolicy::<AccessPointPolicy>::new(api.clone(), policy_of)))
        .stage(ReadAfterWrite::new(read))
        .build()
}

/// Builds the delete pipeline.
pub fn delete_pipeline(api: &Arc<dyn OutpostsApi>) -> Result<Pipeline<AccessPointPolicy>, ProvisionError> {
    PipelineBuilder::<AccessPointPolicy>::new("access-point-policy-delete")
        .stage(Require::identifier("AccessPointArn"))
        .stage(PreExistenceCheck::present(POLICY_CHECK, probe(api)))
        .stage(RemoteStage::new(DeletePolicy::new(api.clone())))
        .build()
}

/// Builds the list pipeline. A page holds the one attached policy, if any.
pub fn list_pipeline(api: &Arc<dyn OutpostsApi>) -> Result<Pipeline<AccessPointPolicy>, ProvisionError> {
    PipelineBuilder::<AccessPointPolicy>::new("access-point-policy-list")
        .stage(Require::identifier("AccessPointArn"))
        .stage(RemoteStage::new(GetPolicy::list(api.clone())))
        .build()
}

/// Builds an orchestrator serving every access point policy operation.
pub fn handlers(
    api: Arc<dyn OutpostsApi>,
    config: &EngineConfig,
) -> Result<Orchestrator<AccessPointPolicy>, ProvisionError> {
    config.validate()?;
    let read = Arc::new(read_pipeline(&api)?);

    Ok(Orchestrator::new()
        .with_pipeline(OperationKind::Create, Arc::new(create_pipeline(&api, read.clone())?))
        .with_pipeline(OperationKind::Read, read.clone())
        .with_pipeline(OperationKind::Update, Arc::new(update_pipeline(&api, read)?))
        .with_pipeline(OperationKind::Delete, Arc::new(delete_pipeline(&api)?))
        .with_pipeline(OperationKind::List, Arc::new(list_pipeline(&api)?)))
}
