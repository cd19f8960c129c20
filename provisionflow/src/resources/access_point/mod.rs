//! Outpost access point resource.
//!
//! | Operation | Stages |
//! |---|---|
//! | Create | require bucket, require name, create (stabilized), compose ARN if still unknown, propagation, policy check, policy put, read back |
//! | Read | require ARN, describe, read policy |
//! | Update | require ARN, describe, reconcile policy, read back |
//! | Delete | require ARN, delete, verify gone |
//! | List | require bucket, one page |
//!
//! The policy stages of Create only run when the desired model carries a
//! policy.

mod stages;

pub use stages::{
    ComposeArn, CreateAccessPoint, DeleteAccessPoint, DescribeAccessPoint, ListAccessPoints, ReadPolicy,
    ReconcilePolicy, VerifyDeleted,
};

use super::api::{AccessPointDescription, OutpostsApi};
use super::policy_document::{PolicyProbe, PutPolicy};
use crate::config::EngineConfig;
use crate::core::{OperationKind, ResourceModel};
use crate::errors::ProvisionError;
use crate::orchestrator::Orchestrator;
use crate::pipeline::{Pipeline, PipelineBuilder};
use crate::policy::{PropagationGate, Stabilize};
use crate::stages::{
    Conditional, MarkComplete, PreExistenceCheck, Probe, ReadAfterWrite, RemoteStage, Require, Stage,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// VPC restriction of an access point.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct VpcConfiguration {
    /// VPC id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vpc_id: Option<String>,
}

/// Desired or observed state of one access point.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AccessPoint {
    /// ARN, assigned on creation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arn: Option<String>,
    /// ARN of the bucket the access point belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bucket: Option<String>,
    /// Access point name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// VPC restriction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vpc_configuration: Option<VpcConfiguration>,
    /// Attached policy document.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy: Option<Value>,
}

impl AccessPoint {
    /// Creates a desired model for a new access point.
    #[must_use]
    pub fn new(bucket: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            bucket: Some(bucket.into()),
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Creates a model naming an existing access point.
    #[must_use]
    pub fn with_arn(arn: impl Into<String>) -> Self {
        Self {
            arn: Some(arn.into()),
            ..Self::default()
        }
    }

    /// Sets the VPC restriction.
    #[must_use]
    pub fn with_vpc(mut self, vpc_id: impl Into<String>) -> Self {
        self.vpc_configuration = Some(VpcConfiguration {
            vpc_id: Some(vpc_id.into()),
        });
        self
    }

    /// Sets the policy document.
    #[must_use]
    pub fn with_policy(mut self, policy: Value) -> Self {
        self.policy = Some(policy);
        self
    }

    /// Returns the VPC id, if restricted.
    #[must_use]
    pub fn vpc_id(&self) -> Option<&str> {
        self.vpc_configuration
            .as_ref()
            .and_then(|vpc| vpc.vpc_id.as_deref())
    }

    /// Builds a model from a backend description. The policy is read
    /// separately.
    #[must_use]
    pub fn from_description(description: AccessPointDescription) -> Self {
        Self {
            arn: Some(description.access_point_arn),
            bucket: Some(description.bucket),
            name: Some(description.name),
            vpc_configuration: description.vpc_id.map(|vpc_id| VpcConfiguration {
                vpc_id: Some(vpc_id),
            }),
            policy: None,
        }
    }
}

impl ResourceModel for AccessPoint {
    fn primary_identifier(&self) -> Option<&str> {
        self.arn.as_deref()
    }

    fn set_primary_identifier(&mut self, identifier: String) {
        self.arn = Some(identifier);
    }

    fn merge(self, fresh: Self) -> Self {
        Self {
            arn: fresh.arn.or(self.arn),
            bucket: fresh.bucket.or(self.bucket),
            name: fresh.name.or(self.name),
            vpc_configuration: fresh.vpc_configuration.or(self.vpc_configuration),
            policy: fresh.policy.or(self.policy),
        }
    }
}

fn has_bucket(model: &AccessPoint) -> bool {
    model.bucket.as_deref().is_some_and(|b| !b.trim().is_empty())
}

fn has_name(model: &AccessPoint) -> bool {
    model.name.as_deref().is_some_and(|n| !n.trim().is_empty())
}

fn has_policy(model: &AccessPoint) -> bool {
    model.policy.is_some()
}

fn has_arn(model: &AccessPoint) -> bool {
    model.arn.is_some()
}

fn policy_of(model: &AccessPoint) -> Option<&Value> {
    model.policy.as_ref()
}

/// Builds the read pipeline.
pub fn read_pipeline(api: &Arc<dyn OutpostsApi>) -> Result<Pipeline<AccessPoint>, ProvisionError> {
    PipelineBuilder::<AccessPoint>::new("access-point-read")
        .stage(Require::identifier("Arn"))
        .stage(RemoteStage::new(DescribeAccessPoint::adopt(api.clone())))
        .stage(RemoteStage::new(ReadPolicy::new(api.clone())))
        .build()
}

/// Builds the create pipeline.
pub fn create_pipeline(
    api: &Arc<dyn OutpostsApi>,
    read: Arc<Pipeline<AccessPoint>>,
    config: &EngineConfig,
) -> Result<Pipeline<AccessPoint>, ProvisionError> {
    let create: Arc<dyn Stage<AccessPoint>> =
        Arc::new(RemoteStage::new(CreateAccessPoint::new(api.clone())));
    let probe: Arc<dyn Probe<AccessPoint>> = Arc::new(PolicyProbe::new(api.clone()));
    let check: Arc<dyn Stage<AccessPoint>> =
        Arc::new(PreExistenceCheck::absent("check-access-point-policy", probe));
    let put: Arc<dyn Stage<AccessPoint>> =
        Arc::new(RemoteStage::new(PutPolicy::<AccessPoint>::new(api.clone(), policy_of)));

    PipelineBuilder::<AccessPoint>::new("access-point-create")
        .stage(Require::attribute("Bucket", has_bucket))
        .stage(Require::attribute("Name", has_name))
        .stage(Stabilize::new(create, has_arn, config.stabilization))
        .stage(ComposeArn)
        .stage(PropagationGate::new(config.propagation))
        .stage(Conditional::new("Policy", has_policy, check))
        .stage(Conditional::new("Policy", has_policy, put))
        .stage(ReadAfterWrite::new(read))
        .build()
}

/// Builds the update pipeline.
pub fn update_pipeline(
    api: &Arc<dyn OutpostsApi>,
    read: Arc<Pipeline<AccessPoint>>,
) -> Result<Pipeline<AccessPoint>, ProvisionError> {
    PipelineBuilder::<AccessPoint>::new("access-point-update")
        .stage(Require::identifier("Arn"))
        .stage(RemoteStage::new(DescribeAccessPoint::verify(api.clone())))
        .stage(ReconcilePolicy::new(api.clone()))
        .stage(ReadAfterWrite::new(read))
        .build()
}

/// Builds the delete pipeline.
pub fn delete_pipeline(
    api: &Arc<dyn OutpostsApi>,
    config: &EngineConfig,
) -> Result<Pipeline<AccessPoint>, ProvisionError> {
    let delete: Arc<dyn Stage<AccessPoint>> = Arc::new(RemoteStage::new(DeleteAccessPoint::new(
        api.clone(),
        config.conflict_retry_delay_seconds,
    )));

    PipelineBuilder::<AccessPoint>::new("access-point-delete")
        .stage(Require::identifier("Arn"))
        .stage(MarkComplete::new(delete))
        .stage(VerifyDeleted::new(api.clone(), config.stabilization))
        .build()
}

/// Builds the list pipeline.
pub fn list_pipeline(api: &Arc<dyn OutpostsApi>) -> Result<Pipeline<AccessPoint>, ProvisionError> {
    PipelineBuilder::<AccessPoint>::new("access-point-list")
        .stage(Require::attribute("Bucket", has_bucket))
        .stage(RemoteStage::new(ListAccessPoints::new(api.clone())))
        .build()
}

/// Builds an orchestrator serving every access point operation.
pub fn handlers(
    api: Arc<dyn OutpostsApi>,
    config: &EngineConfig,
) -> Result<Orchestrator<AccessPoint>, ProvisionError> {
    config.validate()?;
    let read = Arc::new(read_pipeline(&api)?);

    Ok(Orchestrator::new()
        .with_pipeline(OperationKind::Create, Arc::new(create_pipeline(&api, read.clone(), config)?))
        .with_pipeline(OperationKind::Read, read.clone())
        .with_pipeline(OperationKind::Update, Arc::new(update_pipeline(&api, read)?))
        .with_pipeline(OperationKind::Delete, Arc::new(delete_pipeline(&api, config)?))
        .with_pipeline(OperationKind::List, Arc::new(list_pipeline(&api)?)))
}
