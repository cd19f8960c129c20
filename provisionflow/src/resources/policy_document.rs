//! Access point policy calls shared by both outpost resources.
//!
//! Both models identify the access point the policy belongs to through their
//! primary identifier, so the probe and the put call work on either.

use super::api::{OutpostsApi, NO_SUCH_ACCESS_POINT_POLICY};
use crate::core::{CallbackState, ResourceModel};
use crate::errors::{ProvisionError, RemoteError, ValidationError};
use crate::stages::{Probe, RemoteCall, StageContext, StageResult};
use async_trait::async_trait;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Serializes a policy document for the backend.
pub fn to_document(policy: &Value) -> Result<String, ProvisionError> {
    Ok(serde_json::to_string(policy)?)
}

/// Parses a policy document returned by the backend.
pub fn parse_document(document: &str) -> Result<Value, ProvisionError> {
    Ok(serde_json::from_str(document)?)
}

pub(crate) fn require_arn<M: ResourceModel>(model: &M, field: &str) -> Result<String, ProvisionError> {
    model
        .primary_identifier()
        .filter(|arn| !arn.trim().is_empty())
        .map(str::to_string)
        .ok_or_else(|| ValidationError::missing(field).into())
}

/// Reads the policy attached to the model's access point.
///
/// A missing policy is reported as `None`.
#[derive(Debug)]
pub struct PolicyProbe {
    api: Arc<dyn OutpostsApi>,
}

impl PolicyProbe {
    /// Creates a probe.
    pub fn new(api: Arc<dyn OutpostsApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl<M: ResourceModel> Probe<M> for PolicyProbe {
    async fn probe(&self, model: &M) -> Result<Option<String>, ProvisionError> {
        let arn = require_arn(model, "AccessPointArn")?;
        match self.api.get_access_point_policy(&arn).await {
            Ok(document) => Ok(Some(document)),
            Err(err) if err.has_condition(NO_SUCH_ACCESS_POINT_POLICY) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }
}

/// Attaches the model's policy document to its access point.
pub struct PutPolicy<M> {
    api: Arc<dyn OutpostsApi>,
    policy: fn(&M) -> Option<&Value>,
}

impl<M> PutPolicy<M> {
    /// Creates the call; `policy` extracts the document from the model.
    pub fn new(api: Arc<dyn OutpostsApi>, policy: fn(&M) -> Option<&Value>) -> Self {
        Self { api, policy }
    }
}

impl<M> fmt::Debug for PutPolicy<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PutPolicy").field("api", &self.api).finish()
    }
}

#[async_trait]
impl<M: ResourceModel> RemoteCall<M> for PutPolicy<M> {
    type Request = (String, String);
    type Response = ();

    fn name(&self) -> &str {
        "put-access-point-policy"
    }

    fn translate(&self, ctx: &StageContext<'_, M>) -> Result<(String, String), ProvisionError> {
        let arn = require_arn(&ctx.model, "AccessPointArn")?;
        let policy = (self.policy)(&ctx.model).ok_or_else(|| ValidationError::missing("Policy"))?;
        Ok((arn, to_document(policy)?))
    }

    async fn invoke(&self, request: (String, String)) -> Result<(), RemoteError> {
        let (arn, document) = request;
        self.api.put_access_point_policy(&arn, &document).await
    }

    fn on_success(&self, _response: (), model: M, state: CallbackState) -> StageResult<M> {
        StageResult::proceed(model, state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_roundtrip_preserves_structure() {
        let policy = serde_json::json!({"Version": "2012-10-17", "Statement": []});
        let document = to_document(&policy).unwrap();
        assert_eq!(parse_document(&document).unwrap(), policy);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        let err = parse_document("{not json").unwrap_err();
        assert!(matches!(err, ProvisionError::Serialization(_)));
    }
}
