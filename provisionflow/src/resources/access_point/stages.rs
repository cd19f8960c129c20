//! Remote stages of the access point pipelines.

use super::AccessPoint;
use crate::classify::is_transient_conflict;
use crate::core::{CallbackState, ResourceModel};
use crate::errors::{ProvisionError, RemoteError, ValidationError};
use crate::policy::{StabilizationPolicy, StabilizationVerdict};
use crate::resources::api::{
    AccessPointDescription, AccessPointPage, CreateAccessPointRequest, CreateAccessPointResponse,
    OutpostsApi, ACCESS_POINT_ALREADY_OWNED, NO_SUCH_ACCESS_POINT, NO_SUCH_ACCESS_POINT_POLICY,
};
use crate::resources::identity::{access_point_arn, ArnKind, ResourceArn};
use crate::resources::policy_document::{parse_document, require_arn, to_document};
use crate::stages::{RemoteCall, Stage, StageContext, StageResult};
use crate::utils::client_token;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, warn};

fn required<'m>(value: Option<&'m str>, field: &str) -> Result<&'m str, ValidationError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ValidationError::missing(field))
}

/// Records the identifier in both the model and the state, so resumed
/// invocations see it even though the scheduler replays the desired model.
fn adopt_arn(mut model: AccessPoint, state: CallbackState, arn: String) -> StageResult<AccessPoint> {
    let state = state.with_primary_identifier(arn.clone());
    model.set_primary_identifier(arn);
    StageResult::proceed(model, state)
}

/// Creates the access point.
///
/// The request carries a client token derived from bucket and name, and an
/// "already owned by you" answer is taken as a previous attempt that
/// succeeded unobserved.
#[derive(Debug)]
pub struct CreateAccessPoint {
    api: Arc<dyn OutpostsApi>,
}

impl CreateAccessPoint {
    /// Creates the call.
    pub fn new(api: Arc<dyn OutpostsApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl RemoteCall<AccessPoint> for CreateAccessPoint {
    type Request = CreateAccessPointRequest;
    type Response = CreateAccessPointResponse;

    fn name(&self) -> &str {
        "create-access-point"
    }

    fn translate(
        &self,
        ctx: &StageContext<'_, AccessPoint>,
    ) -> Result<CreateAccessPointRequest, ProvisionError> {
        let bucket = required(ctx.model.bucket.as_deref(), "Bucket")?;
        let name = required(ctx.model.name.as_deref(), "Name")?;
        ResourceArn::parse_kind(bucket, ArnKind::Bucket)?;

        Ok(CreateAccessPointRequest {
            bucket: bucket.to_string(),
            name: name.to_string(),
            vpc_id: ctx.model.vpc_id().map(str::to_string),
            client_token: client_token(&["create-access-point", bucket, name]),
        })
    }

    async fn invoke(
        &self,
        request: CreateAccessPointRequest,
    ) -> Result<CreateAccessPointResponse, RemoteError> {
        self.api.create_access_point(request).await
    }

    fn on_success(
        &self,
        response: CreateAccessPointResponse,
        model: AccessPoint,
        state: CallbackState,
    ) -> StageResult<AccessPoint> {
        match response.access_point_arn {
            Some(arn) => adopt_arn(model, state, arn),
            None => {
                debug!("Create response carried no ARN yet");
                StageResult::proceed(model, state)
            }
        }
    }

    fn on_error(
        &self,
        error: RemoteError,
        model: AccessPoint,
        state: CallbackState,
    ) -> StageResult<AccessPoint> {
        if !error.has_condition(ACCESS_POINT_ALREADY_OWNED) {
            return StageResult::from_remote_error(model, &error);
        }
        let composed = match (model.bucket.as_deref(), model.name.as_deref()) {
            (Some(bucket), Some(name)) => access_point_arn(bucket, name),
            _ => Err(ValidationError::missing("Bucket")),
        };
        match composed {
            Ok(arn) => {
                info!(arn = %arn, "Access point already owned, continuing with it");
                adopt_arn(model, state, arn)
            }
            Err(err) => StageResult::from_error(model, &err.into()),
        }
    }
}

/// Fills in the ARN from bucket and name when the backend never reported
/// one, so a create that gave up waiting still leaves with an identifier.
#[derive(Debug, Clone, Copy, Default)]
pub struct ComposeArn;

#[async_trait]
impl Stage<AccessPoint> for ComposeArn {
    fn name(&self) -> &str {
        "compose-access-point-arn"
    }

    async fn execute(&self, ctx: StageContext<'_, AccessPoint>) -> StageResult<AccessPoint> {
        if ctx.model.arn.is_some() {
            return ctx.proceed();
        }
        let composed = required(ctx.model.bucket.as_deref(), "Bucket")
            .and_then(|bucket| Ok((bucket, required(ctx.model.name.as_deref(), "Name")?)))
            .and_then(|(bucket, name)| access_point_arn(bucket, name));
        match composed {
            Ok(arn) => {
                warn!(arn = %arn, "Backend reported no ARN, using the composed one");
                adopt_arn(ctx.model, ctx.state, arn)
            }
            Err(err) => StageResult::from_error(ctx.model, &err.into()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DescribeMode {
    Adopt,
    Verify,
}

/// Describes the access point.
#[derive(Debug)]
pub struct DescribeAccessPoint {
    api: Arc<dyn OutpostsApi>,
    mode: DescribeMode,
}

impl DescribeAccessPoint {
    /// Replaces the model with what the backend reports.
    pub fn adopt(api: Arc<dyn OutpostsApi>) -> Self {
        Self {
            api,
            mode: DescribeMode::Adopt,
        }
    }

    /// Checks the access point exists and fills in what the model leaves
    /// unset, keeping the desired attributes.
    pub fn verify(api: Arc<dyn OutpostsApi>) -> Self {
        Self {
            api,
            mode: DescribeMode::Verify,
        }
    }
}

#[async_trait]
impl RemoteCall<AccessPoint> for DescribeAccessPoint {
    type Request = String;
    type Response = AccessPointDescription;

    fn name(&self) -> &str {
        "describe-access-point"
    }

    fn translate(&self, ctx: &StageContext<'_, AccessPoint>) -> Result<String, ProvisionError> {
        require_arn(&ctx.model, "Arn")
    }

    async fn invoke(&self, arn: String) -> Result<AccessPointDescription, RemoteError> {
        self.api.get_access_point(&arn).await
    }

    fn on_success(
        &self,
        response: AccessPointDescription,
        model: AccessPoint,
        state: CallbackState,
    ) -> StageResult<AccessPoint> {
        let observed = AccessPoint::from_description(response);
        let model = match self.mode {
            DescribeMode::Adopt => observed,
            DescribeMode::Verify => AccessPoint {
                policy: model.policy,
                ..observed
            },
        };
        StageResult::proceed(model, state)
    }
}

/// Reads the attached policy. A missing policy is no policy.
#[derive(Debug)]
pub struct ReadPolicy {
    api: Arc<dyn OutpostsApi>,
}

impl ReadPolicy {
    /// Creates the call.
    pub fn new(api: Arc<dyn OutpostsApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl RemoteCall<AccessPoint> for ReadPolicy {
    type Request = String;
    type Response = String;

    fn name(&self) -> &str {
        "read-access-point-policy"
    }

    fn translate(&self, ctx: &StageContext<'_, AccessPoint>) -> Result<String, ProvisionError> {
        require_arn(&ctx.model, "Arn")
    }

    async fn invoke(&self, arn: String) -> Result<String, RemoteError> {
        self.api.get_access_point_policy(&arn).await
    }

    fn on_success(
        &self,
        response: String,
        mut model: AccessPoint,
        state: CallbackState,
    ) -> StageResult<AccessPoint> {
        match parse_document(&response) {
            Ok(policy) => {
                model.policy = Some(policy);
                StageResult::proceed(model, state)
            }
            Err(err) => StageResult::from_error(model, &err),
        }
    }

    fn on_error(
        &self,
        error: RemoteError,
        mut model: AccessPoint,
        state: CallbackState,
    ) -> StageResult<AccessPoint> {
        if error.has_condition(NO_SUCH_ACCESS_POINT_POLICY) {
            model.policy = None;
            return StageResult::proceed(model, state);
        }
        StageResult::from_remote_error(model, &error)
    }
}

/// Brings the attached policy in line with the desired model.
///
/// A desired policy is put. A policy present only in the previous model is
/// deleted. With neither, nothing is called.
#[derive(Debug)]
pub struct ReconcilePolicy {
    api: Arc<dyn OutpostsApi>,
}

impl ReconcilePolicy {
    /// Creates the stage.
    pub fn new(api: Arc<dyn OutpostsApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl Stage<AccessPoint> for ReconcilePolicy {
    fn name(&self) -> &str {
        "reconcile-access-point-policy"
    }

    async fn execute(&self, ctx: StageContext<'_, AccessPoint>) -> StageResult<AccessPoint> {
        let arn = match require_arn(&ctx.model, "Arn") {
            Ok(arn) => arn,
            Err(err) => return StageResult::from_error(ctx.model, &err),
        };
        let previously_attached = ctx
            .previous_model
            .is_some_and(|previous| previous.policy.is_some());

        match ctx.model.policy.as_ref() {
            Some(policy) => {
                let document = match to_document(policy) {
                    Ok(document) => document,
                    Err(err) => return StageResult::from_error(ctx.model, &err),
                };
                debug!(arn = %arn, "Putting access point policy");
                match self.api.put_access_point_policy(&arn, &document).await {
                    Ok(()) => ctx.proceed(),
                    Err(err) => StageResult::from_remote_error(ctx.model, &err),
                }
            }
            None if previously_attached => {
                debug!(arn = %arn, "Removing access point policy");
                match self.api.delete_access_point_policy(&arn).await {
                    Ok(()) => ctx.proceed(),
                    Err(err) if err.has_condition(NO_SUCH_ACCESS_POINT_POLICY) => ctx.proceed(),
                    Err(err) => StageResult::from_remote_error(ctx.model, &err),
                }
            }
            None => ctx.proceed(),
        }
    }
}

/// Deletes the access point. Known transient conflicts suspend instead of
/// failing.
///
/// A missing access point fails with NotFound even when an earlier attempt
/// deleted it unobserved, as the resource contract requires Delete of an
/// absent resource to report NotFound.
#[derive(Debug)]
pub struct DeleteAccessPoint {
    api: Arc<dyn OutpostsApi>,
    conflict_retry_delay_seconds: u32,
}

impl DeleteAccessPoint {
    /// Creates the call.
    pub fn new(api: Arc<dyn OutpostsApi>, conflict_retry_delay_seconds: u32) -> Self {
        Self {
            api,
            conflict_retry_delay_seconds,
        }
    }
}

#[async_trait]
impl RemoteCall<AccessPoint> for DeleteAccessPoint {
    type Request = String;
    type Response = ();

    fn name(&self) -> &str {
        "delete-access-point"
    }

    fn translate(&self, ctx: &StageContext<'_, AccessPoint>) -> Result<String, ProvisionError> {
        require_arn(&ctx.model, "Arn")
    }

    async fn invoke(&self, arn: String) -> Result<(), RemoteError> {
        self.api.delete_access_point(&arn).await
    }

    fn on_success(&self, _response: (), model: AccessPoint, state: CallbackState) -> StageResult<AccessPoint> {
        StageResult::proceed(model, state)
    }

    fn on_error(
        &self,
        error: RemoteError,
        model: AccessPoint,
        state: CallbackState,
    ) -> StageResult<AccessPoint> {
        if is_transient_conflict(&error) {
            info!(
                delay_seconds = self.conflict_retry_delay_seconds,
                message = error.message(),
                "Access point not yet deletable, retrying later"
            );
            return StageResult::suspend(model, state, self.conflict_retry_delay_seconds);
        }
        StageResult::from_remote_error(model, &error)
    }
}

/// Confirms the access point is gone.
///
/// A "not found" answer is the expected outcome and ends the operation with
/// success. An access point still present is retried under the
/// stabilization policy.
#[derive(Debug)]
pub struct VerifyDeleted {
    api: Arc<dyn OutpostsApi>,
    policy: StabilizationPolicy,
}

impl VerifyDeleted {
    /// Creates the stage.
    pub fn new(api: Arc<dyn OutpostsApi>, policy: StabilizationPolicy) -> Self {
        Self { api, policy }
    }
}

#[async_trait]
impl Stage<AccessPoint> for VerifyDeleted {
    fn name(&self) -> &str {
        "verify-access-point-deleted"
    }

    async fn execute(&self, ctx: StageContext<'_, AccessPoint>) -> StageResult<AccessPoint> {
        let arn = match require_arn(&ctx.model, "Arn") {
            Ok(arn) => arn,
            Err(err) => return StageResult::from_error(ctx.model, &err),
        };

        match self.api.get_access_point(&arn).await {
            Err(err) if err.has_condition(NO_SUCH_ACCESS_POINT) || err.status_code() == Some(404) => {
                debug!(arn = %arn, "Access point deletion confirmed");
                StageResult::done_empty()
            }
            Err(err) => StageResult::from_remote_error(ctx.model, &err),
            Ok(_) => match self.policy.evaluate(false, ctx.state) {
                StabilizationVerdict::Retry(state, delay) => {
                    info!(
                        arn = %arn,
                        attempt = state.stabilization_count,
                        "Access point still present after delete"
                    );
                    StageResult::suspend(ctx.model, state, delay)
                }
                StabilizationVerdict::Proceed(_) => {
                    warn!(arn = %arn, "Access point still present, giving up waiting");
                    StageResult::done_empty()
                }
                StabilizationVerdict::GiveUp(code) => StageResult::fail(
                    ctx.model,
                    code,
                    format!("Access point {arn} still present after delete"),
                ),
            },
        }
    }
}

/// Lists one page of a bucket's access points.
#[derive(Debug)]
pub struct ListAccessPoints {
    api: Arc<dyn OutpostsApi>,
}

impl ListAccessPoints {
    /// Creates the call.
    pub fn new(api: Arc<dyn OutpostsApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl RemoteCall<AccessPoint> for ListAccessPoints {
    type Request = (String, Option<String>);
    type Response = AccessPointPage;

    fn name(&self) -> &str {
        "list-access-points"
    }

    fn translate(
        &self,
        ctx: &StageContext<'_, AccessPoint>,
    ) -> Result<(String, Option<String>), ProvisionError> {
        let bucket = required(ctx.model.bucket.as_deref(), "Bucket")?;
        Ok((bucket.to_string(), ctx.next_token.map(str::to_string)))
    }

    async fn invoke(&self, request: (String, Option<String>)) -> Result<AccessPointPage, RemoteError> {
        let (bucket, next_token) = request;
        self.api.list_access_points(&bucket, next_token).await
    }

    fn on_success(
        &self,
        response: AccessPointPage,
        _model: AccessPoint,
        _state: CallbackState,
    ) -> StageResult<AccessPoint> {
        let models = response
            .access_points
            .into_iter()
            .map(AccessPoint::from_description)
            .collect();
        StageResult::done_list(models, response.next_token)
    }
}
