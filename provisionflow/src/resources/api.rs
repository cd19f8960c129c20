//! The narrow remote surface the outpost resources depend on.

use crate::errors::RemoteError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Condition raised when the caller already owns an access point with the
/// requested name.
pub const ACCESS_POINT_ALREADY_OWNED: &str = "AccessPointAlreadyOwnedByYou";
/// Condition raised for an unknown access point.
pub const NO_SUCH_ACCESS_POINT: &str = "NoSuchAccessPoint";
/// Condition raised when an access point has no policy attached.
pub const NO_SUCH_ACCESS_POINT_POLICY: &str = "NoSuchAccessPointPolicy";

/// Request to create an access point on an outpost bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateAccessPointRequest {
    /// Bucket ARN.
    pub bucket: String,
    /// Access point name.
    pub name: String,
    /// VPC the access point is restricted to.
    pub vpc_id: Option<String>,
    /// Idempotency token.
    pub client_token: String,
}

/// Response to a create call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateAccessPointResponse {
    /// ARN assigned by the backend. Backends may omit it while the access
    /// point is still being materialized.
    pub access_point_arn: Option<String>,
}

/// An access point as the backend describes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AccessPointDescription {
    /// Access point ARN.
    pub access_point_arn: String,
    /// Bucket ARN.
    pub bucket: String,
    /// Access point name.
    pub name: String,
    /// VPC restriction, if any.
    pub vpc_id: Option<String>,
}

/// One page of a listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AccessPointPage {
    /// Access points on this page.
    pub access_points: Vec<AccessPointDescription>,
    /// Token for the next page.
    pub next_token: Option<String>,
}

/// Outpost access point operations.
///
/// One call per backend operation. Implementations report failures as
/// [`RemoteError`] values carrying the status and, where the backend provides
/// one, a specific condition code.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OutpostsApi: Send + Sync + Debug {
    /// Creates an access point.
    async fn create_access_point(
        &self,
        request: CreateAccessPointRequest,
    ) -> Result<CreateAccessPointResponse, RemoteError>;

    /// Describes an access point.
    async fn get_access_point(&self, arn: &str) -> Result<AccessPointDescription, RemoteError>;

    /// Deletes an access point.
    async fn delete_access_point(&self, arn: &str) -> Result<(), RemoteError>;

    /// Lists one page of a bucket's access points.
    async fn list_access_points(
        &self,
        bucket: &str,
        next_token: Option<String>,
    ) -> Result<AccessPointPage, RemoteError>;

    /// Attaches a policy document, replacing any existing one.
    async fn put_access_point_policy(&self, arn: &str, policy: &str) -> Result<(), RemoteError>;

    /// Returns the attached policy document.
    async fn get_access_point_policy(&self, arn: &str) -> Result<String, RemoteError>;

    /// Removes the attached policy document.
    async fn delete_access_point_policy(&self, arn: &str) -> Result<(), RemoteError>;
}
