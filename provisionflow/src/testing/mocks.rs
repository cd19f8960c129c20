//! In-memory outpost backend for testing.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap, VecDeque};

use crate::errors::RemoteError;
use crate::resources::api::{
    AccessPointDescription, AccessPointPage, CreateAccessPointRequest, CreateAccessPointResponse,
    OutpostsApi, ACCESS_POINT_ALREADY_OWNED, NO_SUCH_ACCESS_POINT, NO_SUCH_ACCESS_POINT_POLICY,
};
use crate::resources::identity::access_point_arn;

#[derive(Debug, Clone)]
struct StoredAccessPoint {
    description: AccessPointDescription,
    policy: Option<String>,
}

#[derive(Debug, Default)]
struct FakeState {
    access_points: BTreeMap<String, StoredAccessPoint>,
    calls: HashMap<&'static str, usize>,
    failures: HashMap<&'static str, VecDeque<RemoteError>>,
    tokens: HashMap<String, String>,
    withhold_arn: usize,
    linger_after_delete: usize,
    lingering: BTreeMap<String, StoredAccessPoint>,
}

/// An [`OutpostsApi`] backed by a map, with call counters and failure
/// injection.
///
/// Operation names used by [`FakeOutposts::calls`] and
/// [`FakeOutposts::fail_next`] are the trait method names.
#[derive(Debug)]
pub struct FakeOutposts {
    state: Mutex<FakeState>,
    page_size: usize,
}

impl Default for FakeOutposts {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeOutposts {
    /// Creates an empty backend.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Mutex::new(FakeState::default()),
            page_size: 100,
        }
    }

    /// Sets the listing page size.
    #[must_use]
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Seeds an access point, optionally with a policy.
    pub fn insert_access_point(&self, description: AccessPointDescription, policy: Option<&str>) {
        self.state.lock().access_points.insert(
            description.access_point_arn.clone(),
            StoredAccessPoint {
                description,
                policy: policy.map(str::to_string),
            },
        );
    }

    /// Queues an error for the next call of an operation.
    pub fn fail_next(&self, operation: &'static str, error: RemoteError) {
        self.state
            .lock()
            .failures
            .entry(operation)
            .or_default()
            .push_back(error);
    }

    /// Makes the next `count` create responses omit the assigned ARN.
    pub fn withhold_arn(&self, count: usize) {
        self.state.lock().withhold_arn = count;
    }

    /// Keeps deleted access points describable for `count` more lookups.
    pub fn linger_after_delete(&self, count: usize) {
        self.state.lock().linger_after_delete = count;
    }

    /// Returns how often an operation was called.
    #[must_use]
    pub fn calls(&self, operation: &str) -> usize {
        self.state.lock().calls.get(operation).copied().unwrap_or(0)
    }

    /// Returns the total number of calls across all operations.
    #[must_use]
    pub fn total_calls(&self) -> usize {
        self.state.lock().calls.values().sum()
    }

    /// Returns true if the access point exists.
    #[must_use]
    pub fn contains(&self, arn: &str) -> bool {
        self.state.lock().access_points.contains_key(arn)
    }

    /// Returns the policy attached to an access point.
    #[must_use]
    pub fn policy(&self, arn: &str) -> Option<String> {
        self.state
            .lock()
            .access_points
            .get(arn)
            .and_then(|ap| ap.policy.clone())
    }

    fn begin(&self, operation: &'static str) -> Result<parking_lot::MutexGuard<'_, FakeState>, RemoteError> {
        let mut state = self.state.lock();
        *state.calls.entry(operation).or_insert(0) += 1;
        if let Some(err) = state.failures.get_mut(operation).and_then(VecDeque::pop_front) {
            return Err(err);
        }
        Ok(state)
    }
}

fn no_such_access_point(arn: &str) -> RemoteError {
    RemoteError::condition(404, NO_SUCH_ACCESS_POINT, format!("The specified access point does not exist: {arn}"))
}

#[async_trait]
impl OutpostsApi for FakeOutposts {
    async fn create_access_point(
        &self,
        request: CreateAccessPointRequest,
    ) -> Result<CreateAccessPointResponse, RemoteError> {
        let mut state = self.begin("create_access_point")?;
        let arn = access_point_arn(&request.bucket, &request.name)
            .map_err(|err| RemoteError::condition(400, "InvalidRequest", err.to_string()))?;

        if state.access_points.contains_key(&arn) {
            if state.tokens.get(&request.client_token) != Some(&arn) {
                return Err(RemoteError::condition(
                    409,
                    ACCESS_POINT_ALREADY_OWNED,
                    "Your previous request to create the named access point succeeded and you already own it.",
                ));
            }
        } else {
            state.tokens.insert(request.client_token.clone(), arn.clone());
            let description = AccessPointDescription {
                access_point_arn: arn.clone(),
                bucket: request.bucket,
                name: request.name,
                vpc_id: request.vpc_id,
            };
            state.access_points.insert(
                arn.clone(),
                StoredAccessPoint {
                    description,
                    policy: None,
                },
            );
        }

        if state.withhold_arn > 0 {
            state.withhold_arn -= 1;
            return Ok(CreateAccessPointResponse::default());
        }
        Ok(CreateAccessPointResponse {
            access_point_arn: Some(arn),
        })
    }

    async fn get_access_point(&self, arn: &str) -> Result<AccessPointDescription, RemoteError> {
        let mut state = self.begin("get_access_point")?;
        if let Some(ap) = state.access_points.get(arn) {
            return Ok(ap.description.clone());
        }
        if state.linger_after_delete > 0 {
            if let Some(ap) = state.lingering.get(arn).cloned() {
                state.linger_after_delete -= 1;
                return Ok(ap.description);
            }
        }
        Err(no_such_access_point(arn))
    }

    async fn delete_access_point(&self, arn: &str) -> Result<(), RemoteError> {
        let mut state = self.begin("delete_access_point")?;
        match state.access_points.remove(arn) {
            Some(ap) => {
                state.lingering.insert(arn.to_string(), ap);
                Ok(())
            }
            None => Err(no_such_access_point(arn)),
        }
    }

    async fn list_access_points(
        &self,
        bucket: &str,
        next_token: Option<String>,
    ) -> Result<AccessPointPage, RemoteError> {
        let state = self.begin("list_access_points")?;
        let start = match next_token {
            Some(token) => token
                .parse::<usize>()
                .map_err(|_| RemoteError::condition(400, "InvalidRequest", "invalid next token"))?,
            None => 0,
        };

        let matching: Vec<_> = state
            .access_points
            .values()
            .filter(|ap| ap.description.bucket == bucket)
            .map(|ap| ap.description.clone())
            .collect();
        let end = (start + self.page_size).min(matching.len());
        let access_points = matching.get(start..end).map(<[_]>::to_vec).unwrap_or_default();

        Ok(AccessPointPage {
            access_points,
            next_token: (end < matching.len()).then(|| end.to_string()),
        })
    }

    async fn put_access_point_policy(&self, arn: &str, policy: &str) -> Result<(), RemoteError> {
        let mut state = self.begin("put_access_point_policy")?;
        if serde_json::from_str::<serde_json::Value>(policy).is_err() {
            return Err(RemoteError::condition(400, "MalformedPolicy", "Policies must be valid JSON"));
        }
        match state.access_points.get_mut(arn) {
            Some(ap) => {
                ap.policy = Some(policy.to_string());
                Ok(())
            }
            None => Err(no_such_access_point(arn)),
        }
    }

    async fn get_access_point_policy(&self, arn: &str) -> Result<String, RemoteError> {
        let state = self.begin("get_access_point_policy")?;
        match state.access_points.get(arn) {
            Some(StoredAccessPoint {
                policy: Some(policy),
                ..
            }) => Ok(policy.clone()),
            Some(_) => Err(RemoteError::condition(
                404,
                NO_SUCH_ACCESS_POINT_POLICY,
                "The specified access point does not have a policy",
            )),
            None => Err(no_such_access_point(arn)),
        }
    }

    async fn delete_access_point_policy(&self, arn: &str) -> Result<(), RemoteError> {
        let mut state = self.begin("delete_access_point_policy")?;
        match state.access_points.get_mut(arn) {
            Some(ap) => {
                ap.policy = None;
                Ok(())
            }
            None => Err(no_such_access_point(arn)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BUCKET: &str = "arn:aws:s3-outposts:us-west-2:123456789012:outpost/op-1/bucket/logs";

    fn request(name: &str, token: &str) -> CreateAccessPointRequest {
        CreateAccessPointRequest {
            bucket: BUCKET.to_string(),
            name: name.to_string(),
            vpc_id: None,
            client_token: token.to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_is_idempotent_per_token() {
        let fake = FakeOutposts::new();
        let first = fake.create_access_point(request("ap", "t1")).await.unwrap();
        let replay = fake.create_access_point(request("ap", "t1")).await.unwrap();
        assert_eq!(first, replay);

        let err = fake.create_access_point(request("ap", "t2")).await.unwrap_err();
        assert!(err.has_condition(ACCESS_POINT_ALREADY_OWNED));
        assert_eq!(fake.calls("create_access_point"), 3);
    }

    #[tokio::test]
    async fn test_injected_failure_is_consumed() {
        let fake = FakeOutposts::new();
        fake.fail_next("get_access_point", RemoteError::status(503, "slow down"));

        let err = fake.get_access_point("arn").await.unwrap_err();
        assert_eq!(err.status_code(), Some(503));
        let err = fake.get_access_point("arn").await.unwrap_err();
        assert!(err.has_condition(NO_SUCH_ACCESS_POINT));
    }

    #[tokio::test]
    async fn test_listing_pages() {
        let fake = FakeOutposts::new().with_page_size(2);
        for (i, name) in ["a", "b", "c"].iter().enumerate() {
            fake.create_access_point(request(name, &i.to_string())).await.unwrap();
        }

        let first = fake.list_access_points(BUCKET, None).await.unwrap();
        assert_eq!(first.access_points.len(), 2);
        let second = fake
            .list_access_points(BUCKET, first.next_token.clone())
            .await
            .unwrap();
        assert_eq!(second.access_points.len(), 1);
        assert_eq!(second.next_token, None);
    }

    #[tokio::test]
    async fn test_policy_lifecycle() {
        let fake = FakeOutposts::new();
        let arn = fake
            .create_access_point(request("ap", "t"))
            .await
            .unwrap()
            .access_point_arn
            .unwrap();

        let err = fake.get_access_point_policy(&arn).await.unwrap_err();
        assert!(err.has_condition(NO_SUCH_ACCESS_POINT_POLICY));

        fake.put_access_point_policy(&arn, "{}").await.unwrap();
        assert_eq!(fake.policy(&arn).as_deref(), Some("{}"));

        let err = fake.put_access_point_policy(&arn, "not json").await.unwrap_err();
        assert!(err.has_condition("MalformedPolicy"));
    }
}
