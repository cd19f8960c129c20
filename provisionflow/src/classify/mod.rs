//! Outcome taxonomy: maps any failure captured at a stage boundary onto
//! exactly one [`OutcomeCode`].
//!
//! Resolution order:
//! 1. specific named backend conditions ([`conditions`]),
//! 2. the status-code bucket table,
//! 3. transport failures map to `GeneralServiceException`,
//! 4. anything that is not a remote failure at all is `InternalFailure`.
//!
//! The classifier is total and never panics.

mod conditions;
mod conflict;

pub use conditions::{condition_outcome, NAMED_CONDITIONS};
pub use conflict::{is_transient_conflict, TransientConflictRule, TRANSIENT_CONFLICTS};

use crate::core::OutcomeCode;
use crate::errors::{ProvisionError, RemoteError};

/// Classifies any engine-level failure.
#[must_use]
pub fn classify(error: &ProvisionError) -> OutcomeCode {
    match error {
        ProvisionError::Remote(remote) => classify_remote(remote),
        ProvisionError::Validation(_) => OutcomeCode::InvalidRequest,
        ProvisionError::Config(_)
        | ProvisionError::Serialization(_)
        | ProvisionError::Internal(_) => OutcomeCode::InternalFailure,
    }
}

/// Classifies a remote-call failure.
#[must_use]
pub fn classify_remote(error: &RemoteError) -> OutcomeCode {
    match error {
        RemoteError::Service { status, code, .. } => code
            .as_deref()
            .and_then(condition_outcome)
            .unwrap_or_else(|| status_outcome(*status)),
        RemoteError::Transport { .. } => OutcomeCode::GeneralServiceException,
    }
}

/// Maps a bare status code onto its outcome bucket.
#[must_use]
pub fn status_outcome(status: u16) -> OutcomeCode {
    match status {
        400 => OutcomeCode::InvalidRequest,
        403 => OutcomeCode::AccessDenied,
        404 => OutcomeCode::NotFound,
        409 => OutcomeCode::ResourceConflict,
        500 => OutcomeCode::ServiceInternalError,
        503 => OutcomeCode::Throttling,
        _ => OutcomeCode::GeneralServiceException,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ValidationError;

    #[test]
    fn test_status_bucket_table() {
        let cases = [
            (400, OutcomeCode::InvalidRequest),
            (403, OutcomeCode::AccessDenied),
            (404, OutcomeCode::NotFound),
            (409, OutcomeCode::ResourceConflict),
            (500, OutcomeCode::ServiceInternalError),
            (503, OutcomeCode::Throttling),
            (999, OutcomeCode::GeneralServiceException),
        ];

        for (status, expected) in cases {
            for payload in ["", "anything", "Access Denied", "not yet in a deletable state"] {
                let err = RemoteError::status(status, payload);
                assert_eq!(classify_remote(&err), expected, "status {status}");
            }
        }
    }

    #[test]
    fn test_unknown_condition_falls_back_to_status() {
        let err = RemoteError::condition(403, "SomethingNew", "denied");
        assert_eq!(classify_remote(&err), OutcomeCode::AccessDenied);
    }

    #[test]
    fn test_named_condition_wins_over_status() {
        let err = RemoteError::condition(409, "AccessPointAlreadyOwnedByYou", "mine");
        assert_eq!(classify_remote(&err), OutcomeCode::AlreadyExists);

        let err = RemoteError::condition(400, "TooManyAccessPoints", "limit");
        assert_eq!(classify_remote(&err), OutcomeCode::ServiceLimitExceeded);
    }

    #[test]
    fn test_transport_failure() {
        let err = RemoteError::transport("dns lookup failed");
        assert_eq!(classify_remote(&err), OutcomeCode::GeneralServiceException);
    }

    #[test]
    fn test_non_remote_failures() {
        let err = ProvisionError::Validation(ValidationError::missing("Arn"));
        assert_eq!(classify(&err), OutcomeCode::InvalidRequest);

        let err = ProvisionError::internal("index out of range");
        assert_eq!(classify(&err), OutcomeCode::InternalFailure);

        let err = ProvisionError::Serialization("bad json".to_string());
        assert_eq!(classify(&err), OutcomeCode::InternalFailure);
    }
}
