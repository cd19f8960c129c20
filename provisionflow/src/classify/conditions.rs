//! Specific backend condition codes and their precise outcomes.

use crate::core::OutcomeCode;

/// Condition codes checked before the status-code buckets.
pub const NAMED_CONDITIONS: &[(&str, OutcomeCode)] = &[
    // Ownership / existence
    ("AccessPointAlreadyOwnedByYou", OutcomeCode::AlreadyExists),
    ("BucketAlreadyOwnedByYou", OutcomeCode::AlreadyExists),
    ("BucketAlreadyExists", OutcomeCode::AlreadyExists),
    ("NoSuchAccessPoint", OutcomeCode::NotFound),
    ("NoSuchAccessPointPolicy", OutcomeCode::NotFound),
    ("NoSuchBucket", OutcomeCode::NotFound),
    ("NoSuchBucketPolicy", OutcomeCode::NotFound),
    ("NoSuchLifecycleConfiguration", OutcomeCode::NotFound),
    ("NoSuchOutpost", OutcomeCode::NotFound),
    ("NotFound", OutcomeCode::NotFound),
    // Quotas
    ("TooManyAccessPoints", OutcomeCode::ServiceLimitExceeded),
    ("TooManyBuckets", OutcomeCode::ServiceLimitExceeded),
    ("ServiceQuotaExceeded", OutcomeCode::ServiceLimitExceeded),
    // Request shape
    ("MalformedPolicy", OutcomeCode::InvalidRequest),
    ("InvalidRequest", OutcomeCode::InvalidRequest),
    ("ValidationException", OutcomeCode::InvalidRequest),
    // Authorization
    ("AccessDenied", OutcomeCode::AccessDenied),
    ("AccessDeniedException", OutcomeCode::AccessDenied),
    // Contention
    ("ConflictException", OutcomeCode::ResourceConflict),
    ("OperationAborted", OutcomeCode::ResourceConflict),
    ("ThrottlingException", OutcomeCode::Throttling),
    ("SlowDown", OutcomeCode::Throttling),
    ("TooManyRequests", OutcomeCode::Throttling),
    // Backend health
    ("InternalError", OutcomeCode::ServiceInternalError),
    ("InternalServerException", OutcomeCode::ServiceInternalError),
];

/// Looks up the outcome for a specific condition code.
#[must_use]
pub fn condition_outcome(code: &str) -> Option<OutcomeCode> {
    NAMED_CONDITIONS
        .iter()
        .find(|(name, _)| *name == code)
        .map(|(_, outcome)| *outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_condition_lookup() {
        assert_eq!(condition_outcome("NoSuchAccessPoint"), Some(OutcomeCode::NotFound));
        assert_eq!(condition_outcome("MalformedPolicy"), Some(OutcomeCode::InvalidRequest));
        assert_eq!(condition_outcome("nosuchaccesspoint"), None);
        assert_eq!(condition_outcome("Unheard"), None);
    }

    #[test]
    fn test_condition_names_are_unique() {
        let names: HashSet<_> = NAMED_CONDITIONS.iter().map(|(name, _)| *name).collect();
        assert_eq!(names.len(), NAMED_CONDITIONS.len());
    }

    #[test]
    fn test_internal_failure_is_never_a_backend_condition() {
        assert!(NAMED_CONDITIONS
            .iter()
            .all(|(_, outcome)| *outcome != OutcomeCode::InternalFailure));
    }
}
