//! Retryable conflicts during teardown.
//!
//! A conflict is retryable only when it matches one of the narrowly scoped
//! rules below. Matching is on a fixed phrase inside the backend message,
//! optionally pinned to a structured condition code; there is no general
//! string search. Prefer a structured code whenever the backend provides one.

use crate::errors::RemoteError;

/// One retryable-conflict rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransientConflictRule {
    /// Condition code the error must carry, if pinned.
    pub code: Option<&'static str>,
    /// Lower-case phrase the message must contain.
    pub phrase: &'static str,
}

impl TransientConflictRule {
    /// Returns true if the error matches this rule.
    #[must_use]
    pub fn matches(&self, error: &RemoteError) -> bool {
        if error.status_code() != Some(409) {
            return false;
        }
        if let Some(code) = self.code {
            if !error.has_condition(code) {
                return false;
            }
        }
        error.message().to_ascii_lowercase().contains(self.phrase)
    }
}

/// Conflicts known to clear on their own.
pub const TRANSIENT_CONFLICTS: &[TransientConflictRule] = &[
    TransientConflictRule {
        code: None,
        phrase: "not yet in a deletable state",
    },
    TransientConflictRule {
        code: None,
        phrase: "not in a deletable state",
    },
    TransientConflictRule {
        code: Some("OperationAborted"),
        phrase: "conflicting conditional operation",
    },
];

/// Returns true if the conflict should be retried instead of failing.
#[must_use]
pub fn is_transient_conflict(error: &RemoteError) -> bool {
    TRANSIENT_CONFLICTS.iter().any(|rule| rule.matches(error))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deletable_state_conflict_is_transient() {
        let err = RemoteError::status(409, "Access point is not yet in a deletable state");
        assert!(is_transient_conflict(&err));

        let err = RemoteError::status(409, "Bucket is Not In A Deletable State right now");
        assert!(is_transient_conflict(&err));
    }

    #[test]
    fn test_other_conflicts_are_terminal() {
        let err = RemoteError::status(409, "Access point is in use by another request");
        assert!(!is_transient_conflict(&err));

        let err = RemoteError::status(409, "deletable");
        assert!(!is_transient_conflict(&err));
    }

    #[test]
    fn test_phrase_requires_conflict_status() {
        let err = RemoteError::status(400, "not yet in a deletable state");
        assert!(!is_transient_conflict(&err));
    }

    #[test]
    fn test_pinned_code_rule() {
        let err = RemoteError::condition(
            409,
            "OperationAborted",
            "A conflicting conditional operation is in progress",
        );
        assert!(is_transient_conflict(&err));

        let err = RemoteError::status(409, "A conflicting conditional operation is in progress");
        assert!(!is_transient_conflict(&err));
    }
}
