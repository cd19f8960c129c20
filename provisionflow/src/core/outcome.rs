//! The closed vocabulary of terminal failure classifications.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Terminal outcome code attached to every FAILED envelope.
///
/// The set is closed: classifier paths resolve to one of these and nothing
/// else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OutcomeCode {
    /// The request was malformed or failed validation.
    InvalidRequest,
    /// The resource already exists.
    AlreadyExists,
    /// The resource does not exist.
    NotFound,
    /// The caller lacks permission.
    AccessDenied,
    /// The resource is in a conflicting state.
    ResourceConflict,
    /// A backend quota was exceeded.
    ServiceLimitExceeded,
    /// The backend failed internally.
    ServiceInternalError,
    /// The backend throttled the call.
    Throttling,
    /// Any other backend failure.
    GeneralServiceException,
    /// A fault inside the engine itself.
    InternalFailure,
}

impl OutcomeCode {
    /// All outcome codes.
    pub const ALL: [Self; 10] = [
        Self::InvalidRequest,
        Self::AlreadyExists,
        Self::NotFound,
        Self::AccessDenied,
        Self::ResourceConflict,
        Self::ServiceLimitExceeded,
        Self::ServiceInternalError,
        Self::Throttling,
        Self::GeneralServiceException,
        Self::InternalFailure,
    ];

    /// Returns the wire name of the code.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidRequest => "InvalidRequest",
            Self::AlreadyExists => "AlreadyExists",
            Self::NotFound => "NotFound",
            Self::AccessDenied => "AccessDenied",
            Self::ResourceConflict => "ResourceConflict",
            Self::ServiceLimitExceeded => "ServiceLimitExceeded",
            Self::ServiceInternalError => "ServiceInternalError",
            Self::Throttling => "Throttling",
            Self::GeneralServiceException => "GeneralServiceException",
            Self::InternalFailure => "InternalFailure",
        }
    }
}

impl fmt::Display for OutcomeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
