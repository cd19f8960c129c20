//! Operation kind and status enums.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The logical operation a handler invocation performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperationKind {
    /// Provision a new resource.
    Create,
    /// Describe an existing resource.
    Read,
    /// Reconcile an existing resource with a new desired state.
    Update,
    /// Tear down a resource.
    Delete,
    /// Enumerate resources.
    List,
}

impl OperationKind {
    /// All operation kinds, in lifecycle order.
    pub const ALL: [Self; 5] = [
        Self::Create,
        Self::Read,
        Self::Update,
        Self::Delete,
        Self::List,
    ];

    /// Returns true if the operation changes backend state.
    #[must_use]
    pub fn is_mutating(&self) -> bool {
        matches!(self, Self::Create | Self::Update | Self::Delete)
    }

    /// Returns true if the operation may receive a previous model.
    #[must_use]
    pub fn accepts_previous_model(&self) -> bool {
        matches!(self, Self::Update | Self::Delete)
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Create => write!(f, "create"),
            Self::Read => write!(f, "read"),
            Self::Update => write!(f, "update"),
            Self::Delete => write!(f, "delete"),
            Self::List => write!(f, "list"),
        }
    }
}

/// The status reported to the scheduler for one invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperationStatus {
    /// Not yet done; re-invoke after the requested delay.
    InProgress,
    /// The operation finished successfully.
    Success,
    /// The operation finished with a classified failure.
    Failed,
}

impl OperationStatus {
    /// Returns true if no further invocation should occur.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Success | Self::Failed)
    }
}

impl fmt::Display for OperationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InProgress => write!(f, "IN_PROGRESS"),
            Self::Success => write!(f, "SUCCESS"),
            Self::Failed => write!(f, "FAILED"),
        }
    }
}
