//! Error types for the provisionflow engine.
//!
//! Remote failures are captured as data ([`RemoteError`]) so the classifier can
//! map them onto the closed outcome vocabulary without exceptions crossing the
//! pipeline boundary.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// The main error type for provisionflow operations.
#[derive(Debug, Clone, Error)]
pub enum ProvisionError {
    /// A remote call failed.
    #[error("{0}")]
    Remote(#[from] RemoteError),

    /// Client-side validation failed before any remote call was issued.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// Engine configuration could not be loaded or is invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// A programming fault. Never absorbed.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ProvisionError {
    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Creates a configuration error.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Returns the remote error, if this is one.
    #[must_use]
    pub fn as_remote(&self) -> Option<&RemoteError> {
        match self {
            Self::Remote(err) => Some(err),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ProvisionError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for ProvisionError {
    fn from(err: std::io::Error) -> Self {
        Self::Config(err.to_string())
    }
}

/// A failure raised by a remote backend call.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RemoteError {
    /// The backend answered with an error status.
    #[error("Service error ({status}{}): {message}", .code.as_deref().map(|c| format!(", {c}")).unwrap_or_default())]
    Service {
        /// HTTP-like status code.
        status: u16,
        /// Specific condition code (e.g. `NoSuchAccessPoint`).
        code: Option<String>,
        /// Human-readable message.
        message: String,
    },

    /// The call never produced a backend answer.
    #[error("Transport error: {message}")]
    Transport {
        /// Description of the transport failure.
        message: String,
    },
}

impl RemoteError {
    /// Creates a service error with only a status code.
    #[must_use]
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self::Service {
            status,
            code: None,
            message: message.into(),
        }
    }

    /// Creates a service error carrying a specific condition code.
    #[must_use]
    pub fn condition(status: u16, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Service {
            status,
            code: Some(code.into()),
            message: message.into(),
        }
    }

    /// Creates a transport error.
    #[must_use]
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Returns the status code, if the backend answered.
    #[must_use]
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Service { status, .. } => Some(*status),
            Self::Transport { .. } => None,
        }
    }

    /// Returns the specific condition code, if any.
    #[must_use]
    pub fn condition_code(&self) -> Option<&str> {
        match self {
            Self::Service { code, .. } => code.as_deref(),
            Self::Transport { .. } => None,
        }
    }

    /// Returns the human-readable message.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Service { message, .. } | Self::Transport { message } => message,
        }
    }

    /// Returns true if the error carries the given condition code.
    #[must_use]
    pub fn has_condition(&self, code: &str) -> bool {
        self.condition_code() == Some(code)
    }

    /// Converts to a dictionary representation.
    #[must_use]
    pub fn to_dict(&self) -> HashMap<String, serde_json::Value> {
        let mut map = HashMap::new();
        match self {
            Self::Service {
                status,
                code,
                message,
            } => {
                map.insert("type".to_string(), serde_json::json!("Service"));
                map.insert("status".to_string(), serde_json::json!(status));
                if let Some(code) = code {
                    map.insert("code".to_string(), serde_json::json!(code));
                }
                map.insert("message".to_string(), serde_json::json!(message));
            }
            Self::Transport { message } => {
                map.insert("type".to_string(), serde_json::json!("Transport"));
                map.insert("message".to_string(), serde_json::json!(message));
            }
        }
        map
    }
}

/// Raised when a required attribute is missing or malformed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid request: {field} {message}")]
pub struct ValidationError {
    /// The offending attribute.
    pub field: String,
    /// What is wrong with it.
    pub message: String,
}

impl ValidationError {
    /// Creates a new validation error.
    #[must_use]
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Creates a "required attribute missing" error.
    #[must_use]
    pub fn missing(field: impl Into<String>) -> Self {
        Self::new(field, "is required")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_error_accessors() {
        let err = RemoteError::condition(404, "NoSuchAccessPoint", "gone");
        assert_eq!(err.status_code(), Some(404));
        assert_eq!(err.condition_code(), Some("NoSuchAccessPoint"));
        assert!(err.has_condition("NoSuchAccessPoint"));
        assert_eq!(err.message(), "gone");
    }

    #[test]
    fn test_remote_error_display() {
        let err = RemoteError::condition(409, "Conflict", "busy");
        assert_eq!(err.to_string(), "Service error (409, Conflict): busy");

        let err = RemoteError::status(500, "boom");
        assert_eq!(err.to_string(), "Service error (500): boom");

        let err = RemoteError::transport("connection reset");
        assert_eq!(err.status_code(), None);
        assert!(err.to_string().contains("connection reset"));
    }

    #[test]
    fn test_remote_error_to_dict() {
        let dict = RemoteError::condition(400, "MalformedPolicy", "bad").to_dict();
        assert_eq!(dict.get("type").unwrap(), "Service");
        assert_eq!(dict.get("code").unwrap(), "MalformedPolicy");
    }

    #[test]
    fn test_validation_error() {
        let err = ValidationError::missing("Arn");
        assert_eq!(err.to_string(), "Invalid request: Arn is required");
    }

    #[test]
    fn test_provision_error_conversions() {
        let err: ProvisionError = RemoteError::status(503, "slow down").into();
        assert!(err.as_remote().is_some());

        let err: ProvisionError = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert!(matches!(err, ProvisionError::Serialization(_)));
    }
}
