//! Deterministic idempotency tokens.

use sha2::{Digest, Sha256};

/// Maximum token length accepted by token-aware backends.
pub const CLIENT_TOKEN_LEN: usize = 32;

/// Derives a client token from the logical identity of a mutation.
///
/// The same components always produce the same token, so a creation replayed
/// after an unobserved success is deduplicated by the backend.
#[must_use]
pub fn client_token(components: &[&str]) -> String {
    let combined = components.join(":");
    let mut hasher = Sha256::new();
    hasher.update(combined.as_bytes());
    let digest = hasher.finalize();
    hex::encode(&digest[..CLIENT_TOKEN_LEN / 2])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_is_deterministic() {
        let a = client_token(&["create", "bucket-arn", "reader"]);
        let b = client_token(&["create", "bucket-arn", "reader"]);
        assert_eq!(a, b);
        assert_eq!(a.len(), CLIENT_TOKEN_LEN);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_token_depends_on_components() {
        assert_ne!(
            client_token(&["create", "bucket-arn", "reader"]),
            client_token(&["create", "bucket-arn", "writer"])
        );
    }
}
