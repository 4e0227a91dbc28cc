//! Gateway identity signatures
//!
//! The gateway in front of the service authenticates callers and forwards
//! three values with each request: the caller's user id, a timestamp (Unix
//! epoch milliseconds) and a signature. The signature is the SHA-256 of
//! `"{user_id}:{timestamp}:{secret}"` as 64 lowercase hex characters, where
//! `secret` is shared between the gateway and this service.
//!
//! Timestamps are accepted up to [`MAX_PAST_MS`] in the past and
//! [`MAX_FUTURE_MS`] in the future, which bounds how long a captured header
//! set can be replayed.
//!
//! Only pure functions live here; the HTTP extractor is in the API crate.

use sha2::{Digest, Sha256};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

/// Oldest accepted timestamp, relative to now
pub const MAX_PAST_MS: i64 = 30_000;

/// Clock drift tolerated for timestamps ahead of now
pub const MAX_FUTURE_MS: i64 = 1_000;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdentityError {
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("Invalid signature")]
    InvalidSignature,
}

/// Current time in Unix epoch milliseconds
pub fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

/// Signature the gateway attaches for `user_id` at `timestamp`
pub fn sign_identity(user_id: &str, timestamp: i64, secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(format!("{}:{}:{}", user_id, timestamp, secret).as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Check `timestamp` against `now` (both epoch milliseconds)
pub fn validate_timestamp(timestamp: i64, now: i64) -> Result<(), IdentityError> {
    let age = now - timestamp;

    if age > MAX_PAST_MS {
        return Err(IdentityError::InvalidTimestamp(format!(
            "{}ms old (max {}ms)",
            age, MAX_PAST_MS
        )));
    }
    if -age > MAX_FUTURE_MS {
        return Err(IdentityError::InvalidTimestamp(format!(
            "{}ms in the future (max {}ms)",
            -age, MAX_FUTURE_MS
        )));
    }
    Ok(())
}

/// Verify a forwarded identity
pub fn verify_identity(
    user_id: &str,
    timestamp: i64,
    signature: &str,
    secret: &str,
    now: i64,
) -> Result<(), IdentityError> {
    validate_timestamp(timestamp, now)?;

    let expected = sign_identity(user_id, timestamp, secret);
    if !constant_time_eq(expected.as_bytes(), signature.trim().as_bytes()) {
        return Err(IdentityError::InvalidSignature);
    }
    Ok(())
}

/// Comparison whose running time does not depend on where inputs differ
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "gateway-secret";
    const NOW: i64 = 1_730_000_000_000;

    #[test]
    fn test_signature_format() {
        let signature = sign_identity("user-1", NOW, SECRET);

        assert_eq!(signature.len(), 64);
        assert!(signature.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(signature, sign_identity("user-1", NOW, SECRET));
        assert_ne!(signature, sign_identity("user-1", NOW, "other-secret"));
        assert_ne!(signature, sign_identity("user-1", NOW + 1, SECRET));
    }

    #[test]
    fn test_valid_identity_accepted() {
        let signature = sign_identity("user-1", NOW, SECRET);
        assert!(verify_identity("user-1", NOW, &signature, SECRET, NOW).is_ok());
        assert!(verify_identity("user-1", NOW, &signature, SECRET, NOW + MAX_PAST_MS).is_ok());
    }

    #[test]
    fn test_signature_does_not_transfer_to_another_user() {
        let signature = sign_identity("user-1", NOW, SECRET);
        assert_eq!(
            verify_identity("user-2", NOW, &signature, SECRET, NOW),
            Err(IdentityError::InvalidSignature)
        );
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let signature = sign_identity("user-1", NOW, "guessed");
        assert_eq!(
            verify_identity("user-1", NOW, &signature, SECRET, NOW),
            Err(IdentityError::InvalidSignature)
        );
        assert_eq!(
            verify_identity("user-1", NOW, "", SECRET, NOW),
            Err(IdentityError::InvalidSignature)
        );
    }

    #[test]
    fn test_timestamp_window() {
        assert!(validate_timestamp(NOW, NOW).is_ok());
        assert!(validate_timestamp(NOW - MAX_PAST_MS, NOW).is_ok());
        assert!(validate_timestamp(NOW + MAX_FUTURE_MS, NOW).is_ok());

        assert!(matches!(
            validate_timestamp(NOW - MAX_PAST_MS - 1, NOW),
            Err(IdentityError::InvalidTimestamp(_))
        ));
        assert!(matches!(
            validate_timestamp(NOW + MAX_FUTURE_MS + 1, NOW),
            Err(IdentityError::InvalidTimestamp(_))
        ));
    }

    #[test]
    fn test_stale_signature_rejected_even_when_correct() {
        let old = NOW - MAX_PAST_MS - 1;
        let signature = sign_identity("user-1", old, SECRET);
        assert!(matches!(
            verify_identity("user-1", old, &signature, SECRET, NOW),
            Err(IdentityError::InvalidTimestamp(_))
        ));
    }
}
