use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::constants::ATTEMPT_KEY_LEN;

/// Content-derived key for an attempt: truncated SHA-256 of the problem text.
///
/// Identical problems share a key; the timestamp stored next to it keeps
/// records distinct.
pub fn content_key(problem: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(problem.as_bytes());
    let hex = format!("{:x}", hasher.finalize());
    hex[..ATTEMPT_KEY_LEN].to_string()
}

/// Full attempt key: `{content_key}_{timestamp_micros}`.
pub fn attempt_key(problem: &str, timestamp_micros: i64) -> String {
    format!("{}_{}", content_key(problem), timestamp_micros)
}

/// Genere un ID unique pour une session (UUID v4 hex, 32 chars)
pub fn session_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Genere un ID unique pour un document du corpus (UUID v4 hex, 32 chars)
pub fn document_id() -> String {
    Uuid::new_v4().simple().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_key() {
        let key = content_key("2+2=?");
        assert_eq!(key.len(), ATTEMPT_KEY_LEN);
        assert_eq!(key, content_key("2+2=?"));
        assert_ne!(key, content_key("2+3=?"));
    }

    #[test]
    fn test_attempt_key_includes_timestamp() {
        let a = attempt_key("2+2=?", 1);
        let b = attempt_key("2+2=?", 2);
        assert_ne!(a, b);
        assert!(a.starts_with(&content_key("2+2=?")));
    }

    #[test]
    fn test_ids_are_unique() {
        let a = session_id();
        let b = session_id();
        assert_ne!(a, b);
        assert_eq!(a.len(), 32);
    }
}
