//! Content digest helper.

use sha2::{Digest, Sha256};

/// SHA-256 hex digest of raw archive bytes.
///
/// The digest is a content-addressing key for artifact retrieval within a
/// report's directory. It never participates in path placement; routing
/// parameters (identity, id, date) do that.
pub fn content_digest(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digest_is_deterministic() {
        let first = content_digest(b"report bytes");
        let second = content_digest(b"report bytes");
        assert_eq!(first, second);
        assert_eq!(first.len(), 64);
    }

    #[test]
    fn test_digest_differs_for_different_input() {
        assert_ne!(content_digest(b"a"), content_digest(b"b"));
    }

    #[test]
    fn test_digest_known_vector() {
        // SHA-256 of the empty input.
        assert_eq!(
            content_digest(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}
