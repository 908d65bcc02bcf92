use sha2::{Digest, Sha256};
use std::fmt::Write;

///
/// Serializer fingerprint (SHA-256, lowercase hex).
///
/// Used as the type component of every cache key so that switching the
/// serializer for an entity misses the cache without a storage-side version
/// bump. The in-memory relation reuses [`hex_digest`] over its query shape
/// and visible row identities, and over each row's version.
///
/// Deterministic across platforms; not used for anything security-sensitive.
///
#[must_use]
pub fn fingerprint(input: &str) -> String {
    hex_digest(input.as_bytes())
}

/// Lowercase hex SHA-256 digest of arbitrary bytes.
#[must_use]
pub fn hex_digest(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    let mut out = String::with_capacity(digest.len() * 2);

    for byte in &digest {
        // writing to a String cannot fail
        let _ = write!(out, "{byte:02x}");
    }

    out
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::{fingerprint, hex_digest};

    #[test]
    fn produces_expected_reference_values() {
        assert_eq!(
            fingerprint("hello"),
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
        assert_eq!(
            hex_digest(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn distinct_serializers_get_distinct_fingerprints() {
        assert_ne!(fingerprint("FooSerializer"), fingerprint("FooCustomSerializer"));
        assert_eq!(fingerprint("FooSerializer").len(), 64);
    }
}
