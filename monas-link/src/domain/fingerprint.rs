//! SHA256 fingerprints for linked public keys.

use std::fmt;

use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

const FINGERPRINT_PREFIX: &str = "SHA256:";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("invalid base64 key encoding: {0}")]
    InvalidBase64(#[from] base64::DecodeError),
    #[error("authorized key line has no key field")]
    MissingKeyField,
}

/// Human-checkable identifier of a public key: `SHA256:` followed by the
/// lowercase hex digest of the raw key bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Decodes a standard base64 public key and fingerprints the raw bytes.
pub fn compute_fingerprint(encoded_key: &str) -> Result<Fingerprint, DecodeError> {
    let raw = BASE64_STANDARD.decode(encoded_key)?;
    Ok(fingerprint_bytes(&raw))
}

/// Fingerprints already decoded key bytes.
pub fn fingerprint_bytes(raw: &[u8]) -> Fingerprint {
    let digest = Sha256::digest(raw);
    Fingerprint(format!("{FINGERPRINT_PREFIX}{}", hex::encode(digest)))
}

/// Fingerprints an `authorized_keys` style line (`ssh-ed25519 AAAA... comment`).
pub fn compute_fingerprint_from_line(line: &str) -> Result<Fingerprint, DecodeError> {
    let encoded = line
        .split_whitespace()
        .nth(1)
        .ok_or(DecodeError::MissingKeyField)?;
    compute_fingerprint(encoded)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_well_formed(fp: &Fingerprint) -> bool {
        let Some(hex_part) = fp.as_str().strip_prefix("SHA256:") else {
            return false;
        };
        hex_part.len() == 64
            && hex_part
                .chars()
                .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c))
    }

    #[test]
    fn empty_key_has_known_fingerprint() {
        let fp = compute_fingerprint("").unwrap();
        assert_eq!(
            fp.as_str(),
            "SHA256:e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn valid_keys_produce_prefixed_lowercase_hex() {
        let ed25519 = "AAAAC3NzaC1lZDI1NTE5AAAAIJ0hQnmUkbQ1R0dH3c5u0f9G3HiX9oHFbqAqvOdyC2pW";
        for key in ["AAAA", "aGVsbG8=", ed25519] {
            let fp = compute_fingerprint(key).unwrap();
            assert!(is_well_formed(&fp), "unexpected fingerprint {fp}");
        }
    }

    #[test]
    fn fingerprint_is_deterministic() {
        let first = compute_fingerprint("aGVsbG8=").unwrap();
        let second = compute_fingerprint("aGVsbG8=").unwrap();
        assert_eq!(first, second);
        assert_eq!(first, fingerprint_bytes(b"hello"));
    }

    #[test]
    fn malformed_keys_fail_to_decode() {
        for key in ["not base64!", "aGVsbG8", "====", "a"] {
            let result = compute_fingerprint(key);
            assert!(
                matches!(result, Err(DecodeError::InvalidBase64(_))),
                "expected decode error for {key:?}"
            );
        }
    }

    #[test]
    fn authorized_key_line_uses_second_field() {
        let fp = compute_fingerprint_from_line("ssh-ed25519 aGVsbG8= alice@laptop").unwrap();
        assert_eq!(fp, fingerprint_bytes(b"hello"));

        assert_eq!(
            compute_fingerprint_from_line("ssh-ed25519"),
            Err(DecodeError::MissingKeyField)
        );
    }
}
