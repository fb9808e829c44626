//! RustCrypto digest and MAC primitives shared by the in-process backends.
//!
//! The native provider and the software subtle engine both sit on top of
//! these, which keeps their output byte-identical.

use base64::Engine;
use hmac::{Hmac, Mac};
use sha1::{Digest, Sha1};
use sha2::Sha256;

use crate::{CryptoError, Result};

type HmacSha256 = Hmac<Sha256>;

/// Digest algorithms understood by the host primitive traits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigestAlgorithm {
    /// SHA-1 (20 bytes)
    Sha1,
    /// SHA-256 (32 bytes)
    Sha256,
}

impl std::fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sha1 => write!(f, "SHA-1"),
            Self::Sha256 => write!(f, "SHA-256"),
        }
    }
}

/// Compute a raw digest.
#[must_use]
pub fn digest(algorithm: DigestAlgorithm, data: &[u8]) -> Vec<u8> {
    match algorithm {
        DigestAlgorithm::Sha1 => Sha1::digest(data).to_vec(),
        DigestAlgorithm::Sha256 => Sha256::digest(data).to_vec(),
    }
}

/// SHA-1 of `data`, base64-encoded.
#[must_use]
pub fn sha1_base64(data: &str) -> String {
    base64::engine::general_purpose::STANDARD.encode(digest(DigestAlgorithm::Sha1, data.as_bytes()))
}

/// Raw HMAC tag over `message`.
///
/// Only SHA-256 is used by the gateway; SHA-1 keys are accepted for hosts
/// that ask for it through the subtle engine.
pub fn hmac_raw(hash: DigestAlgorithm, key: &[u8], message: &[u8]) -> Result<Vec<u8>> {
    match hash {
        DigestAlgorithm::Sha256 => {
            let mut mac = HmacSha256::new_from_slice(key)
                .map_err(|e| CryptoError::InvalidKey(e.to_string()))?;
            mac.update(message);
            Ok(mac.finalize().into_bytes().to_vec())
        }
        DigestAlgorithm::Sha1 => {
            let mut mac = Hmac::<Sha1>::new_from_slice(key)
                .map_err(|e| CryptoError::InvalidKey(e.to_string()))?;
            mac.update(message);
            Ok(mac.finalize().into_bytes().to_vec())
        }
    }
}

/// Generate HMAC-SHA256 signature.
///
/// # Returns
/// Signature as lowercase hex string
pub fn hmac_sha256_hex(key: &[u8], message: &[u8]) -> Result<String> {
    hmac_raw(DigestAlgorithm::Sha256, key, message).map(hex::encode)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hmac_sha256_rfc4231_case_2() {
        let sig = hmac_sha256_hex(b"Jefe", b"what do ya want for nothing?").unwrap();
        assert_eq!(
            sig,
            "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"
        );
    }

    #[test]
    fn test_hmac_sha256_is_lowercase_hex() {
        let sig = hmac_sha256_hex(b"secret", b"hello world").unwrap();
        assert_eq!(sig.len(), 64);
        assert!(sig.chars().all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
    }

    #[test]
    fn test_sha1_base64_known_vector() {
        // sha1("abc") = a9993e364706816aba3e25717850c26c9cd0d89d
        assert_eq!(sha1_base64("abc"), "qZk+NkcGgWq6PiVxeFDCbJzQ2J0=");
    }

    #[test]
    fn test_digest_lengths() {
        assert_eq!(digest(DigestAlgorithm::Sha1, b"x").len(), 20);
        assert_eq!(digest(DigestAlgorithm::Sha256, b"x").len(), 32);
    }

    #[test]
    fn test_empty_key_is_accepted() {
        assert!(hmac_sha256_hex(b"", b"payload").is_ok());
    }
}
