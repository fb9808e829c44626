//! Provider over a platform subtle-crypto engine.
//!
//! The engine is host-supplied through [`SubtleCrypto`]. Hosts without a
//! native engine can plug in [`SoftwareSubtle`].

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use base64::Engine;

use crate::digest::{self, DigestAlgorithm};
use crate::encoding::{Base64Codec, Base64Support};
use crate::provider::CryptoProvider;
use crate::{CryptoError, Result};

/// Asynchronous digest/sign primitives in the shape of the Web Crypto API.
#[async_trait]
pub trait SubtleCrypto: Send + Sync + fmt::Debug {
    /// Raw digest of `data`.
    async fn digest(&self, algorithm: DigestAlgorithm, data: &[u8]) -> Result<Vec<u8>>;

    /// Raw HMAC tag with a raw `key` imported for signing.
    async fn sign_hmac(&self, hash: DigestAlgorithm, key: &[u8], data: &[u8]) -> Result<Vec<u8>>;

    /// Fill `buf` with random bytes.
    fn get_random_values(&self, buf: &mut [u8]) -> Result<()>;
}

/// RustCrypto-backed [`SubtleCrypto`] engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct SoftwareSubtle;

#[async_trait]
impl SubtleCrypto for SoftwareSubtle {
    async fn digest(&self, algorithm: DigestAlgorithm, data: &[u8]) -> Result<Vec<u8>> {
        Ok(digest::digest(algorithm, data))
    }

    async fn sign_hmac(&self, hash: DigestAlgorithm, key: &[u8], data: &[u8]) -> Result<Vec<u8>> {
        digest::hmac_raw(hash, key, data)
    }

    fn get_random_values(&self, buf: &mut [u8]) -> Result<()> {
        getrandom::getrandom(buf)?;
        Ok(())
    }
}

/// Browser-grade provider.
///
/// Cannot promise constant-time comparison, so
/// [`timing_safe_equal`](CryptoProvider::timing_safe_equal) always fails.
#[derive(Debug, Clone)]
pub struct WebCryptoProvider {
    subtle: Arc<dyn SubtleCrypto>,
    codec: Base64Codec,
}

impl WebCryptoProvider {
    /// Provider name reported by [`CryptoProvider::name`].
    pub const NAME: &'static str = "WebCrypto";

    /// Wrap a subtle engine; base64 goes through the text codec.
    pub fn new(subtle: Arc<dyn SubtleCrypto>) -> Self {
        Self::with_base64(subtle, Base64Support::TEXT_ONLY)
    }

    /// Wrap a subtle engine with explicit base64 availability.
    pub fn with_base64(subtle: Arc<dyn SubtleCrypto>, support: Base64Support) -> Self {
        Self {
            subtle,
            codec: Base64Codec::select(support),
        }
    }
}

#[async_trait]
impl CryptoProvider for WebCryptoProvider {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn sha1(&self, data: &str) -> Result<String> {
        let hash = self.subtle.digest(DigestAlgorithm::Sha1, data.as_bytes()).await?;
        // Digest rendering does not depend on the text codec being present.
        Ok(base64::engine::general_purpose::STANDARD.encode(hash))
    }

    async fn hmac_sha256(&self, key: &str, data: &str) -> Result<String> {
        let tag = self
            .subtle
            .sign_hmac(DigestAlgorithm::Sha256, key.as_bytes(), data.as_bytes())
            .await?;
        Ok(hex::encode(tag))
    }

    fn base64_encode(&self, data: &str) -> Result<String> {
        self.codec.encode(Self::NAME, data)
    }

    fn base64_decode(&self, data: &str) -> Result<String> {
        self.codec.decode(Self::NAME, data)
    }

    fn random_bytes(&self, length: usize) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; length];
        self.subtle.get_random_values(&mut buf)?;
        Ok(buf)
    }

    fn timing_safe_equal(&self, _a: &str, _b: &str) -> Result<bool> {
        Err(CryptoError::unsupported(
            Self::NAME,
            "timing_safe_equal",
            "Timing safe equal not available in this environment",
        ))
    }
}
