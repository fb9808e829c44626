//! Provider over a restricted embedded-runtime crypto bridge.
//!
//! Mobile runtimes typically expose string digests, a random source and a
//! comparison helper, but no keyed MAC. HMAC is therefore refused outright:
//! approximating it with plain digests would be insecure.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::digest::DigestAlgorithm;
use crate::encoding::{Base64Codec, Base64Support};
use crate::provider::CryptoProvider;
use crate::{CryptoError, Result};

/// Output encoding requested from [`NativeBridge::digest_string`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigestEncoding {
    /// Lowercase hex
    Hex,
    /// Standard base64
    Base64,
}

/// Primitives offered by the embedded runtime.
#[async_trait]
pub trait NativeBridge: Send + Sync + fmt::Debug {
    /// Digest a UTF-8 string and return it in the requested encoding.
    async fn digest_string(
        &self,
        algorithm: DigestAlgorithm,
        data: &str,
        encoding: DigestEncoding,
    ) -> Result<String>;

    /// `length` random bytes.
    fn get_random_bytes(&self, length: usize) -> Result<Vec<u8>>;

    /// Constant-time comparison of two byte strings.
    fn timing_safe_equal(&self, a: &[u8], b: &[u8]) -> Result<bool>;
}

/// Provider for embedded runtimes; everything except HMAC.
#[derive(Debug, Clone)]
pub struct BridgeCryptoProvider {
    bridge: Arc<dyn NativeBridge>,
    codec: Base64Codec,
}

impl BridgeCryptoProvider {
    /// Provider name reported by [`CryptoProvider::name`].
    pub const NAME: &'static str = "BridgeCrypto";

    /// Wrap a bridge; base64 goes through the runtime's text codec.
    pub fn new(bridge: Arc<dyn NativeBridge>) -> Self {
        Self::with_base64(bridge, Base64Support::TEXT_ONLY)
    }

    /// Wrap a bridge with explicit base64 availability.
    pub fn with_base64(bridge: Arc<dyn NativeBridge>, support: Base64Support) -> Self {
        Self {
            bridge,
            codec: Base64Codec::select(support),
        }
    }
}

#[async_trait]
impl CryptoProvider for BridgeCryptoProvider {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn sha1(&self, data: &str) -> Result<String> {
        self.bridge
            .digest_string(DigestAlgorithm::Sha1, data, DigestEncoding::Base64)
            .await
    }

    async fn hmac_sha256(&self, _key: &str, _data: &str) -> Result<String> {
        Err(CryptoError::unsupported(
            Self::NAME,
            "hmac_sha256",
            "HMAC not natively supported by the embedded crypto bridge; inject a provider with HMAC support",
        ))
    }

    fn base64_encode(&self, data: &str) -> Result<String> {
        self.codec.encode(Self::NAME, data)
    }

    fn base64_decode(&self, data: &str) -> Result<String> {
        self.codec.decode(Self::NAME, data)
    }

    fn random_bytes(&self, length: usize) -> Result<Vec<u8>> {
        let bytes = self.bridge.get_random_bytes(length)?;
        if bytes.len() != length {
            return Err(CryptoError::Random(format!(
                "bridge returned {} bytes, expected {length}",
                bytes.len()
            )));
        }
        Ok(bytes)
    }

    fn timing_safe_equal(&self, a: &str, b: &str) -> Result<bool> {
        if a.len() != b.len() {
            return Ok(false);
        }
        self.bridge.timing_safe_equal(a.as_bytes(), b.as_bytes())
    }
}
