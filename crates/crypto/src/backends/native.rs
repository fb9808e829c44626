//! In-process RustCrypto backend for server builds.

use async_trait::async_trait;

use crate::digest::{hmac_sha256_hex, sha1_base64};
use crate::encoding::Base64Codec;
use crate::provider::CryptoProvider;
use crate::timing::constant_time_eq_str;
use crate::Result;

/// Server-side provider: synchronous digests, OS randomness and a native
/// constant-time compare. Supports every operation.
#[derive(Debug, Clone, Default)]
pub struct NativeCryptoProvider {
    codec: Base64Codec,
}

impl NativeCryptoProvider {
    /// Provider name reported by [`CryptoProvider::name`].
    pub const NAME: &'static str = "NativeCrypto";

    /// Create the provider with the byte-buffer base64 codec.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CryptoProvider for NativeCryptoProvider {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn sha1(&self, data: &str) -> Result<String> {
        Ok(sha1_base64(data))
    }

    async fn hmac_sha256(&self, key: &str, data: &str) -> Result<String> {
        hmac_sha256_hex(key.as_bytes(), data.as_bytes())
    }

    fn base64_encode(&self, data: &str) -> Result<String> {
        self.codec.encode(Self::NAME, data)
    }

    fn base64_decode(&self, data: &str) -> Result<String> {
        self.codec.decode(Self::NAME, data)
    }

    fn random_bytes(&self, length: usize) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; length];
        getrandom::getrandom(&mut buf)?;
        Ok(buf)
    }

    fn timing_safe_equal(&self, a: &str, b: &str) -> Result<bool> {
        Ok(constant_time_eq_str(a, b))
    }
}
