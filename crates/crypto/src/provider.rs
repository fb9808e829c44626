//! The crypto provider capability.
//!
//! Every backend, including one supplied by the embedding application,
//! implements [`CryptoProvider`]. Output formats are part of the contract:
//! SHA-1 digests are base64, HMAC-SHA256 tags are lowercase hex. A substitute
//! backend that deviates produces signatures the gateway rejects.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::Result;

/// Shared handle to a provider, as handed out by the resolver.
pub type SharedProvider = Arc<dyn CryptoProvider>;

/// Hash, MAC, encoding, randomness and comparison primitives.
///
/// Operations that touch a digest engine are async so that hosts with
/// asynchronous engines and hosts with synchronous ones share one calling
/// convention.
#[async_trait]
pub trait CryptoProvider: Send + Sync + fmt::Debug {
    /// Provider name for diagnostics.
    fn name(&self) -> &str;

    /// SHA-1 of `data`, base64-encoded.
    async fn sha1(&self, data: &str) -> Result<String>;

    /// HMAC-SHA256 of `data` under `key`, lowercase hex.
    async fn hmac_sha256(&self, key: &str, data: &str) -> Result<String>;

    /// Base64-encode UTF-8 text.
    fn base64_encode(&self, data: &str) -> Result<String>;

    /// Decode base64 back into UTF-8 text.
    fn base64_decode(&self, data: &str) -> Result<String>;

    /// Exactly `length` cryptographically random bytes.
    fn random_bytes(&self, length: usize) -> Result<Vec<u8>>;

    /// `length` random bytes rendered as lowercase hex.
    fn random_string(&self, length: usize) -> Result<String> {
        self.random_bytes(length).map(hex::encode)
    }

    /// Constant-time string comparison.
    ///
    /// Backends that cannot guarantee constant time return
    /// [`CryptoError::Unsupported`](crate::CryptoError::Unsupported).
    fn timing_safe_equal(&self, a: &str, b: &str) -> Result<bool>;
}
