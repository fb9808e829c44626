//! Test doubles for code that consumes the crypto layer.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use crate::backends::NativeCryptoProvider;
use crate::clock::Clock;
use crate::provider::{CryptoProvider, SharedProvider};
use crate::{CryptoError, Result};

/// Wraps a provider and counts digest calls; HMAC can be made to fail.
#[derive(Debug)]
pub struct CountingProvider {
    inner: SharedProvider,
    hmac_calls: AtomicUsize,
    sha1_calls: AtomicUsize,
    fail_hmac: bool,
}

impl CountingProvider {
    /// Count calls on top of `inner`.
    #[must_use]
    pub fn new(inner: SharedProvider) -> Self {
        Self {
            inner,
            hmac_calls: AtomicUsize::new(0),
            sha1_calls: AtomicUsize::new(0),
            fail_hmac: false,
        }
    }

    /// Count calls on top of the native backend.
    #[must_use]
    pub fn native() -> Self {
        Self::new(Arc::new(NativeCryptoProvider::new()))
    }

    /// Make every HMAC call fail with a backend error.
    #[must_use]
    pub fn failing_hmac(mut self) -> Self {
        self.fail_hmac = true;
        self
    }

    /// Number of `hmac_sha256` calls so far.
    #[must_use]
    pub fn hmac_calls(&self) -> usize {
        self.hmac_calls.load(Ordering::SeqCst)
    }

    /// Number of `sha1` calls so far.
    #[must_use]
    pub fn sha1_calls(&self) -> usize {
        self.sha1_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CryptoProvider for CountingProvider {
    fn name(&self) -> &str {
        "Counting"
    }

    async fn sha1(&self, data: &str) -> Result<String> {
        self.sha1_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.sha1(data).await
    }

    async fn hmac_sha256(&self, key: &str, data: &str) -> Result<String> {
        self.hmac_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_hmac {
            return Err(CryptoError::backend("Crypto failure"));
        }
        self.inner.hmac_sha256(key, data).await
    }

    fn base64_encode(&self, data: &str) -> Result<String> {
        self.inner.base64_encode(data)
    }

    fn base64_decode(&self, data: &str) -> Result<String> {
        self.inner.base64_decode(data)
    }

    fn random_bytes(&self, length: usize) -> Result<Vec<u8>> {
        self.inner.random_bytes(length)
    }

    fn timing_safe_equal(&self, a: &str, b: &str) -> Result<bool> {
        self.inner.timing_safe_equal(a, b)
    }
}

/// Clock frozen at a given epoch-millisecond instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub i64);

impl Clock for FixedClock {
    fn now_millis(&self) -> i64 {
        self.0
    }
}
