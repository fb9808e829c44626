//! Signed nonces for replay protection.
//!
//! The issuer signs `nonce:timestamp:expires_at`; the receiver rejects
//! anything from the future or older than its window before touching the
//! MAC, then recomputes the signature and compares in constant time.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::clock::{Clock, SystemClock};
use crate::resolver::{default_resolver, CryptoResolver};
use crate::Result;

/// Default validity window: five minutes.
pub const DEFAULT_NONCE_EXPIRY: Duration = Duration::from_millis(300_000);

/// Random bytes per nonce; rendered as twice as many hex characters.
pub const NONCE_BYTES: usize = 16;

/// An issued nonce. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedNonce {
    /// Random hex string
    pub nonce: String,
    /// Creation time, epoch millis
    pub timestamp: i64,
    /// HMAC-SHA256 hex over `nonce:timestamp:expires_at`
    pub signature: String,
    /// `timestamp` + validity window
    pub expires_at: i64,
}

fn nonce_payload(nonce: &str, timestamp: i64, expires_at: i64) -> String {
    format!("{nonce}:{timestamp}:{expires_at}")
}

fn window_millis(window: Duration) -> i64 {
    i64::try_from(window.as_millis()).unwrap_or(i64::MAX)
}

/// Issues and verifies [`SignedNonce`]s.
#[derive(Debug, Clone)]
pub struct NonceSigner {
    resolver: Arc<CryptoResolver>,
    clock: Arc<dyn Clock>,
}

impl Default for NonceSigner {
    fn default() -> Self {
        Self::new(default_resolver())
    }
}

impl NonceSigner {
    /// Create a signer on `resolver` using the system clock.
    #[must_use]
    pub fn new(resolver: Arc<CryptoResolver>) -> Self {
        Self::with_clock(resolver, Arc::new(SystemClock))
    }

    /// Create a signer with an explicit clock.
    #[must_use]
    pub fn with_clock(resolver: Arc<CryptoResolver>, clock: Arc<dyn Clock>) -> Self {
        Self { resolver, clock }
    }

    /// Issue a nonce valid for `expiry`.
    ///
    /// # Errors
    ///
    /// Provider resolution, randomness or HMAC failures.
    pub async fn create(&self, secret: &str, expiry: Duration) -> Result<SignedNonce> {
        let provider = self.resolver.get()?;
        let nonce = provider.random_string(NONCE_BYTES)?;
        let timestamp = self.clock.now_millis();
        let expires_at = timestamp.saturating_add(window_millis(expiry));

        let signature = provider
            .hmac_sha256(secret, &nonce_payload(&nonce, timestamp, expires_at))
            .await?;

        debug!(timestamp, expires_at, "Signed nonce issued");
        Ok(SignedNonce {
            nonce,
            timestamp,
            signature,
            expires_at,
        })
    }

    /// Check a nonce presented by a caller.
    ///
    /// Returns `false` for future timestamps, for anything older than
    /// `max_age`, for a wrong signature, and on any crypto error.
    pub async fn verify(
        &self,
        nonce: &str,
        timestamp: i64,
        signature: &str,
        secret: &str,
        max_age: Duration,
    ) -> bool {
        let max_age_ms = window_millis(max_age);
        let age = self.clock.now_millis().saturating_sub(timestamp);

        if age < 0 || age > max_age_ms {
            debug!(age, max_age_ms, "Nonce outside validity window");
            return false;
        }

        let expires_at = timestamp.saturating_add(max_age_ms);
        match self
            .recompute_and_compare(nonce, timestamp, expires_at, signature, secret)
            .await
        {
            Ok(valid) => valid,
            Err(e) => {
                warn!(error = %e, "Nonce verification failed closed");
                false
            }
        }
    }

    /// Verify a previously issued record against its own expiry window.
    pub async fn verify_record(&self, record: &SignedNonce, secret: &str) -> bool {
        let window = record.expires_at.saturating_sub(record.timestamp);
        let Ok(window) = u64::try_from(window) else {
            return false;
        };
        self.verify(
            &record.nonce,
            record.timestamp,
            &record.signature,
            secret,
            Duration::from_millis(window),
        )
        .await
    }

    async fn recompute_and_compare(
        &self,
        nonce: &str,
        timestamp: i64,
        expires_at: i64,
        signature: &str,
        secret: &str,
    ) -> Result<bool> {
        let provider = self.resolver.get()?;
        let expected = provider
            .hmac_sha256(secret, &nonce_payload(nonce, timestamp, expires_at))
            .await?;
        provider.timing_safe_equal(signature, &expected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::{SoftwareSubtle, WebCryptoProvider};
    use crate::testing::{CountingProvider, FixedClock};

    const NOW: i64 = 1_703_001_234_567;
    const SECRET: &str = "api-secret";

    fn setup(now: i64) -> (Arc<CountingProvider>, NonceSigner) {
        let counting = Arc::new(CountingProvider::native());
        let resolver = Arc::new(CryptoResolver::with_provider(counting.clone()));
        let signer = NonceSigner::with_clock(resolver, Arc::new(FixedClock(now)));
        (counting, signer)
    }

    #[tokio::test]
    async fn test_create_shape() {
        let (_, signer) = setup(NOW);
        let record = signer.create(SECRET, DEFAULT_NONCE_EXPIRY).await.unwrap();

        assert_eq!(record.nonce.len(), NONCE_BYTES * 2);
        assert!(record.nonce.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(record.timestamp, NOW);
        assert_eq!(record.expires_at, NOW + 300_000);
        assert_eq!(record.signature.len(), 64);
    }

    #[tokio::test]
    async fn test_signature_covers_colon_joined_fields() {
        let (_, signer) = setup(NOW);
        let record = signer.create(SECRET, Duration::from_secs(60)).await.unwrap();
        let expected = crate::digest::hmac_sha256_hex(
            SECRET.as_bytes(),
            format!("{}:{}:{}", record.nonce, record.timestamp, record.expires_at).as_bytes(),
        )
        .unwrap();
        assert_eq!(record.signature, expected);
    }

    #[tokio::test]
    async fn test_round_trip_within_window() {
        let (_, issuer) = setup(NOW);
        let record = issuer.create(SECRET, DEFAULT_NONCE_EXPIRY).await.unwrap();

        let (_, receiver) = setup(NOW + 10_000);
        assert!(
            receiver
                .verify(&record.nonce, record.timestamp, &record.signature, SECRET, DEFAULT_NONCE_EXPIRY)
                .await
        );
        // Idempotent
        assert!(receiver.verify_record(&record, SECRET).await);
        assert!(receiver.verify_record(&record, SECRET).await);
    }

    #[tokio::test]
    async fn test_wrong_secret_or_signature_rejected() {
        let (_, signer) = setup(NOW);
        let record = signer.create(SECRET, DEFAULT_NONCE_EXPIRY).await.unwrap();

        assert!(!signer.verify_record(&record, "other-secret").await);

        let mut tampered = record.clone();
        tampered.nonce.replace_range(0..1, if tampered.nonce.starts_with('a') { "b" } else { "a" });
        assert!(!signer.verify_record(&tampered, SECRET).await);
    }

    #[tokio::test]
    async fn test_expired_nonce_skips_hmac() {
        let (counting, signer) = setup(NOW);
        let valid = signer
            .verify("abc", NOW - 300_001, "sig", SECRET, DEFAULT_NONCE_EXPIRY)
            .await;
        assert!(!valid);
        assert_eq!(counting.hmac_calls(), 0);
    }

    #[tokio::test]
    async fn test_future_nonce_skips_hmac() {
        let (counting, signer) = setup(NOW);
        let valid = signer
            .verify("abc", NOW + 1, "sig", SECRET, DEFAULT_NONCE_EXPIRY)
            .await;
        assert!(!valid);
        assert_eq!(counting.hmac_calls(), 0);
    }

    #[tokio::test]
    async fn test_boundary_age_is_still_checked() {
        let (counting, signer) = setup(NOW);
        let _ = signer
            .verify("abc", NOW - 300_000, "sig", SECRET, DEFAULT_NONCE_EXPIRY)
            .await;
        assert_eq!(counting.hmac_calls(), 1);
    }

    #[tokio::test]
    async fn test_hmac_failure_fails_closed() {
        let counting = Arc::new(CountingProvider::native().failing_hmac());
        let signer = NonceSigner::with_clock(
            Arc::new(CryptoResolver::with_provider(counting)),
            Arc::new(FixedClock(NOW)),
        );
        assert!(!signer.verify("abc", NOW, "sig", SECRET, DEFAULT_NONCE_EXPIRY).await);
    }

    #[tokio::test]
    async fn test_provider_without_constant_time_compare_fails_closed() {
        let web = Arc::new(WebCryptoProvider::new(Arc::new(SoftwareSubtle)));
        let signer = NonceSigner::with_clock(
            Arc::new(CryptoResolver::with_provider(web)),
            Arc::new(FixedClock(NOW)),
        );
        let record = signer.create(SECRET, DEFAULT_NONCE_EXPIRY).await.unwrap();
        assert!(!signer.verify_record(&record, SECRET).await);
    }

    #[test]
    fn test_serializes_camel_case() {
        let record = SignedNonce {
            nonce: "ab".into(),
            timestamp: 1,
            signature: "cd".into(),
            expires_at: 2,
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["expiresAt"], 2);
    }
}
