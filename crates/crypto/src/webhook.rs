//! Inbound webhook signature verification.

use tracing::{debug, warn};

use crate::resolver::CryptoResolver;
use crate::timing::constant_time_eq_str;

/// Header carrying the webhook signature.
pub const SIGNATURE_HEADER: &str = "x-iyz-signature";

/// Inputs to [`verify_webhook_signature`].
#[derive(Clone, Copy)]
pub struct WebhookVerification<'a> {
    /// Merchant secret key
    pub secret_key: &'a str,
    /// Raw request body exactly as received
    pub body: &'a str,
    /// Value of the [`SIGNATURE_HEADER`] header
    pub signature: &'a str,
}

impl std::fmt::Debug for WebhookVerification<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookVerification")
            .field("secret_key", &"[REDACTED]")
            .field("body_len", &self.body.len())
            .field("signature", &self.signature)
            .finish()
    }
}

/// Verify a webhook body against its HMAC-SHA256 hex signature.
///
/// Returns `false` without touching the provider when any input is empty,
/// and `false` when the HMAC cannot be computed. The body must not be
/// re-serialized before calling this.
pub async fn verify_webhook_signature(
    resolver: &CryptoResolver,
    opts: WebhookVerification<'_>,
) -> bool {
    if opts.secret_key.is_empty() || opts.body.is_empty() || opts.signature.is_empty() {
        debug!("Webhook verification skipped: empty input");
        return false;
    }

    let provider = match resolver.get() {
        Ok(p) => p,
        Err(e) => {
            warn!(error = %e, "Webhook verification failed closed");
            return false;
        }
    };

    match provider.hmac_sha256(opts.secret_key, opts.body).await {
        Ok(expected) => constant_time_eq_str(&expected, opts.signature),
        Err(e) => {
            warn!(provider = provider.name(), error = %e, "Webhook verification failed closed");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::digest::hmac_sha256_hex;
    use crate::testing::CountingProvider;
    use std::sync::Arc;

    const SECRET: &str = "merchant-secret";
    const BODY: &str = r#"{"paymentConversationId":"123","status":"SUCCESS","iyziEventType":"CHECKOUT_FORM_AUTH"}"#;

    fn counting_resolver(provider: CountingProvider) -> (Arc<CountingProvider>, CryptoResolver) {
        let provider = Arc::new(provider);
        let resolver = CryptoResolver::with_provider(provider.clone());
        (provider, resolver)
    }

    fn valid_signature() -> String {
        hmac_sha256_hex(SECRET.as_bytes(), BODY.as_bytes()).unwrap()
    }

    #[tokio::test]
    async fn test_valid_signature() {
        let (_, resolver) = counting_resolver(CountingProvider::native());
        let sig = valid_signature();
        let ok = verify_webhook_signature(
            &resolver,
            WebhookVerification {
                secret_key: SECRET,
                body: BODY,
                signature: &sig,
            },
        )
        .await;
        assert!(ok);
    }

    #[tokio::test]
    async fn test_tampered_body_rejected() {
        let (_, resolver) = counting_resolver(CountingProvider::native());
        let sig = valid_signature();
        let tampered = BODY.replace("SUCCESS", "FAILURE");
        let ok = verify_webhook_signature(
            &resolver,
            WebhookVerification {
                secret_key: SECRET,
                body: &tampered,
                signature: &sig,
            },
        )
        .await;
        assert!(!ok);
    }

    #[tokio::test]
    async fn test_empty_inputs_make_no_crypto_calls() {
        let (counting, resolver) = counting_resolver(CountingProvider::native());
        let sig = valid_signature();

        for (secret_key, body, signature) in [
            ("", BODY, sig.as_str()),
            (SECRET, "", sig.as_str()),
            (SECRET, BODY, ""),
        ] {
            let ok = verify_webhook_signature(
                &resolver,
                WebhookVerification {
                    secret_key,
                    body,
                    signature,
                },
            )
            .await;
            assert!(!ok);
        }
        assert_eq!(counting.hmac_calls(), 0);
    }

    #[tokio::test]
    async fn test_hmac_failure_returns_false() {
        let (counting, resolver) = counting_resolver(CountingProvider::native().failing_hmac());
        let sig = valid_signature();
        let ok = verify_webhook_signature(
            &resolver,
            WebhookVerification {
                secret_key: SECRET,
                body: BODY,
                signature: &sig,
            },
        )
        .await;
        assert!(!ok);
        assert_eq!(counting.hmac_calls(), 1);
    }

    #[tokio::test]
    async fn test_unavailable_provider_returns_false() {
        let resolver = CryptoResolver::builder().without_native().build();
        let ok = verify_webhook_signature(
            &resolver,
            WebhookVerification {
                secret_key: SECRET,
                body: BODY,
                signature: "00",
            },
        )
        .await;
        assert!(!ok);
    }

    #[test]
    fn test_debug_redacts_secret() {
        let opts = WebhookVerification {
            secret_key: "do-not-print",
            body: "{}",
            signature: "ab",
        };
        assert!(!format!("{opts:?}").contains("do-not-print"));
    }
}
