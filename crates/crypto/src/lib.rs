//! Cryptographic core for the iyzico payment gateway client.
//!
//! This crate provides:
//! - A [`CryptoProvider`] capability with native, platform-subtle and
//!   native-bridge backends, plus room for a custom one
//! - A [`CryptoResolver`] that picks and memoizes the active provider
//! - `IYZWSv2` request signing ([`RequestSigner`])
//! - The legacy bracket canonical string ([`build_canonical_string`])
//! - Signed nonces and webhook signature verification
//! - Id generation for conversations, baskets and idempotency keys
//!
//! ```no_run
//! use iyzipay_crypto::{Credentials, RequestSigner};
//!
//! # async fn run() -> iyzipay_crypto::Result<()> {
//! let signer = RequestSigner::with_default_resolver(Credentials::new("api-key", "secret-key"));
//! let header = signer.sign("/payment/auth", "1703001234567", r#"{"locale":"tr"}"#).await?;
//! assert!(header.as_str().starts_with("IYZWSv2 "));
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod backends;
mod canonical;
mod clock;
mod digest;
mod encoding;
mod error;
mod ids;
mod nonce;
mod provider;
mod resolver;
mod signer;
mod timing;
pub mod utils;
mod webhook;

#[cfg(any(test, feature = "test-util"))]
pub mod testing;

#[cfg(feature = "wasm")]
mod wasm;

pub use canonical::{build_canonical_string, canonical_string_of};
pub use clock::{Clock, SystemClock};
pub use digest::{hmac_sha256_hex, sha1_base64, DigestAlgorithm};
pub use encoding::{Base64Codec, Base64Support};
pub use error::{CryptoError, Result};
pub use ids::{IdGenerator, SecretKeyFormat, DEFAULT_CONVERSATION_PREFIX, DEFAULT_IDEMPOTENCY_CONTEXT};
pub use nonce::{NonceSigner, SignedNonce, DEFAULT_NONCE_EXPIRY, NONCE_BYTES};
pub use provider::{CryptoProvider, SharedProvider};
pub use resolver::{default_resolver, CryptoResolver, CryptoResolverBuilder, Probe};
pub use signer::{
    auth_params, sign_with, signing_payload, AuthorizationHeader, Credentials, RequestSigner,
    AUTH_SCHEME,
};
pub use timing::{constant_time_eq, constant_time_eq_str};
pub use webhook::{verify_webhook_signature, WebhookVerification, SIGNATURE_HEADER};
