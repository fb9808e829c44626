//! Identifier generation for payment flows.
//!
//! Generated ids follow `<kind>_<context>_<epoch millis>_<random hex>` so they
//! sort roughly by creation time and stay unique across processes.

use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::clock::{Clock, SystemClock};
use crate::resolver::{default_resolver, CryptoResolver};
use crate::Result;

/// Default conversation id prefix.
pub const DEFAULT_CONVERSATION_PREFIX: &str = "conv";

/// Default idempotency key context.
pub const DEFAULT_IDEMPOTENCY_CONTEXT: &str = "request";

const CONVERSATION_RANDOM_BYTES: usize = 8;
const BASKET_RANDOM_BYTES: usize = 4;
const IDEMPOTENCY_RANDOM_BYTES: usize = 12;
const SECRET_KEY_BYTES: usize = 32;
const REFERENCE_HASH_CHARS: usize = 16;

/// Output encoding for [`IdGenerator::secret_key`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SecretKeyFormat {
    /// 64 lowercase hex characters
    #[default]
    Hex,
    /// Standard padded base64
    Base64,
}

/// Generates conversation ids, basket ids, idempotency keys and secrets.
#[derive(Debug, Clone)]
pub struct IdGenerator {
    resolver: Arc<CryptoResolver>,
    clock: Arc<dyn Clock>,
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new(default_resolver())
    }
}

impl IdGenerator {
    /// Generator on `resolver` using the system clock.
    #[must_use]
    pub fn new(resolver: Arc<CryptoResolver>) -> Self {
        Self::with_clock(resolver, Arc::new(SystemClock))
    }

    /// Generator with an explicit clock.
    #[must_use]
    pub fn with_clock(resolver: Arc<CryptoResolver>, clock: Arc<dyn Clock>) -> Self {
        Self { resolver, clock }
    }

    fn random_hex(&self, bytes: usize) -> Result<String> {
        self.resolver.get()?.random_string(bytes)
    }

    /// `<prefix>_<millis>_<16 hex>`, for request tracking.
    pub fn conversation_id(&self, prefix: &str) -> Result<String> {
        let random = self.random_hex(CONVERSATION_RANDOM_BYTES)?;
        Ok(format!("{prefix}_{}_{random}", self.clock.now_millis()))
    }

    /// `basket_<user>_<millis>_<8 hex>`; `anon` when no user is given.
    pub fn basket_id(&self, user_id: Option<&str>) -> Result<String> {
        let user = user_id.filter(|u| !u.is_empty()).unwrap_or("anon");
        let random = self.random_hex(BASKET_RANDOM_BYTES)?;
        Ok(format!("basket_{user}_{}_{random}", self.clock.now_millis()))
    }

    /// `idem_<context>_<millis>_<24 hex>`.
    ///
    /// Store the key and reuse it when retrying the same operation.
    pub fn idempotency_key(&self, context: &str) -> Result<String> {
        let random = self.random_hex(IDEMPOTENCY_RANDOM_BYTES)?;
        Ok(format!("idem_{context}_{}_{random}", self.clock.now_millis()))
    }

    /// Non-reversible reference for a combination of identifiers.
    ///
    /// `ref_` followed by the first 16 characters of the base64 SHA-1 of
    /// the parts joined with `::`.
    pub async fn hash_payment_reference(&self, parts: &[&str]) -> Result<String> {
        let hash = self.resolver.get()?.sha1(&parts.join("::")).await?;
        let prefix: String = hash.chars().take(REFERENCE_HASH_CHARS).collect();
        Ok(format!("ref_{prefix}"))
    }

    /// 32 random bytes for webhook secrets and similar.
    pub fn secret_key(&self, format: SecretKeyFormat) -> Result<String> {
        let bytes = self.resolver.get()?.random_bytes(SECRET_KEY_BYTES)?;
        Ok(match format {
            SecretKeyFormat::Hex => hex::encode(bytes),
            SecretKeyFormat::Base64 => STANDARD.encode(bytes),
        })
    }
}
