//! `IYZWSv2` request signing.
//!
//! ```text
//! signature = hex(HMAC-SHA256(secret_key, random_key + path + body))
//! header    = "IYZWSv2 " + base64("apiKey:" + api_key + "&randomKey:" + random_key + "&signature:" + signature)
//! ```
//!
//! The random key must be unique per request; reusing one lets a captured
//! header be replayed against the same path and body.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, instrument};

use crate::provider::CryptoProvider;
use crate::resolver::{default_resolver, CryptoResolver};
use crate::Result;

/// Authorization scheme prefix.
pub const AUTH_SCHEME: &str = "IYZWSv2";

/// Merchant API credentials.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    api_key: String,
    secret_key: String,
}

impl Credentials {
    /// Create credentials.
    pub fn new(api_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            secret_key: secret_key.into(),
        }
    }

    /// The public API key.
    #[must_use]
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// The shared secret.
    #[must_use]
    pub fn secret_key(&self) -> &str {
        &self.secret_key
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &self.api_key)
            .field("secret_key", &"[REDACTED]")
            .finish()
    }
}

/// A complete `Authorization` header value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationHeader(String);

impl AuthorizationHeader {
    /// Prefix a base64 token with the scheme.
    #[must_use]
    pub fn from_token(token: &str) -> Self {
        Self(format!("{AUTH_SCHEME} {token}"))
    }

    /// The header value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The base64 token without the scheme.
    #[must_use]
    pub fn token(&self) -> &str {
        self.0
            .strip_prefix(AUTH_SCHEME)
            .map_or(self.0.as_str(), str::trim_start)
    }

    /// Consume into the header string.
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for AuthorizationHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The string the HMAC covers: `random_key + path + body`, no delimiters.
#[must_use]
pub fn signing_payload(random_key: &str, path: &str, body: &str) -> String {
    let mut payload = String::with_capacity(random_key.len() + path.len() + body.len());
    payload.push_str(random_key);
    payload.push_str(path);
    payload.push_str(body);
    payload
}

/// The ampersand-joined parameter list that gets base64-encoded.
#[must_use]
pub fn auth_params(api_key: &str, random_key: &str, signature: &str) -> String {
    format!("apiKey:{api_key}&randomKey:{random_key}&signature:{signature}")
}

/// Sign one request with an explicit provider.
pub async fn sign_with(
    provider: &dyn CryptoProvider,
    credentials: &Credentials,
    path: &str,
    random_key: &str,
    body: &str,
) -> Result<AuthorizationHeader> {
    let payload = signing_payload(random_key, path, body);
    let signature = provider
        .hmac_sha256(credentials.secret_key(), &payload)
        .await?;
    let params = auth_params(credentials.api_key(), random_key, &signature);
    let token = provider.base64_encode(&params)?;
    Ok(AuthorizationHeader::from_token(&token))
}

/// Signs outbound requests through a resolver's active provider.
#[derive(Debug, Clone)]
pub struct RequestSigner {
    credentials: Credentials,
    resolver: Arc<CryptoResolver>,
}

impl RequestSigner {
    /// Create a signer bound to `resolver`.
    #[must_use]
    pub fn new(credentials: Credentials, resolver: Arc<CryptoResolver>) -> Self {
        Self {
            credentials,
            resolver,
        }
    }

    /// Create a signer on the process-wide resolver.
    #[must_use]
    pub fn with_default_resolver(credentials: Credentials) -> Self {
        Self::new(credentials, default_resolver())
    }

    /// The credentials in use.
    #[must_use]
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// The resolver in use.
    #[must_use]
    pub fn resolver(&self) -> &Arc<CryptoResolver> {
        &self.resolver
    }

    /// Build the `Authorization` header for one request.
    ///
    /// `body` is the exact string sent on the wire, empty for bodyless
    /// requests.
    ///
    /// # Errors
    ///
    /// Propagates provider resolution and HMAC/encoding failures; callers
    /// must not send the request unsigned.
    #[instrument(skip(self, body), fields(body_len = body.len()))]
    pub async fn sign(
        &self,
        path: &str,
        random_key: &str,
        body: &str,
    ) -> Result<AuthorizationHeader> {
        let provider = self.resolver.get()?;
        let header = sign_with(provider.as_ref(), &self.credentials, path, random_key, body).await?;
        debug!(provider = provider.name(), "Request signed");
        Ok(header)
    }
}
