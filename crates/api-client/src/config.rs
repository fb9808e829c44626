//! Configuration for the iyzico API client
//!
//! Supports environment-based configuration with sensible defaults.

use crate::error::{ApiError, ApiResult};
use iyzipay_crypto::Credentials;
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::time::Duration;

/// Production API endpoint
pub const PRODUCTION_BASE_URL: &str = "https://api.iyzipay.com";

/// Sandbox API endpoint
pub const SANDBOX_BASE_URL: &str = "https://sandbox-api.iyzipay.com";

/// Value of the `x-iyzi-client-version` header
pub const CLIENT_VERSION: &str = concat!("iyzipay-rust-", env!("CARGO_PKG_VERSION"));

const DEFAULT_TIMEOUT_SECS: u64 = 30;

const API_KEY_VAR: &str = "IYZIPAY_API_KEY";
const SECRET_KEY_VAR: &str = "IYZIPAY_SECRET_KEY";
const BASE_URL_VAR: &str = "IYZIPAY_BASE_URL";
const TIMEOUT_VAR: &str = "IYZIPAY_TIMEOUT_SECS";

/// Gateway environments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Sandbox (test cards, no money moves)
    Sandbox,
    /// Production
    #[default]
    Production,
}

impl Environment {
    /// Classify a base URL; anything pointing at a sandbox host is `Sandbox`.
    #[must_use]
    pub fn from_base_url(url: &str) -> Self {
        if url.contains("sandbox") {
            Self::Sandbox
        } else {
            Self::Production
        }
    }

    /// The canonical base URL for this environment
    #[must_use]
    pub fn base_url(self) -> &'static str {
        match self {
            Self::Sandbox => SANDBOX_BASE_URL,
            Self::Production => PRODUCTION_BASE_URL,
        }
    }
}

/// Client configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Merchant API key
    pub api_key: String,
    /// Merchant secret key; read on deserialize, never written out
    #[serde(skip_serializing)]
    pub secret_key: String,
    /// Gateway base URL, without a trailing path
    pub base_url: String,
    /// Request timeout
    #[serde(with = "duration_secs")]
    pub timeout: Duration,
    /// Sent as `x-iyzi-client-version`
    pub client_version: String,
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        duration.as_secs().serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &self.api_key)
            .field("secret_key", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("client_version", &self.client_version)
            .finish()
    }
}

impl ClientConfig {
    /// Production configuration
    pub fn new(api_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self::production(api_key, secret_key)
    }

    /// Create configuration from environment variables
    ///
    /// Reads the following environment variables:
    /// - `IYZIPAY_API_KEY`: Merchant API key (required)
    /// - `IYZIPAY_SECRET_KEY`: Merchant secret key (required)
    /// - `IYZIPAY_BASE_URL`: Gateway URL (default: production)
    /// - `IYZIPAY_TIMEOUT_SECS`: Request timeout in seconds (default: 30)
    pub fn from_env() -> ApiResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> ApiResult<Self> {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.is_empty())
                .ok_or_else(|| ApiError::missing_env(key))
        };

        let api_key = required(API_KEY_VAR)?;
        let secret_key = required(SECRET_KEY_VAR)?;

        let base_url = lookup(BASE_URL_VAR)
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| PRODUCTION_BASE_URL.to_string());

        let timeout = lookup(TIMEOUT_VAR)
            .and_then(|s| s.parse().ok())
            .map_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS), Duration::from_secs);

        Ok(Self {
            api_key,
            secret_key,
            base_url,
            timeout,
            client_version: CLIENT_VERSION.to_string(),
        })
    }

    /// Sandbox configuration
    #[must_use]
    pub fn sandbox(api_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self::for_environment(Environment::Sandbox, api_key.into(), secret_key.into())
    }

    /// Production configuration
    #[must_use]
    pub fn production(api_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self::for_environment(Environment::Production, api_key.into(), secret_key.into())
    }

    fn for_environment(environment: Environment, api_key: String, secret_key: String) -> Self {
        Self {
            api_key,
            secret_key,
            base_url: environment.base_url().to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            client_version: CLIENT_VERSION.to_string(),
        }
    }

    /// Environment derived from the base URL
    #[must_use]
    pub fn environment(&self) -> Environment {
        Environment::from_base_url(&self.base_url)
    }

    /// Signing credentials
    #[must_use]
    pub fn credentials(&self) -> Credentials {
        Credentials::new(self.api_key.clone(), self.secret_key.clone())
    }

    /// Builder-style method to set base URL
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Builder-style method to set timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Builder-style method to set the client version header
    #[must_use]
    pub fn with_client_version(mut self, version: impl Into<String>) -> Self {
        self.client_version = version.into();
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> ApiResult<()> {
        if self.api_key.is_empty() {
            return Err(ApiError::config("api_key cannot be empty"));
        }

        if self.secret_key.is_empty() {
            return Err(ApiError::config("secret_key cannot be empty"));
        }

        if self.base_url.is_empty() {
            return Err(ApiError::config("base_url cannot be empty"));
        }

        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ApiError::config("base_url must start with http:// or https://"));
        }

        if self.timeout.is_zero() {
            return Err(ApiError::config("timeout cannot be zero"));
        }

        Ok(())
    }
}
