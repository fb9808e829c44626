//! Error types for the API client

use std::fmt;

use iyzipay_crypto::CryptoError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for API operations
pub type ApiResult<T> = Result<T, ApiError>;

/// API client errors
#[derive(Error, Debug)]
pub enum ApiError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Missing environment variable
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    /// The request could not be signed; it was not sent
    #[error("Request signing failed: {0}")]
    Signing(#[from] CryptoError),

    /// Non-2xx HTTP response
    #[error("HTTP {status}: {message}")]
    Http {
        /// HTTP status code
        status: u16,
        /// Response body text
        message: String,
    },

    /// The gateway answered with `"status": "failure"`
    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    /// Invalid URL or request path
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl ApiError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a missing env var error
    pub fn missing_env(var: impl Into<String>) -> Self {
        Self::MissingEnvVar(var.into())
    }

    /// Create an HTTP status error
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self::Http {
            status,
            message: message.into(),
        }
    }

    /// Check if this is a client error (4xx)
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Http { status, .. } if (400..500).contains(status))
    }

    /// Check if this is a server error (5xx)
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        matches!(self, Self::Http { status, .. } if *status >= 500)
    }

    /// The gateway's error payload, if this is a gateway failure
    #[must_use]
    pub fn gateway(&self) -> Option<&GatewayError> {
        match self {
            Self::Gateway(e) => Some(e),
            _ => None,
        }
    }
}

/// Failure payload returned by the gateway with HTTP 200.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayError {
    /// Always `"failure"`
    pub status: String,
    /// Gateway error code, e.g. `"1000"`
    #[serde(default)]
    pub error_code: Option<String>,
    /// Human-readable message in the request locale
    #[serde(default)]
    pub error_message: Option<String>,
    /// Error group, e.g. `"NOT_SUFFICIENT_FUNDS"`
    #[serde(default)]
    pub error_group: Option<String>,
    /// Response locale
    #[serde(default)]
    pub locale: Option<String>,
    /// Echo of the request's conversation id
    #[serde(default)]
    pub conversation_id: Option<String>,
    /// Gateway time, epoch millis
    #[serde(default)]
    pub system_time: Option<i64>,
}

impl fmt::Display for GatewayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.error_message.as_deref().unwrap_or("Unknown Iyzipay Error"))?;
        if let Some(ref code) = self.error_code {
            write!(f, " (code {code})")?;
        }
        Ok(())
    }
}

impl std::error::Error for GatewayError {}
