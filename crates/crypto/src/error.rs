//! Error types for the crypto crate.

use thiserror::Error;

/// Result type alias for crypto operations.
pub type Result<T> = std::result::Result<T, CryptoError>;

/// Errors that can occur during crypto operations.
///
/// Verification helpers never surface these: a signature that does not
/// verify is reported as `false`. Errors are reserved for environmental and
/// configuration problems.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// No provider could be resolved in the current runtime
    #[error(
        "No crypto implementation available. Please ensure you are running in a supported \
         environment (platform subtle-crypto engine or native server build) or inject a custom \
         provider with `CryptoResolver::set`."
    )]
    Unavailable,

    /// The resolved provider lacks a specific primitive
    #[error("{operation} not available in the {provider} provider: {reason}")]
    Unsupported {
        /// Provider name
        provider: String,
        /// Operation that was requested
        operation: &'static str,
        /// Why the operation cannot be served
        reason: String,
    },

    /// Encoding error
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// Invalid key
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// The random source failed
    #[error("Random source failure: {0}")]
    Random(String),

    /// A host-supplied primitive failed
    #[error("Crypto backend failure: {0}")]
    Backend(String),
}

impl CryptoError {
    /// Create an unsupported-operation error
    pub fn unsupported(
        provider: impl Into<String>,
        operation: &'static str,
        reason: impl Into<String>,
    ) -> Self {
        Self::Unsupported {
            provider: provider.into(),
            operation,
            reason: reason.into(),
        }
    }

    /// Create a backend error
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }

    /// Check if the provider simply lacks the requested primitive
    #[must_use]
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::Unsupported { .. })
    }

    /// Check if no provider could be resolved at all
    #[must_use]
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable)
    }
}

impl From<getrandom::Error> for CryptoError {
    fn from(err: getrandom::Error) -> Self {
        Self::Random(err.to_string())
    }
}
