//! Signed HTTP client for the iyzico payment gateway
//!
//! This crate wraps `reqwest` with the gateway's `IYZWSv2` authentication.
//! Signing, nonces and webhook verification come from `iyzipay-crypto`.
//!
//! # Features
//!
//! - **Environment-based configuration**: Load keys and the base URL from environment variables
//! - **Per-request signing**: Unique random key and authorization header on every call
//! - **Typed errors**: HTTP failures and gateway `failure` payloads are distinct variants
//! - **Webhook verification**: Check `x-iyz-signature` against the configured secret
//!
//! # Example
//!
//! ```rust,no_run
//! use iyzipay_client::{ClientConfig, IyzipayClient};
//! use serde_json::{json, Value};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = IyzipayClient::with_config(ClientConfig::sandbox("api-key", "secret-key"))?;
//!
//!     let result: Value = client
//!         .post("/payment/bin/check", &json!({"locale": "tr", "binNumber": "554960"}))
//!         .await?;
//!     println!("{}", result["cardAssociation"]);
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod client;
pub mod config;
pub mod error;
pub mod random_key;

pub use client::IyzipayClient;
pub use config::{ClientConfig, Environment};
pub use error::{ApiError, ApiResult, GatewayError};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::client::IyzipayClient;
    pub use crate::config::{ClientConfig, Environment};
    pub use crate::error::{ApiError, ApiResult, GatewayError};
    pub use iyzipay_crypto::{Credentials, IdGenerator, NonceSigner, SignedNonce};
}
