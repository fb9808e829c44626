//! Built-in provider backends.
//!
//! | Backend | Engine | HMAC | Constant-time compare |
//! |---------|--------|------|-----------------------|
//! | [`NativeCryptoProvider`] | RustCrypto, in process | yes | yes |
//! | [`WebCryptoProvider`] | host [`SubtleCrypto`] engine | yes | no |
//! | [`BridgeCryptoProvider`] | host [`NativeBridge`] | no | via bridge |
//!
//! Anything else implementing [`CryptoProvider`](crate::CryptoProvider) can be
//! injected through the resolver.

mod bridge;
mod native;
mod web;

pub use bridge::{BridgeCryptoProvider, DigestEncoding, NativeBridge};
pub use native::NativeCryptoProvider;
pub use web::{SoftwareSubtle, SubtleCrypto, WebCryptoProvider};
