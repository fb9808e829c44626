//! Convenience functions on the process-wide resolver.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Serialize;

use crate::resolver::default_resolver;
use crate::Result;

/// Base64 SHA-1 of `data`.
pub async fn calculate_sha1(data: &str) -> Result<String> {
    default_resolver().get()?.sha1(data).await
}

/// Hex HMAC-SHA256 of `data` under `key`.
pub async fn calculate_hmac(key: &str, data: &str) -> Result<String> {
    default_resolver().get()?.hmac_sha256(key, data).await
}

/// Base64-encode UTF-8 text.
pub fn string_to_base64(data: &str) -> Result<String> {
    default_resolver().get()?.base64_encode(data)
}

/// Decode base64 into UTF-8 text.
pub fn base64_to_string(data: &str) -> Result<String> {
    default_resolver().get()?.base64_decode(data)
}

/// One random draw in three renderings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RandomBytes {
    /// Lowercase hex
    pub hex: String,
    /// Standard padded base64
    pub base64: String,
    /// Raw bytes
    pub bytes: Vec<u8>,
}

/// `length` random bytes from the active provider.
pub fn generate_random_bytes(length: usize) -> Result<RandomBytes> {
    let bytes = default_resolver().get()?.random_bytes(length)?;
    Ok(RandomBytes {
        hex: hex::encode(&bytes),
        base64: STANDARD.encode(&bytes),
        bytes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_sha1_is_base64() {
        assert_eq!(
            calculate_sha1("abc").await.unwrap(),
            "qZk+NkcGgWq6PiVxeFDCbJzQ2J0="
        );
    }

    #[tokio::test]
    async fn test_hmac_is_hex() {
        let sig = calculate_hmac("key", "The quick brown fox jumps over the lazy dog")
            .await
            .unwrap();
        assert_eq!(
            sig,
            "f7bc83f430538424b13298e6aa6fb143ef4d59a14946175997479dbc2d1a3cd8"
        );
    }

    #[test]
    fn test_base64_helpers() {
        assert_eq!(string_to_base64("Hello World").unwrap(), "SGVsbG8gV29ybGQ=");
        assert_eq!(base64_to_string("SGVsbG8gV29ybGQ=").unwrap(), "Hello World");
        assert_eq!(base64_to_string(&string_to_base64("İyzico ödeme").unwrap()).unwrap(), "İyzico ödeme");
    }

    #[test]
    fn test_random_bytes_renderings_agree() {
        let r = generate_random_bytes(32).unwrap();
        assert_eq!(r.bytes.len(), 32);
        assert_eq!(r.hex, hex::encode(&r.bytes));
        assert_eq!(STANDARD.decode(&r.base64).unwrap(), r.bytes);
    }
}
