//! WASM bindings for the synchronous signing primitives.
//!
//! These run the in-process RustCrypto code directly and never go through a
//! resolver, so JS callers get the same bytes the native provider produces.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use wasm_bindgen::prelude::*;

use crate::signer::{auth_params, signing_payload, AuthorizationHeader};

fn to_js(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// Canonical bracket string of a JSON document.
#[wasm_bindgen(js_name = buildCanonicalString)]
pub fn build_canonical_string(json: &str) -> Result<String, JsValue> {
    let value: serde_json::Value = serde_json::from_str(json).map_err(to_js)?;
    Ok(crate::canonical::build_canonical_string(&value))
}

/// HMAC-SHA256 of `message` under `key`, lowercase hex.
#[wasm_bindgen(js_name = hmacSha256Hex)]
pub fn hmac_sha256_hex(key: &str, message: &str) -> Result<String, JsValue> {
    crate::digest::hmac_sha256_hex(key.as_bytes(), message.as_bytes()).map_err(to_js)
}

/// SHA-1 of `data`, base64.
#[wasm_bindgen(js_name = sha1Base64)]
pub fn sha1_base64(data: &str) -> String {
    crate::digest::sha1_base64(data)
}

/// Full `IYZWSv2` header value for one request.
#[wasm_bindgen(js_name = authorizationHeader)]
pub fn authorization_header(
    api_key: &str,
    secret_key: &str,
    path: &str,
    random_key: &str,
    body: &str,
) -> Result<String, JsValue> {
    let payload = signing_payload(random_key, path, body);
    let signature =
        crate::digest::hmac_sha256_hex(secret_key.as_bytes(), payload.as_bytes()).map_err(to_js)?;
    let token = STANDARD.encode(auth_params(api_key, random_key, &signature));
    Ok(AuthorizationHeader::from_token(&token).into_string())
}

/// Verify an `x-iyz-signature` value against the raw body.
///
/// Empty inputs are rejected.
#[wasm_bindgen(js_name = verifyWebhookSignature)]
pub fn verify_webhook_signature(secret_key: &str, body: &str, signature: &str) -> bool {
    if secret_key.is_empty() || body.is_empty() || signature.is_empty() {
        return false;
    }
    crate::digest::hmac_sha256_hex(secret_key.as_bytes(), body.as_bytes())
        .map(|expected| crate::timing::constant_time_eq_str(&expected, signature))
        .unwrap_or(false)
}

/// Constant-time comparison of two strings.
#[wasm_bindgen(js_name = timingSafeEqual)]
pub fn timing_safe_equal(a: &str, b: &str) -> bool {
    crate::timing::constant_time_eq_str(a, b)
}
