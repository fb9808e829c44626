//! Main API client implementation

use crate::config::ClientConfig;
use crate::error::{ApiError, ApiResult, GatewayError};
use crate::random_key::RandomKeySequence;
use iyzipay_crypto::{
    default_resolver, verify_webhook_signature, AuthorizationHeader, CryptoResolver, IdGenerator,
    NonceSigner, RequestSigner, WebhookVerification,
};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

/// Header repeating the request's random key
pub const RANDOM_KEY_HEADER: &str = "x-iyzi-rnd";

/// Header carrying the client version
pub const CLIENT_VERSION_HEADER: &str = "x-iyzi-client-version";

/// Signed client for the iyzico API
///
/// Every request gets a fresh random key, an `IYZWSv2` authorization header
/// computed over `random_key + path + body`, and the companion headers. A
/// request that cannot be signed is never sent.
#[derive(Clone)]
pub struct IyzipayClient {
    inner: Client,
    config: Arc<ClientConfig>,
    signer: RequestSigner,
    random_keys: Arc<RandomKeySequence>,
}

impl std::fmt::Debug for IyzipayClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IyzipayClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl IyzipayClient {
    /// Create a new client with configuration from environment
    pub fn new() -> ApiResult<Self> {
        let config = ClientConfig::from_env()?;
        Self::with_config(config)
    }

    /// Create a new client with specific configuration
    pub fn with_config(config: ClientConfig) -> ApiResult<Self> {
        Self::with_resolver(config, default_resolver())
    }

    /// Create a client whose signing goes through `resolver`
    pub fn with_resolver(config: ClientConfig, resolver: Arc<CryptoResolver>) -> ApiResult<Self> {
        Self::build(config, resolver, Arc::new(RandomKeySequence::default()))
    }

    fn build(
        config: ClientConfig,
        resolver: Arc<CryptoResolver>,
        random_keys: Arc<RandomKeySequence>,
    ) -> ApiResult<Self> {
        config.validate()?;

        let mut default_headers = HeaderMap::new();
        default_headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        default_headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let version = HeaderValue::from_str(&config.client_version)
            .map_err(|e| ApiError::config(format!("invalid client_version: {e}")))?;
        default_headers.insert(CLIENT_VERSION_HEADER, version);

        let inner = Client::builder()
            .timeout(config.timeout)
            .default_headers(default_headers)
            .build()
            .map_err(ApiError::Request)?;

        let signer = RequestSigner::new(config.credentials(), resolver);

        Ok(Self {
            inner,
            config: Arc::new(config),
            signer,
            random_keys,
        })
    }

    /// Get the current configuration
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Get the base URL
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// The resolver used for signing and verification
    #[must_use]
    pub fn resolver(&self) -> &Arc<CryptoResolver> {
        self.signer.resolver()
    }

    /// Id generator on this client's resolver
    #[must_use]
    pub fn ids(&self) -> IdGenerator {
        IdGenerator::new(Arc::clone(self.resolver()))
    }

    /// Nonce signer on this client's resolver
    #[must_use]
    pub fn nonces(&self) -> NonceSigner {
        NonceSigner::new(Arc::clone(self.resolver()))
    }

    /// Compute the authorization header for an explicit key and body
    pub async fn authorization_for(
        &self,
        path: &str,
        random_key: &str,
        body: &str,
    ) -> ApiResult<AuthorizationHeader> {
        Ok(self.signer.sign(path, random_key, body).await?)
    }

    /// Check an inbound webhook against the configured secret key
    ///
    /// `body` must be the raw request body as received.
    pub async fn verify_webhook(&self, body: &str, signature: &str) -> bool {
        verify_webhook_signature(
            self.resolver(),
            WebhookVerification {
                secret_key: &self.config.secret_key,
                body,
                signature,
            },
        )
        .await
    }

    // -------------------------------------------------------------------------
    // HTTP methods
    // -------------------------------------------------------------------------

    /// Perform a signed GET request; the body is empty
    #[instrument(skip(self), fields(request_id))]
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        self.request(Method::GET, path, String::new()).await
    }

    /// Perform a signed POST request
    #[instrument(skip(self, body), fields(request_id))]
    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> ApiResult<T> {
        let body = serde_json::to_string(body)?;
        self.request(Method::POST, path, body).await
    }

    /// Perform a signed PUT request
    #[instrument(skip(self, body), fields(request_id))]
    pub async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> ApiResult<T> {
        let body = serde_json::to_string(body)?;
        self.request(Method::PUT, path, body).await
    }

    /// Perform a signed DELETE request
    #[instrument(skip(self, body), fields(request_id))]
    pub async fn delete<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> ApiResult<T> {
        let body = serde_json::to_string(body)?;
        self.request(Method::DELETE, path, body).await
    }

    /// Sign and send one request. `body` is the exact wire string.
    async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: String,
    ) -> ApiResult<T> {
        if !path.starts_with('/') {
            return Err(ApiError::InvalidUrl(format!("path must start with '/': {path}")));
        }

        let request_id = Uuid::new_v4().to_string();
        tracing::Span::current().record("request_id", request_id.as_str());

        let url = format!("{}{}", self.config.base_url.trim_end_matches('/'), path);
        let random_key = self.random_keys.next_key();
        let authorization = self.signer.sign(path, &random_key, &body).await?;

        let mut request = self
            .inner
            .request(method.clone(), &url)
            .header(RANDOM_KEY_HEADER, &random_key)
            .header(AUTHORIZATION, authorization.into_string());

        if method != Method::GET {
            request = request.body(body);
        }

        let start = Instant::now();
        let response = request.send().await?;
        debug!(
            request_id = %request_id,
            method = %method,
            path,
            status = response.status().as_u16(),
            elapsed_ms = start.elapsed().as_millis(),
            "Response received"
        );

        self.handle_response(response).await
    }

    /// Map HTTP and gateway failures, then deserialize
    async fn handle_response<T: DeserializeOwned>(&self, response: Response) -> ApiResult<T> {
        let status = response.status();

        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            warn!(status = status.as_u16(), "Gateway returned HTTP error");
            return Err(ApiError::http(status.as_u16(), message));
        }

        let value: Value = response.json().await?;
        if value.get("status").and_then(Value::as_str) == Some("failure") {
            let failure: GatewayError = serde_json::from_value(value)?;
            warn!(
                error_code = failure.error_code.as_deref().unwrap_or_default(),
                conversation_id = failure.conversation_id.as_deref().unwrap_or_default(),
                "Gateway reported failure"
            );
            return Err(failure.into());
        }

        Ok(serde_json::from_value(value)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use iyzipay_crypto::backends::NativeCryptoProvider;
    use iyzipay_crypto::testing::{CountingProvider, FixedClock};
    use iyzipay_crypto::{auth_params, hmac_sha256_hex, signing_payload, CryptoProvider};
    use mockito::{Matcher, Server};
    use serde::Deserialize;
    use serde_json::json;

    const API_KEY: &str = "sandbox-api-key";
    const SECRET_KEY: &str = "sandbox-secret-key";
    const NOW: i64 = 1_703_001_234_567;

    fn client_for(url: &str, resolver: Arc<CryptoResolver>) -> IyzipayClient {
        let config = ClientConfig::sandbox(API_KEY, SECRET_KEY).with_base_url(url);
        let keys = Arc::new(RandomKeySequence::new(Arc::new(FixedClock(NOW))));
        IyzipayClient::build(config, resolver, keys).unwrap()
    }

    fn expected_header(random_key: &str, path: &str, body: &str) -> String {
        let signature = hmac_sha256_hex(
            SECRET_KEY.as_bytes(),
            signing_payload(random_key, path, body).as_bytes(),
        )
        .unwrap();
        let token = NativeCryptoProvider::new()
            .base64_encode(&auth_params(API_KEY, random_key, &signature))
            .unwrap();
        format!("IYZWSv2 {token}")
    }

    #[tokio::test]
    async fn test_post_sends_signed_request() {
        let mut server = Server::new_async().await;
        let body = json!({"locale": "tr", "conversationId": "123456789", "price": "1.0"});
        let body_str = serde_json::to_string(&body).unwrap();
        let random_key = NOW.to_string();

        let mock = server
            .mock("POST", "/payment/auth")
            .match_header("authorization", expected_header(&random_key, "/payment/auth", &body_str).as_str())
            .match_header("x-iyzi-rnd", random_key.as_str())
            .match_header("x-iyzi-client-version", crate::config::CLIENT_VERSION)
            .match_header("content-type", "application/json")
            .match_header("accept", "application/json")
            .match_body(Matcher::Exact(body_str.clone()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({"status": "success", "locale": "tr"}).to_string())
            .create_async()
            .await;

        let client = client_for(&server.url(), Arc::new(CryptoResolver::new()));
        let response: Value = client.post("/payment/auth", &body).await.unwrap();
        assert_eq!(response["status"], "success");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_get_signs_key_and_path_only() {
        let mut server = Server::new_async().await;
        let random_key = NOW.to_string();

        let mock = server
            .mock("GET", "/payment/bin/check")
            .match_header("authorization", expected_header(&random_key, "/payment/bin/check", "").as_str())
            .match_body(Matcher::Exact(String::new()))
            .with_status(200)
            .with_body(r#"{"status":"success"}"#)
            .create_async()
            .await;

        let client = client_for(&server.url(), Arc::new(CryptoResolver::new()));
        let _: Value = client.get("/payment/bin/check").await.unwrap();
        mock.assert_async().await;
    }

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct Refund {
        status: String,
        payment_id: String,
        price: f64,
    }

    #[tokio::test]
    async fn test_typed_response() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/payment/refund")
            .with_status(200)
            .with_body(r#"{"status":"success","paymentId":"11","price":0.5,"currency":"TRY"}"#)
            .create_async()
            .await;

        let client = client_for(&server.url(), Arc::new(CryptoResolver::new()));
        let refund: Refund = client
            .post("/payment/refund", &json!({"paymentTransactionId": "11"}))
            .await
            .unwrap();
        assert_eq!(refund.status, "success");
        assert_eq!(refund.payment_id, "11");
        assert!((refund.price - 0.5).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_http_error() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("DELETE", "/v2/subscription/products/p1")
            .with_status(401)
            .with_body("unauthorized")
            .create_async()
            .await;

        let client = client_for(&server.url(), Arc::new(CryptoResolver::new()));
        let err = client
            .delete::<Value, _>("/v2/subscription/products/p1", &json!({}))
            .await
            .unwrap_err();
        assert!(err.is_client_error());
        assert_eq!(err.to_string(), "HTTP 401: unauthorized");
    }

    #[tokio::test]
    async fn test_gateway_failure() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("PUT", "/v2/subscription/products/p1")
            .with_status(200)
            .with_body(
                json!({
                    "status": "failure",
                    "errorCode": "1001",
                    "errorMessage": "api bilgileri bulunamadı",
                    "locale": "tr",
                    "systemTime": NOW,
                    "conversationId": "conv_1"
                })
                .to_string(),
            )
            .create_async()
            .await;

        let client = client_for(&server.url(), Arc::new(CryptoResolver::new()));
        let err = client
            .put::<Value, _>("/v2/subscription/products/p1", &json!({"name": "x"}))
            .await
            .unwrap_err();
        let gateway = err.gateway().unwrap();
        assert_eq!(gateway.error_code.as_deref(), Some("1001"));
        assert_eq!(gateway.conversation_id.as_deref(), Some("conv_1"));
        assert_eq!(gateway.system_time, Some(NOW));
    }

    #[tokio::test]
    async fn test_unsigned_request_is_never_sent() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let resolver = Arc::new(CryptoResolver::builder().without_native().build());
        let client = client_for(&server.url(), resolver);
        let err = client.post::<Value, _>("/payment/auth", &json!({})).await.unwrap_err();
        assert!(matches!(err, ApiError::Signing(_)));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_consecutive_requests_use_distinct_keys() {
        let mut server = Server::new_async().await;
        let first = server
            .mock("GET", "/ping")
            .match_header("x-iyzi-rnd", NOW.to_string().as_str())
            .with_body(r#"{"status":"success"}"#)
            .create_async()
            .await;
        let second = server
            .mock("GET", "/ping")
            .match_header("x-iyzi-rnd", (NOW + 1).to_string().as_str())
            .with_body(r#"{"status":"success"}"#)
            .create_async()
            .await;

        let client = client_for(&server.url(), Arc::new(CryptoResolver::new()));
        let _: Value = client.get("/ping").await.unwrap();
        let _: Value = client.get("/ping").await.unwrap();
        first.assert_async().await;
        second.assert_async().await;
    }

    #[tokio::test]
    async fn test_path_must_be_absolute() {
        let client = client_for("http://localhost:1", Arc::new(CryptoResolver::new()));
        let err = client.get::<Value>("payment/auth").await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidUrl(_)));
    }

    #[test]
    fn test_authorization_for_uses_counting_provider() {
        let counting = Arc::new(CountingProvider::native());
        let client = client_for(
            "http://localhost:1",
            Arc::new(CryptoResolver::with_provider(counting.clone())),
        );
        let header = tokio_test::block_on(client.authorization_for("/p", "42", "{}")).unwrap();
        assert_eq!(header.as_str(), expected_header("42", "/p", "{}"));
        assert_eq!(counting.hmac_calls(), 1);
    }

    #[tokio::test]
    async fn test_verify_webhook() {
        let client = client_for("http://localhost:1", Arc::new(CryptoResolver::new()));
        let body = r#"{"iyziEventType":"CHECKOUT_FORM_AUTH","status":"SUCCESS"}"#;
        let signature = hmac_sha256_hex(SECRET_KEY.as_bytes(), body.as_bytes()).unwrap();

        assert!(client.verify_webhook(body, &signature).await);
        assert!(!client.verify_webhook(body, "deadbeef").await);
        assert!(!client.verify_webhook("", &signature).await);
    }

    #[test]
    fn test_client_creation_validates_config() {
        assert!(IyzipayClient::with_config(ClientConfig::sandbox("k", "s")).is_ok());
        assert!(IyzipayClient::with_config(ClientConfig::sandbox("", "s")).is_err());
    }

    #[test]
    fn test_debug_hides_secret() {
        let client = IyzipayClient::with_config(ClientConfig::sandbox("k", "very-secret")).unwrap();
        assert!(!format!("{client:?}").contains("very-secret"));
    }
}
