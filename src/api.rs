//! High-level API client with typed JSON methods.
//!
//! `ApiClient` binds a base URL and bearer token to the transport and is
//! what resource-specific endpoint wrappers call: build a path, validate
//! required identifiers, execute, decode the envelope body into a typed
//! value.
//!
//! The token is redacted in Debug output to keep it out of logs.

use serde::{de::DeserializeOwned, Serialize};
use tracing::instrument;

use crate::client::HttpTransport;
use crate::config::ClientConfig;
use crate::envelope::Envelope;
use crate::error::{Error, ErrorKind, Result};
use crate::request::RequestBuilder;

/// High-level client for the provider's REST API.
///
/// # Example
///
/// ```rust,ignore
/// use dnsfilter_api::ApiClient;
///
/// let client = ApiClient::new("https://api.example.com", "api-token")?;
///
/// // GET with typed response
/// let devices: DeviceList = client.get_json("/devices").await?;
///
/// // POST with body and typed response
/// let device: Device = client.post_json("/devices", &new_device).await?;
/// ```
#[derive(Clone)]
pub struct ApiClient {
    http: HttpTransport,
    base_url: String,
    token: String,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("token", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Create a new client with the given base URL and API token.
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Result<Self> {
        Self::with_config(base_url, token, ClientConfig::default())
    }

    /// Create a new client with custom configuration.
    pub fn with_config(
        base_url: impl Into<String>,
        token: impl Into<String>,
        config: ClientConfig,
    ) -> Result<Self> {
        let base_url = base_url.into();
        url::Url::parse(&base_url)?;
        let token = token.into();
        if token.is_empty() {
            return Err(Error::new(ErrorKind::Config(
                "API token must not be empty".to_string(),
            )));
        }

        let http = HttpTransport::new(config)?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build the full URL for a path.
    ///
    /// A path starting with `/` is appended to the base URL; a full URL
    /// passes through unchanged.
    pub fn url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// Reject an empty required identifier before anything goes over the
    /// wire. Endpoint wrappers call this for every path parameter.
    pub fn require_id(name: &str, value: &str) -> Result<()> {
        if value.is_empty() {
            return Err(Error::new(ErrorKind::Request(format!(
                "{} must not be empty",
                name
            ))));
        }
        Ok(())
    }

    // =========================================================================
    // Base HTTP methods (with authentication)
    // =========================================================================

    /// Create a GET request builder with authentication.
    pub fn get(&self, path: &str) -> RequestBuilder {
        self.http.get(self.url(path)).bearer_auth(&self.token)
    }

    /// Create a POST request builder with authentication.
    pub fn post(&self, path: &str) -> RequestBuilder {
        self.http.post(self.url(path)).bearer_auth(&self.token)
    }

    /// Create a PUT request builder with authentication.
    pub fn put(&self, path: &str) -> RequestBuilder {
        self.http.put(self.url(path)).bearer_auth(&self.token)
    }

    /// Create a DELETE request builder with authentication.
    pub fn delete(&self, path: &str) -> RequestBuilder {
        self.http.delete(self.url(path)).bearer_auth(&self.token)
    }

    /// Execute a request and return the validated envelope.
    pub async fn execute(&self, request: RequestBuilder) -> Result<Envelope> {
        self.http.execute(request).await
    }

    // =========================================================================
    // Typed JSON methods
    // =========================================================================

    /// GET request with typed body decoding.
    #[instrument(skip(self), fields(path = %path))]
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let envelope = self.http.execute(self.get(path)).await?;
        envelope.decode_body()
    }

    /// GET request with query parameters and typed body decoding.
    #[instrument(skip(self, params), fields(path = %path))]
    pub async fn get_json_query<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<T> {
        let mut request = self.get(path);
        for (name, value) in params {
            request = request.query(*name, *value);
        }
        let envelope = self.http.execute(request).await?;
        envelope.decode_body()
    }

    /// POST request with JSON body and typed response.
    #[instrument(skip(self, body), fields(path = %path))]
    pub async fn post_json<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let request = self.post(path).json(body)?;
        let envelope = self.http.execute(request).await?;
        envelope.decode_body()
    }

    /// PUT request with JSON body and typed response.
    #[instrument(skip(self, body), fields(path = %path))]
    pub async fn put_json<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let request = self.put(path).json(body)?;
        let envelope = self.http.execute(request).await?;
        envelope.decode_body()
    }

    /// DELETE request with typed response.
    #[instrument(skip(self), fields(path = %path))]
    pub async fn delete_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let envelope = self.http.execute(self.delete(path)).await?;
        envelope.decode_body()
    }

    /// GET request tolerating the provider's `[]`-for-object quirk.
    #[instrument(skip(self), fields(path = %path))]
    pub async fn get_json_or_default<T: DeserializeOwned + Default>(
        &self,
        path: &str,
    ) -> Result<T> {
        let envelope = self.http.execute(self.get(path)).await?;
        envelope.decode_body_or_default()
    }

    /// DELETE request tolerating the provider's `[]`-for-object quirk.
    ///
    /// Several deletion endpoints answer `{"body": [], "success": true}`.
    #[instrument(skip(self), fields(path = %path))]
    pub async fn delete_json_or_default<T: DeserializeOwned + Default>(
        &self,
        path: &str,
    ) -> Result<T> {
        let envelope = self.http.execute(self.delete(path)).await?;
        envelope.decode_body_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config() -> ClientConfig {
        ClientConfig::builder()
            .without_retry()
            .without_rate_limit()
            .build()
    }

    fn test_client(base_url: &str) -> ApiClient {
        ApiClient::with_config(base_url, "test-token", test_config()).unwrap()
    }

    #[derive(Debug, Default, PartialEq, serde::Deserialize)]
    struct Device {
        #[serde(rename = "PK", default)]
        pk: String,
        #[serde(default)]
        name: String,
    }

    #[test]
    fn test_url_building() {
        let client = test_client("https://api.example.com");

        assert_eq!(
            client.url("/devices"),
            "https://api.example.com/devices"
        );
        assert_eq!(client.url("devices"), "https://api.example.com/devices");
        assert_eq!(
            client.url("https://other.example.com/x"),
            "https://other.example.com/x"
        );
    }

    #[test]
    fn test_trailing_slash_handling() {
        let client = test_client("https://api.example.com/");
        assert_eq!(client.base_url(), "https://api.example.com");
        assert_eq!(client.url("/devices"), "https://api.example.com/devices");
    }

    #[test]
    fn test_invalid_base_url_is_config_error() {
        let err = ApiClient::new("not a url", "token").unwrap_err();
        assert!(matches!(err.kind, ErrorKind::Config(_)));
    }

    #[test]
    fn test_empty_token_is_config_error() {
        let err = ApiClient::new("https://api.example.com", "").unwrap_err();
        assert!(matches!(err.kind, ErrorKind::Config(_)));
    }

    #[test]
    fn test_require_id() {
        assert!(ApiClient::require_id("device id", "abc123").is_ok());

        let err = ApiClient::require_id("device id", "").unwrap_err();
        match err.kind {
            ErrorKind::Request(msg) => assert_eq!(msg, "device id must not be empty"),
            other => panic!("expected Request error, got {other:?}"),
        }
    }

    #[test]
    fn test_debug_redacts_token() {
        let client = test_client("https://api.example.com");
        let debug = format!("{client:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("test-token"));
    }

    #[tokio::test]
    async fn test_get_json_decodes_typed_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/devices/abc"))
            .and(header("Authorization", "Bearer test-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "body": {"PK": "abc", "name": "router"},
                "success": true
            })))
            .mount(&mock_server)
            .await;

        let client = test_client(&mock_server.uri());
        let device: Device = client.get_json("/devices/abc").await.unwrap();
        assert_eq!(device.pk, "abc");
        assert_eq!(device.name, "router");
    }

    #[tokio::test]
    async fn test_get_json_query_sends_parameters() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/analytics"))
            .and(query_param("granularity", "hour"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "body": {"PK": "a1", "name": "stats"},
                "success": true
            })))
            .mount(&mock_server)
            .await;

        let client = test_client(&mock_server.uri());
        let stats: Device = client
            .get_json_query("/analytics", &[("granularity", "hour")])
            .await
            .unwrap();
        assert_eq!(stats.pk, "a1");
    }

    #[tokio::test]
    async fn test_post_json_round_trip() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/devices"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "body": {"PK": "new1", "name": "laptop"},
                "success": true
            })))
            .mount(&mock_server)
            .await;

        let client = test_client(&mock_server.uri());
        let device: Device = client
            .post_json("/devices", &serde_json::json!({"name": "laptop"}))
            .await
            .unwrap();
        assert_eq!(device.pk, "new1");
    }

    #[tokio::test]
    async fn test_delete_json_or_default_tolerates_empty_array_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("DELETE"))
            .and(path("/devices/abc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "body": [],
                "success": true
            })))
            .mount(&mock_server)
            .await;

        let client = test_client(&mock_server.uri());
        let device: Device = client.delete_json_or_default("/devices/abc").await.unwrap();
        assert_eq!(device, Device::default());
    }

    #[tokio::test]
    async fn test_api_error_propagates_through_typed_methods() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/devices/missing"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": false,
                "message": "device not found"
            })))
            .mount(&mock_server)
            .await;

        let client = test_client(&mock_server.uri());
        let err = client.get_json::<Device>("/devices/missing").await.unwrap_err();
        assert!(err.is_api_error());
        assert!(err.to_string().contains("device not found"));
    }
}
