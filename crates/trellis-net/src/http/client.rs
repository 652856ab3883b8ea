//! HTTP client implementation.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use futures_util::future::{BoxFuture, FutureExt};

use super::request::HttpRequest;
use crate::error::{NetworkError, Result};
use crate::transport::Transport;

/// Configuration for the HTTP client.
#[derive(Clone, Debug)]
pub struct HttpClientConfig {
    /// Request timeout.
    pub timeout: Option<Duration>,
    /// Connect timeout.
    pub connect_timeout: Option<Duration>,
    /// Default user agent.
    pub user_agent: Option<String>,
    /// Treat non-2xx responses as failures instead of returning their body.
    ///
    /// Off by default: GraphQL servers report errors inside the response
    /// envelope, often alongside a 4xx or 5xx status.
    pub reject_error_status: bool,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: Some(Duration::from_secs(30)),
            connect_timeout: Some(Duration::from_secs(10)),
            user_agent: Some(format!("Trellis/{} (Rust)", env!("CARGO_PKG_VERSION"))),
            reject_error_status: false,
        }
    }
}

/// Builder for creating an HTTP client with custom configuration.
pub struct HttpClientBuilder {
    config: HttpClientConfig,
    default_headers: http::HeaderMap,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpClientBuilder {
    /// Create a new builder with default configuration.
    pub fn new() -> Self {
        Self {
            config: HttpClientConfig::default(),
            default_headers: http::HeaderMap::new(),
        }
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = Some(timeout);
        self
    }

    /// Disable request timeout.
    pub fn no_timeout(mut self) -> Self {
        self.config.timeout = None;
        self
    }

    /// Set the connect timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = Some(timeout);
        self
    }

    /// Set the user agent string.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = Some(user_agent.into());
        self
    }

    /// Fail requests whose response status is not 2xx.
    pub fn reject_error_status(mut self) -> Self {
        self.config.reject_error_status = true;
        self
    }

    /// Add a default header that will be sent with every request.
    pub fn default_header(
        mut self,
        name: impl TryInto<http::HeaderName>,
        value: impl TryInto<http::HeaderValue>,
    ) -> Result<Self> {
        let name = name
            .try_into()
            .map_err(|_| NetworkError::InvalidHeader("Invalid header name".to_string()))?;
        let value = value
            .try_into()
            .map_err(|_| NetworkError::InvalidHeader("Invalid header value".to_string()))?;
        self.default_headers.insert(name, value);
        Ok(self)
    }

    /// Build the HTTP client.
    pub fn build(self) -> Result<HttpClient> {
        let mut builder = reqwest::Client::builder();

        if let Some(timeout) = self.config.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(connect_timeout) = self.config.connect_timeout {
            builder = builder.connect_timeout(connect_timeout);
        }
        if let Some(ref ua) = self.config.user_agent {
            builder = builder.user_agent(ua);
        }
        builder = builder.default_headers(self.default_headers);

        let client = builder.build()?;

        Ok(HttpClient {
            inner: Arc::new(HttpClientInner {
                client,
                config: self.config,
            }),
        })
    }
}

struct HttpClientInner {
    client: reqwest::Client,
    config: HttpClientConfig,
}

/// A reqwest-backed HTTP transport.
///
/// The client is cheaply cloneable and thread-safe. Clones share the same
/// underlying connection pool and configuration.
///
/// # Example
///
/// ```ignore
/// use trellis_net::http::{HttpClient, HttpRequest};
///
/// let client = HttpClient::builder().build()?;
/// let body = client
///     .send(HttpRequest::post("https://example.com/graphql").body(r#"{"query":"{a}"}"#))
///     .await?;
/// ```
#[derive(Clone)]
pub struct HttpClient {
    inner: Arc<HttpClientInner>,
}

impl HttpClient {
    /// Create a new HTTP client with default configuration.
    pub fn new() -> Result<Self> {
        HttpClientBuilder::new().build()
    }

    /// Create a builder for configuring a new HTTP client.
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::new()
    }

    /// Get the client's configuration.
    pub fn config(&self) -> &HttpClientConfig {
        &self.inner.config
    }

    /// Send a request and read the whole response body.
    ///
    /// Any HTTP status counts as success unless the client was built with
    /// [`reject_error_status`](HttpClientBuilder::reject_error_status).
    pub async fn send(&self, request: HttpRequest) -> Result<Bytes> {
        let url = url::Url::parse(&request.url)?;
        tracing::trace!(
            target: "trellis_net::http",
            url = %url,
            body_len = request.body.len(),
            "sending request"
        );

        let response = self
            .inner
            .client
            .post(url)
            .headers(request.headers)
            .body(request.body)
            .send()
            .await?;
        let status = response.status();
        tracing::debug!(target: "trellis_net::http", status = status.as_u16(), "response received");

        if self.inner.config.reject_error_status && !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NetworkError::HttpStatus {
                status: status.as_u16(),
                message: (!body.is_empty()).then_some(body),
            });
        }

        Ok(response.bytes().await?)
    }
}

impl Transport for HttpClient {
    fn execute(&self, request: HttpRequest) -> BoxFuture<'static, Result<Bytes>> {
        let client = self.clone();
        async move { client.send(request).await }.boxed()
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("config", &self.inner.config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = HttpClientConfig::default();
        assert_eq!(config.timeout, Some(Duration::from_secs(30)));
        assert_eq!(config.connect_timeout, Some(Duration::from_secs(10)));
        assert!(config.user_agent.unwrap().starts_with("Trellis/"));
        assert!(!config.reject_error_status);
    }

    #[test]
    fn test_builder() {
        let client = HttpClient::builder()
            .timeout(Duration::from_secs(60))
            .connect_timeout(Duration::from_secs(2))
            .user_agent("Test/1.0")
            .reject_error_status()
            .default_header("X-Api-Key", "secret")
            .unwrap()
            .build()
            .unwrap();

        assert_eq!(client.config().timeout, Some(Duration::from_secs(60)));
        assert_eq!(client.config().connect_timeout, Some(Duration::from_secs(2)));
        assert_eq!(client.config().user_agent.as_deref(), Some("Test/1.0"));
        assert!(client.config().reject_error_status);
    }

    #[test]
    fn test_no_timeout() {
        let client = HttpClient::builder().no_timeout().build().unwrap();
        assert!(client.config().timeout.is_none());
    }

    #[tokio::test]
    async fn test_empty_url_is_transport_failure() {
        let client = HttpClient::new().unwrap();
        let err = client.send(HttpRequest::post("")).await.unwrap_err();
        assert!(matches!(err, NetworkError::InvalidUrl(_)));
    }
}
