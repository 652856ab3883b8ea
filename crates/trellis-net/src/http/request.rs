//! HTTP request types.

use bytes::Bytes;

use crate::error::{NetworkError, Result};

/// A fully built POST request, ready for a [`Transport`](crate::Transport).
#[derive(Clone, Debug)]
pub struct HttpRequest {
    /// The request URL. Validated by the transport, not here.
    pub url: String,
    /// Request headers.
    pub headers: http::HeaderMap,
    /// Request body.
    pub body: Bytes,
}

impl HttpRequest {
    /// Create a POST request with no headers and an empty body.
    pub fn post(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            headers: http::HeaderMap::new(),
            body: Bytes::new(),
        }
    }

    /// Add a header.
    pub fn header(
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
        self.headers.insert(name, value);
        Ok(self)
    }

    /// Set the body.
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Get a header value as a string, if present and valid UTF-8.
    pub fn header_str(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_builder_chain() {
        let request = HttpRequest::post("https://example.com/api")
            .header("Content-Type", "application/json")
            .unwrap()
            .header("Authorization", "Bearer token123")
            .unwrap()
            .body("{}");

        assert_eq!(request.url, "https://example.com/api");
        assert_eq!(request.header_str("content-type"), Some("application/json"));
        assert_eq!(request.header_str("authorization"), Some("Bearer token123"));
        assert_eq!(request.body, Bytes::from_static(b"{}"));
    }

    #[test]
    fn test_invalid_header() {
        let result = HttpRequest::post("https://example.com").header("bad header", "x");
        assert!(matches!(result, Err(NetworkError::InvalidHeader(_))));
    }
}
