//! The request/response transport contract.

use bytes::Bytes;
use futures_util::future::BoxFuture;

use crate::error::NetworkError;
use crate::http::HttpRequest;

/// Executes a request and completes exactly once with the response body or a
/// failure.
///
/// [`HttpClient`](crate::http::HttpClient) is the default implementation.
/// Implement this trait to route queries over another transport, or to script
/// responses in tests:
///
/// ```
/// use bytes::Bytes;
/// use futures_util::future::{BoxFuture, FutureExt};
/// use trellis_net::{NetworkError, Transport};
/// use trellis_net::http::HttpRequest;
///
/// struct Canned(&'static str);
///
/// impl Transport for Canned {
///     fn execute(&self, _request: HttpRequest) -> BoxFuture<'static, Result<Bytes, NetworkError>> {
///         let body = Bytes::from_static(self.0.as_bytes());
///         async move { Ok(body) }.boxed()
///     }
/// }
/// ```
pub trait Transport: Send + Sync {
    /// Execute `request`.
    ///
    /// The returned future resolves once, on whatever thread drives it.
    fn execute(&self, request: HttpRequest) -> BoxFuture<'static, Result<Bytes, NetworkError>>;
}
