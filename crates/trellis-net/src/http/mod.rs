//! HTTP transport for Trellis.
//!
//! [`HttpClient`] wraps a reqwest client and implements
//! [`Transport`](crate::Transport), so it can carry GraphQL queries.
//!
//! # Example
//!
//! ```ignore
//! use std::time::Duration;
//! use trellis_net::http::HttpClient;
//!
//! let client = HttpClient::builder()
//!     .timeout(Duration::from_secs(60))
//!     .user_agent("MyApp/1.0")
//!     .build()?;
//! ```

mod client;
mod request;

pub use client::{HttpClient, HttpClientBuilder, HttpClientConfig};
pub use request::HttpRequest;
