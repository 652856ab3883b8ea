//! Networking module for Trellis.
//!
//! This crate provides the GraphQL query client and the transport it runs on:
//!
//! - **GraphQL**: request building, envelope decoding, and an asynchronous
//!   client that reports results through signals on the UI thread
//! - **HTTP**: a reqwest-backed [`Transport`]
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use trellis_core::EventQueue;
//! use trellis_net::graphql::GraphQLClient;
//!
//! let queue = Arc::new(EventQueue::new());
//! let client = GraphQLClient::builder(queue.clone())
//!     .endpoint_url("https://api.example.com/graphql")
//!     .build()?;
//!
//! client.got_error().connect(|(name, messages)| {
//!     eprintln!("{name}: {messages:?}");
//! });
//! client.query("users", "{ users { id } }");
//!
//! // In the host's loop:
//! queue.process_pending()?;
//! ```

mod error;
pub mod graphql;
pub mod http;
mod transport;

pub use error::{NetworkError, Result};
pub use graphql::{GraphQLClient, GraphQLClientBuilder, GraphQLRequest, QueryEnvelope, QueryId, QueryOutcome};
pub use http::{HttpClient, HttpClientBuilder, HttpClientConfig};
pub use transport::Transport;
