//! GraphQL query client.
//!
//! - [`GraphQLRequest`] builds the `{query, operationName, variables}` body.
//! - [`QueryEnvelope`] decodes the `{errors, data}` response into a
//!   [`Dictionary`](trellis_core::Dictionary).
//! - [`GraphQLClient`] submits queries asynchronously and reports each
//!   completion through its `got_error` and `got_response` signals, on the
//!   UI thread.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use trellis_core::DispatchThread;
//! use trellis_net::graphql::{GraphQLClient, GraphQLRequest};
//!
//! let ui = Arc::new(DispatchThread::spawn("ui")?);
//! let client = GraphQLClient::builder(ui.clone())
//!     .endpoint_url("https://api.example.com/graphql")
//!     .build()?;
//!
//! client.got_response().connect(|(name, data)| {
//!     println!("{name}: {}", data.render(true).unwrap_or_default());
//! });
//!
//! let request = GraphQLRequest::new("query GetUser($id: ID!) { user(id: $id) { name } }")
//!     .operation_name("GetUser")
//!     .variable("id", "123");
//! client.execute("user", request);
//! ```

mod client;
mod request;
mod response;

pub use client::{GraphQLClient, GraphQLClientBuilder, QueryId};
pub use request::GraphQLRequest;
pub use response::{QueryEnvelope, QueryOutcome};
