//! Trellis - an asynchronous GraphQL query client.
//!
//! This is the main umbrella crate that re-exports all public APIs:
//!
//! - the ordered nested [`Dictionary`] that query results are decoded into
//! - [`Signal`]s and [`Dispatcher`]s for delivering results to a UI thread
//! - the [`AsyncRuntime`] that drives transport futures
//! - the GraphQL client, behind the `networking` feature (on by default)
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use trellis::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let queue = Arc::new(EventQueue::new());
//!     let client = GraphQLClient::builder(queue.clone())
//!         .endpoint_url("https://api.example.com/graphql")
//!         .build()?;
//!
//!     client.got_response().connect(|(name, data)| {
//!         println!("{name}: {}", data.render(true).unwrap_or_default());
//!     });
//!     client.query("users", "{ users { id name } }");
//!
//!     queue.wait_and_process(Duration::from_secs(10))?;
//!     Ok(())
//! }
//! ```

pub use trellis_core::*;

/// GraphQL client and HTTP transport.
#[cfg(feature = "networking")]
pub mod net {
    pub use trellis_net::*;
}

pub mod prelude;
