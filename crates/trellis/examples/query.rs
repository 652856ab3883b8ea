//! Trellis Query Example
//!
//! Sends one GraphQL query and prints the decoded result.
//!
//! Run with: cargo run -p trellis --example query -- <endpoint> [query]
//!
//! Set `RUST_LOG=trellis_net=debug` to see the client's logging.

use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::EnvFilter;
use trellis::prelude::*;

const DEFAULT_QUERY: &str = "{ __typename }";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut args = std::env::args().skip(1);
    let endpoint = args.next().unwrap_or_default();
    let query = args.next().unwrap_or_else(|| DEFAULT_QUERY.to_string());

    // The main thread plays the UI thread.
    let queue = Arc::new(EventQueue::new());
    queue.bind_to_current_thread()?;

    let client = GraphQLClient::builder(queue.clone())
        .endpoint_url(endpoint)
        .http_client_builder(HttpClientBuilder::new().timeout(Duration::from_secs(15)))
        .build()?;

    client.got_error().connect(|(name, messages)| {
        for message in messages {
            eprintln!("[{name}] error: {message}");
        }
    });
    client.got_response().connect(|(name, data)| {
        match data.render(false) {
            Ok(text) => println!("[{name}] data:\n{text}"),
            Err(err) => eprintln!("[{name}] could not render data: {err}"),
        }
    });

    let id = client.query("example", query);
    tracing::info!(query_id = %id, endpoint = %client.endpoint_url(), "query submitted");

    if queue.wait_and_process(Duration::from_secs(30))? == 0 {
        eprintln!("no completion within 30s");
    }
    Ok(())
}
