//! GraphQL client implementation.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use trellis_core::{AsyncRuntime, Dictionary, Dispatcher, Signal};

use super::request::GraphQLRequest;
use super::response::QueryOutcome;
use crate::error::Result;
use crate::http::{HttpClient, HttpClientBuilder};
use crate::transport::Transport;

/// Global counter for query IDs.
static NEXT_QUERY_ID: AtomicU64 = AtomicU64::new(1);

/// A process-unique identifier for a submitted query, used to correlate logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueryId(u64);

impl QueryId {
    fn next() -> Self {
        Self(NEXT_QUERY_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw u64 value of this query ID.
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for QueryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Builder for creating a GraphQL client.
pub struct GraphQLClientBuilder {
    endpoint_url: String,
    dispatcher: Arc<dyn Dispatcher>,
    transport: Option<Arc<dyn Transport>>,
    http_client_builder: Option<HttpClientBuilder>,
    runtime: Option<Arc<AsyncRuntime>>,
}

impl GraphQLClientBuilder {
    /// Create a builder whose events are delivered through `dispatcher`.
    pub fn new(dispatcher: Arc<dyn Dispatcher>) -> Self {
        Self {
            endpoint_url: String::new(),
            dispatcher,
            transport: None,
            http_client_builder: None,
            runtime: None,
        }
    }

    /// Set the initial endpoint URL.
    pub fn endpoint_url(mut self, url: impl Into<String>) -> Self {
        self.endpoint_url = url.into();
        self
    }

    /// Use a custom transport instead of an HTTP client.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Use an existing HTTP client as the transport.
    pub fn http_client(self, client: HttpClient) -> Self {
        self.transport(Arc::new(client))
    }

    /// Configure the default HTTP transport.
    ///
    /// Ignored if a transport is set explicitly.
    pub fn http_client_builder(mut self, builder: HttpClientBuilder) -> Self {
        self.http_client_builder = Some(builder);
        self
    }

    /// Run transport futures on `runtime` instead of the global runtime.
    pub fn runtime(mut self, runtime: Arc<AsyncRuntime>) -> Self {
        self.runtime = Some(runtime);
        self
    }

    /// Build the GraphQL client.
    pub fn build(self) -> Result<GraphQLClient> {
        let transport = match self.transport {
            Some(transport) => transport,
            None => {
                let builder = self.http_client_builder.unwrap_or_default();
                Arc::new(builder.build()?) as Arc<dyn Transport>
            }
        };

        let runtime = match self.runtime {
            Some(runtime) => runtime,
            None => AsyncRuntime::global()?,
        };

        Ok(GraphQLClient {
            inner: Arc::new(GraphQLClientInner {
                endpoint_url: RwLock::new(self.endpoint_url),
                transport,
                dispatcher: self.dispatcher,
                runtime,
                got_response: Signal::new(),
                got_error: Signal::new(),
            }),
        })
    }
}

struct GraphQLClientInner {
    endpoint_url: RwLock<String>,
    transport: Arc<dyn Transport>,
    dispatcher: Arc<dyn Dispatcher>,
    runtime: Arc<AsyncRuntime>,
    got_response: Signal<(String, Dictionary)>,
    got_error: Signal<(String, Vec<String>)>,
}

impl GraphQLClientInner {
    /// Emit the events for one completed query. Runs on the dispatcher thread.
    fn deliver(&self, id: QueryId, name: String, outcome: QueryOutcome) {
        let QueryOutcome { errors, data } = outcome;

        if let Some(messages) = errors {
            tracing::debug!(
                target: "trellis_net::graphql",
                query_id = %id,
                query_name = %name,
                count = messages.len(),
                "dispatching error event"
            );
            self.got_error.emit((name.clone(), messages));
        }

        if let Some(data) = data {
            tracing::debug!(
                target: "trellis_net::graphql",
                query_id = %id,
                query_name = %name,
                entries = data.len(),
                "dispatching response event"
            );
            self.got_response.emit((name, data));
        }
    }
}

/// An asynchronous GraphQL query client.
///
/// Queries are submitted without blocking. When a query completes, listeners
/// connected to [`got_error`](Self::got_error) and
/// [`got_response`](Self::got_response) are called on the dispatcher's
/// thread: first the error event, if the query failed or the server reported
/// errors, then the response event, if the server returned data. A partial
/// result fires both.
///
/// The client is cheaply cloneable; clones share the endpoint and listeners.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use std::time::Duration;
/// use trellis_core::{EventQueue, Scalar};
/// use trellis_net::graphql::GraphQLClient;
///
/// let queue = Arc::new(EventQueue::new());
/// let client = GraphQLClient::builder(queue.clone())
///     .endpoint_url("https://api.example.com/graphql")
///     .build()
///     .unwrap();
///
/// client.got_response().connect(|(name, data)| {
///     let user = data.recursive_get(&[Scalar::from("user"), Scalar::from("name")]);
///     println!("{name}: {user:?}");
/// });
/// client.got_error().connect(|(name, messages)| {
///     eprintln!("{name} failed: {}", messages.join("; "));
/// });
///
/// client.query("user", "{ user { name } }");
/// queue.wait_and_process(Duration::from_secs(10)).unwrap();
/// ```
#[derive(Clone)]
pub struct GraphQLClient {
    inner: Arc<GraphQLClientInner>,
}

impl GraphQLClient {
    /// Create a builder whose events are delivered through `dispatcher`.
    pub fn builder(dispatcher: Arc<dyn Dispatcher>) -> GraphQLClientBuilder {
        GraphQLClientBuilder::new(dispatcher)
    }

    /// Get the endpoint URL.
    pub fn endpoint_url(&self) -> String {
        self.inner.endpoint_url.read().clone()
    }

    /// Set the endpoint URL used by queries submitted from now on.
    ///
    /// Queries already submitted keep the URL they were built with. A change
    /// racing with a submission on another thread may or may not apply to it.
    pub fn set_endpoint_url(&self, url: impl Into<String>) {
        let url = url.into();
        tracing::debug!(target: "trellis_net::graphql", endpoint = %url, "endpoint URL changed");
        *self.inner.endpoint_url.write() = url;
    }

    /// Signal emitted with `(query_name, data)` when a query returns data.
    pub fn got_response(&self) -> &Signal<(String, Dictionary)> {
        &self.inner.got_response
    }

    /// Signal emitted with `(query_name, messages)` when a query fails or the
    /// server reports errors.
    pub fn got_error(&self) -> &Signal<(String, Vec<String>)> {
        &self.inner.got_error
    }

    /// Submit `query_text` with no operation name or variables.
    ///
    /// Returns immediately. Every failure, including an unset endpoint, is
    /// reported through [`got_error`](Self::got_error).
    pub fn query(&self, query_name: impl Into<String>, query_text: impl Into<String>) -> QueryId {
        self.execute(query_name, GraphQLRequest::new(query_text))
    }

    /// Submit a fully built request.
    ///
    /// Returns immediately, like [`query`](Self::query).
    pub fn execute(&self, query_name: impl Into<String>, request: GraphQLRequest) -> QueryId {
        let id = QueryId::next();
        let name = query_name.into();
        let endpoint = self.endpoint_url();

        tracing::debug!(
            target: "trellis_net::graphql",
            query_id = %id,
            query_name = %name,
            endpoint = %endpoint,
            "submitting query"
        );

        let built = request.to_http_request(&endpoint);
        let transport = self.inner.transport.clone();
        let completion = async move {
            let result = match built {
                Ok(http_request) => transport.execute(http_request).await,
                Err(err) => Err(err),
            };
            QueryOutcome::from_completion(result)
        };

        let inner = self.inner.clone();
        self.inner.runtime.spawn_with_callback(
            completion,
            self.inner.dispatcher.clone(),
            move |outcome| {
                let outcome = outcome
                    .unwrap_or_else(|panicked| QueryOutcome::from_completion(Err(panicked.into())));
                inner.deliver(id, name, outcome);
            },
        );

        id
    }
}

impl fmt::Debug for GraphQLClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GraphQLClient")
            .field("endpoint_url", &*self.inner.endpoint_url.read())
            .field("runtime", &self.inner.runtime)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trellis_core::{AsyncRuntimeConfig, EventQueue};

    fn test_client() -> GraphQLClient {
        let runtime = Arc::new(
            AsyncRuntime::new(AsyncRuntimeConfig::multi_threaded().with_worker_threads(1)).unwrap(),
        );
        GraphQLClient::builder(Arc::new(EventQueue::new()))
            .runtime(runtime)
            .build()
            .unwrap()
    }

    #[test]
    fn test_query_ids_are_unique() {
        let a = QueryId::next();
        let b = QueryId::next();
        assert_ne!(a, b);
        assert!(b.as_u64() > a.as_u64());
        assert_eq!(a.to_string(), format!("#{}", a.as_u64()));
    }

    #[test]
    fn test_endpoint_defaults_to_empty() {
        let client = test_client();
        assert_eq!(client.endpoint_url(), "");
    }

    #[test]
    fn test_set_endpoint_url_shared_by_clones() {
        let client = test_client();
        let clone = client.clone();

        client.set_endpoint_url("https://api.example.com/graphql");
        assert_eq!(clone.endpoint_url(), "https://api.example.com/graphql");
    }

    #[test]
    fn test_signals_start_unconnected() {
        let client = test_client();
        assert_eq!(client.got_response().connection_count(), 0);
        assert_eq!(client.got_error().connection_count(), 0);
    }
}
