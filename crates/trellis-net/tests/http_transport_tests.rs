//! End-to-end tests for the GraphQL client over the HTTP transport.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use trellis_core::{AsyncRuntime, EventQueue, Scalar, Value};
use trellis_net::graphql::GraphQLClient;
use trellis_net::http::HttpClientBuilder;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

type Responses = Arc<Mutex<Vec<(String, trellis_core::Dictionary)>>>;
type Errors = Arc<Mutex<Vec<(String, Vec<String>)>>>;

struct Fixture {
    tokio: tokio::runtime::Runtime,
    queue: Arc<EventQueue>,
}

impl Fixture {
    fn new() -> Self {
        let tokio = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
            .expect("Failed to create tokio runtime");
        let queue = Arc::new(EventQueue::new());
        queue.bind_to_current_thread().unwrap();
        Self { tokio, queue }
    }

    fn server(&self) -> MockServer {
        self.tokio.block_on(MockServer::start())
    }

    fn mount(&self, server: &MockServer, mock: Mock) {
        self.tokio.block_on(mock.mount(server));
    }

    fn client(&self, endpoint: &str, http: HttpClientBuilder) -> (GraphQLClient, Responses, Errors) {
        let runtime = Arc::new(AsyncRuntime::from_handle(self.tokio.handle().clone()));
        let client = GraphQLClient::builder(self.queue.clone())
            .endpoint_url(endpoint)
            .http_client(http.build().expect("Failed to build HTTP client"))
            .runtime(runtime)
            .build()
            .expect("Failed to build client");

        let responses: Responses = Arc::default();
        let errors: Errors = Arc::default();

        let responses_clone = responses.clone();
        client.got_response().connect(move |(name, data)| {
            responses_clone.lock().push((name.clone(), data.clone()));
        });
        let errors_clone = errors.clone();
        client.got_error().connect(move |(name, messages)| {
            errors_clone.lock().push((name.clone(), messages.clone()));
        });

        (client, responses, errors)
    }

    fn wait_for_completion(&self) {
        let ran = self.queue.wait_and_process(Duration::from_secs(10)).unwrap();
        assert_eq!(ran, 1, "expected exactly one completion");
    }
}

#[test]
fn test_query_round_trip() {
    let fx = Fixture::new();
    let server = fx.server();
    fx.mount(
        &server,
        Mock::given(method("POST"))
            .and(path("/graphql"))
            .and(header("content-type", "application/json"))
            .and(body_json(serde_json::json!({
                "query": "{ user { name } }",
                "operationName": null,
                "variables": null
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw(r#"{"data":{"user":{"name":"Ada","id":7}}}"#, "application/json"),
            ),
    );

    let endpoint = format!("{}/graphql", server.uri());
    let (client, responses, errors) = fx.client(&endpoint, HttpClientBuilder::new());

    client.query("user", "{ user { name } }");
    fx.wait_for_completion();

    assert!(errors.lock().is_empty());
    let responses = responses.lock();
    assert_eq!(responses.len(), 1);
    let (name, data) = &responses[0];
    assert_eq!(name, "user");
    assert_eq!(
        data.recursive_get(&[Scalar::from("user"), Scalar::from("name")]),
        Some(&Value::from("Ada"))
    );
    assert_eq!(data.render(true).unwrap(), r#"{"user":{"name":"Ada","id":7}}"#);
}

#[test]
fn test_error_status_with_graphql_body_is_decoded() {
    let fx = Fixture::new();
    let server = fx.server();
    fx.mount(
        &server,
        Mock::given(method("POST")).respond_with(
            ResponseTemplate::new(500)
                .set_body_raw(r#"{"errors":[{"message":"internal"}]}"#, "application/json"),
        ),
    );

    let (client, responses, errors) = fx.client(&server.uri(), HttpClientBuilder::new());
    client.query("q", "{ x }");
    fx.wait_for_completion();

    assert!(responses.lock().is_empty());
    assert_eq!(*errors.lock(), vec![("q".to_string(), vec!["internal".to_string()])]);
}

#[test]
fn test_reject_error_status() {
    let fx = Fixture::new();
    let server = fx.server();
    fx.mount(
        &server,
        Mock::given(method("POST")).respond_with(ResponseTemplate::new(503)),
    );

    let (client, responses, errors) =
        fx.client(&server.uri(), HttpClientBuilder::new().reject_error_status());
    client.query("q", "{ x }");
    fx.wait_for_completion();

    assert!(responses.lock().is_empty());
    assert_eq!(*errors.lock(), vec![("q".to_string(), vec!["HTTP 503".to_string()])]);
}

#[test]
fn test_timeout_reports_timeout() {
    let fx = Fixture::new();
    let server = fx.server();
    fx.mount(
        &server,
        Mock::given(method("POST")).respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(r#"{"data":{}}"#, "application/json")
                .set_delay(Duration::from_secs(3)),
        ),
    );

    let (client, responses, errors) = fx.client(
        &server.uri(),
        HttpClientBuilder::new().timeout(Duration::from_millis(200)),
    );
    client.query("slow", "{ x }");
    fx.wait_for_completion();

    assert!(responses.lock().is_empty());
    assert_eq!(*errors.lock(), vec![("slow".to_string(), vec!["timeout".to_string()])]);
}

#[test]
fn test_empty_endpoint_reports_error() {
    let fx = Fixture::new();
    let (client, responses, errors) = fx.client("", HttpClientBuilder::new());

    client.query("q", "{ x }");
    fx.wait_for_completion();

    assert!(responses.lock().is_empty());
    let errors = errors.lock();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].0, "q");
    assert_eq!(errors[0].1.len(), 1);
    assert!(!errors[0].1[0].is_empty());
}

#[test]
fn test_non_json_body_reports_single_error() {
    let fx = Fixture::new();
    let server = fx.server();
    fx.mount(
        &server,
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>")),
    );

    let (client, responses, errors) = fx.client(&server.uri(), HttpClientBuilder::new());
    client.query("q", "{ x }");
    fx.wait_for_completion();

    assert!(responses.lock().is_empty());
    let errors = errors.lock();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].1[0].starts_with("Malformed response envelope"));
}
