//! GraphQL request types.

use serde::Serialize;
use trellis_core::{Dictionary, Scalar, Value};

use crate::error::Result;
use crate::http::HttpRequest;

/// A GraphQL request.
///
/// Serializes to `{"query": ..., "operationName": ..., "variables": ...}`.
/// Unset fields are written as explicit `null`, never omitted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphQLRequest {
    /// The GraphQL query string. Not validated.
    pub query: String,

    /// Optional operation name (for documents with multiple operations).
    #[serde(rename = "operationName")]
    pub operation_name: Option<String>,

    /// Optional variables for the query.
    pub variables: Option<Dictionary>,
}

impl GraphQLRequest {
    /// Create a request with no operation name and no variables.
    ///
    /// # Example
    ///
    /// ```
    /// use trellis_net::graphql::GraphQLRequest;
    ///
    /// let request = GraphQLRequest::new("{ users { id } }");
    /// assert_eq!(
    ///     request.to_json().unwrap(),
    ///     r#"{"query":"{ users { id } }","operationName":null,"variables":null}"#
    /// );
    /// ```
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            operation_name: None,
            variables: None,
        }
    }

    /// Set the operation name.
    pub fn operation_name(mut self, name: impl Into<String>) -> Self {
        self.operation_name = Some(name.into());
        self
    }

    /// Replace all variables.
    pub fn variables(mut self, variables: Dictionary) -> Self {
        self.variables = Some(variables);
        self
    }

    /// Set a single variable.
    pub fn variable(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.variables
            .get_or_insert_with(Dictionary::new)
            .set_pair(Scalar::String(name.into()), value);
        self
    }

    /// Serialize the request body.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Build a POST request carrying this query to `endpoint`.
    ///
    /// The endpoint is not validated here; an empty or invalid URL fails in
    /// the transport.
    pub fn to_http_request(&self, endpoint: &str) -> Result<HttpRequest> {
        let body = self.to_json()?;
        tracing::trace!(target: "trellis_net::graphql", endpoint, body = %body, "built request body");

        HttpRequest::post(endpoint)
            .header(http::header::CONTENT_TYPE, "application/json")?
            .header(http::header::ACCEPT, "application/json")
            .map(|request| request.body(body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_fields_serialize_as_null() {
        let request = GraphQLRequest::new("{a}");
        assert_eq!(
            request.to_json().unwrap(),
            r#"{"query":"{a}","operationName":null,"variables":null}"#
        );
    }

    #[test]
    fn test_empty_query_is_forwarded() {
        let request = GraphQLRequest::new("");
        assert_eq!(
            request.to_json().unwrap(),
            r#"{"query":"","operationName":null,"variables":null}"#
        );
    }

    #[test]
    fn test_variables_keep_order() {
        let request = GraphQLRequest::new("query($id: ID!) { user(id: $id) { name } }")
            .operation_name("GetUser")
            .variable("id", "123")
            .variable("limit", 10);

        assert_eq!(
            request.to_json().unwrap(),
            r#"{"query":"query($id: ID!) { user(id: $id) { name } }","operationName":"GetUser","variables":{"id":"123","limit":10}}"#
        );
    }

    #[test]
    fn test_nested_variables() {
        let input: Dictionary = [("name", "John"), ("email", "john@example.com")]
            .into_iter()
            .collect();
        let request = GraphQLRequest::new("mutation($input: In!) { create(input: $input) }")
            .variable("input", input);

        let body: serde_json::Value = serde_json::from_str(&request.to_json().unwrap()).unwrap();
        assert_eq!(body["variables"]["input"]["name"], "John");
    }

    #[test]
    fn test_unserializable_variables() {
        let mut bad = Dictionary::new();
        bad.set_pair(Scalar::Null, 1);
        let request = GraphQLRequest::new("{a}").variables(bad);

        assert!(matches!(
            request.to_json(),
            Err(crate::NetworkError::Json(_))
        ));
    }

    #[test]
    fn test_to_http_request() {
        let request = GraphQLRequest::new("{a}")
            .to_http_request("https://api.example.com/graphql")
            .unwrap();

        assert_eq!(request.url, "https://api.example.com/graphql");
        assert_eq!(request.header_str("content-type"), Some("application/json"));
        assert_eq!(request.header_str("accept"), Some("application/json"));
        assert_eq!(
            &request.body[..],
            br#"{"query":"{a}","operationName":null,"variables":null}"#
        );
    }

    #[test]
    fn test_empty_endpoint_is_not_rejected_here() {
        let request = GraphQLRequest::new("{a}").to_http_request("").unwrap();
        assert_eq!(request.url, "");
    }
}
