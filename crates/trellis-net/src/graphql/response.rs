//! GraphQL response decoding.

use bytes::Bytes;
use trellis_core::{Dictionary, PerfSpan, Scalar, Value};

use crate::error::{NetworkError, Result};

/// A decoded `{errors, data}` response envelope.
///
/// Both fields are independent: a server may report errors alongside partial
/// data.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryEnvelope {
    /// Messages of the reported errors, in server order. `None` when the
    /// server reported no errors.
    pub errors: Option<Vec<String>>,
    /// The `data` object, if present and not `null`.
    pub data: Option<Dictionary>,
}

impl QueryEnvelope {
    /// Decode a response body.
    ///
    /// Fails with [`NetworkError::MalformedEnvelope`] if the body is not a
    /// JSON object, if `errors` is not an array of objects with a string
    /// `message`, or if `data` is neither an object nor `null`. A body with
    /// neither field is accepted.
    pub fn decode(body: &[u8]) -> Result<Self> {
        let _perf = PerfSpan::new("graphql_envelope_decode");

        let mut root = match serde_json::from_slice::<Value>(body).map_err(malformed)? {
            Value::Dictionary(root) => root,
            other => {
                return Err(NetworkError::MalformedEnvelope(format!(
                    "expected a JSON object, found {}",
                    other.type_name()
                )));
            }
        };

        let errors = match take(&mut root, "errors") {
            None | Some(Value::Scalar(Scalar::Null)) => None,
            Some(Value::Sequence(items)) if items.is_empty() => None,
            Some(Value::Sequence(items)) => Some(
                items
                    .iter()
                    .enumerate()
                    .map(|(index, item)| error_message(index, item))
                    .collect::<Result<Vec<_>>>()?,
            ),
            Some(other) => {
                return Err(NetworkError::MalformedEnvelope(format!(
                    "\"errors\" must be an array, found {}",
                    other.type_name()
                )));
            }
        };

        let data = match take(&mut root, "data") {
            None | Some(Value::Scalar(Scalar::Null)) => None,
            Some(Value::Dictionary(data)) => Some(data),
            Some(other) => {
                return Err(NetworkError::MalformedEnvelope(format!(
                    "\"data\" must be an object, found {}",
                    other.type_name()
                )));
            }
        };

        Ok(Self { errors, data })
    }

    /// Check if the server reported errors.
    pub fn has_errors(&self) -> bool {
        self.errors.is_some()
    }

    /// Check if neither errors nor data were present.
    pub fn is_empty(&self) -> bool {
        self.errors.is_none() && self.data.is_none()
    }
}

fn take(root: &mut Dictionary, key: &str) -> Option<Value> {
    root.remove(&Scalar::from(key))
}

fn error_message(index: usize, item: &Value) -> Result<String> {
    item.as_dictionary()
        .and_then(|error| error.get(&Scalar::from("message")))
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| {
            NetworkError::MalformedEnvelope(format!(
                "error {index} has no string \"message\""
            ))
        })
}

fn malformed(err: serde_json::Error) -> NetworkError {
    NetworkError::MalformedEnvelope(err.to_string())
}

/// What listeners are told about one completed query.
///
/// Computed off the UI thread from the transport's completion, then
/// delivered as at most one error event followed by at most one response
/// event.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryOutcome {
    /// Messages for the error event, if one fires.
    pub errors: Option<Vec<String>>,
    /// Data for the response event, if one fires.
    pub data: Option<Dictionary>,
}

impl QueryOutcome {
    /// Classify a transport completion.
    ///
    /// A transport failure or an undecodable body yields a single error
    /// message and no data. A decoded envelope passes its errors and data
    /// through unchanged.
    pub fn from_completion(completion: Result<Bytes>) -> Self {
        let decoded = completion.and_then(|body| QueryEnvelope::decode(&body));
        match decoded {
            Ok(QueryEnvelope { errors, data }) => Self { errors, data },
            Err(err) => {
                tracing::warn!(
                    target: "trellis_net::graphql",
                    error = %err,
                    transport = err.is_transport_failure(),
                    "query failed"
                );
                Self {
                    errors: Some(vec![err.reason()]),
                    data: None,
                }
            }
        }
    }

    /// Check if no event would fire.
    pub fn is_silent(&self) -> bool {
        self.errors.is_none() && self.data.is_none()
    }
}
