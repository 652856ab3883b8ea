//! Error types for the networking module.

use std::fmt;

/// Network-specific errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetworkError {
    /// HTTP request failed.
    Request(String),
    /// Invalid URL provided.
    InvalidUrl(String),
    /// Request timed out.
    Timeout,
    /// Connection refused or failed.
    Connection(String),
    /// Invalid header name or value.
    InvalidHeader(String),
    /// JSON serialization error.
    Json(String),
    /// I/O error.
    Io(String),
    /// HTTP error status, when the client is configured to reject them.
    HttpStatus {
        /// The HTTP status code.
        status: u16,
        /// Optional error message from the response body.
        message: Option<String>,
    },
    /// The response body is not a well-formed GraphQL envelope.
    MalformedEnvelope(String),
    /// The async runtime could not be started.
    Runtime(String),
}

impl NetworkError {
    /// The short failure reason delivered to error listeners.
    ///
    /// Transport failures yield their bare cause (`"timeout"` for
    /// [`NetworkError::Timeout`]); envelope failures keep their full
    /// description.
    pub fn reason(&self) -> String {
        match self {
            Self::Timeout => "timeout".to_string(),
            Self::Request(msg)
            | Self::InvalidUrl(msg)
            | Self::Connection(msg)
            | Self::InvalidHeader(msg)
            | Self::Json(msg)
            | Self::Io(msg)
            | Self::Runtime(msg) => msg.clone(),
            Self::HttpStatus {
                message: Some(msg), ..
            } if !msg.is_empty() => msg.clone(),
            Self::HttpStatus { .. } | Self::MalformedEnvelope(_) => self.to_string(),
        }
    }

    /// Check if this error came from the transport rather than the envelope.
    pub fn is_transport_failure(&self) -> bool {
        !matches!(self, Self::MalformedEnvelope(_))
    }
}

impl fmt::Display for NetworkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Request(msg) => write!(f, "HTTP request error: {msg}"),
            Self::InvalidUrl(msg) => write!(f, "Invalid URL: {msg}"),
            Self::Timeout => write!(f, "Request timed out"),
            Self::Connection(msg) => write!(f, "Connection error: {msg}"),
            Self::InvalidHeader(msg) => write!(f, "Invalid header: {msg}"),
            Self::Json(msg) => write!(f, "JSON error: {msg}"),
            Self::Io(msg) => write!(f, "I/O error: {msg}"),
            Self::HttpStatus { status, message } => {
                if let Some(msg) = message {
                    write!(f, "HTTP {status}: {msg}")
                } else {
                    write!(f, "HTTP {status}")
                }
            }
            Self::MalformedEnvelope(msg) => write!(f, "Malformed response envelope: {msg}"),
            Self::Runtime(msg) => write!(f, "Async runtime error: {msg}"),
        }
    }
}

impl std::error::Error for NetworkError {}

impl From<reqwest::Error> for NetworkError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_connect() {
            Self::Connection(err.to_string())
        } else if err.is_builder() {
            Self::InvalidUrl(err.to_string())
        } else {
            Self::Request(err.to_string())
        }
    }
}

impl From<url::ParseError> for NetworkError {
    fn from(err: url::ParseError) -> Self {
        Self::InvalidUrl(err.to_string())
    }
}

impl From<serde_json::Error> for NetworkError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

impl From<std::io::Error> for NetworkError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<http::header::InvalidHeaderName> for NetworkError {
    fn from(err: http::header::InvalidHeaderName) -> Self {
        Self::InvalidHeader(err.to_string())
    }
}

impl From<http::header::InvalidHeaderValue> for NetworkError {
    fn from(err: http::header::InvalidHeaderValue) -> Self {
        Self::InvalidHeader(err.to_string())
    }
}

impl From<trellis_core::AsyncRuntimeError> for NetworkError {
    fn from(err: trellis_core::AsyncRuntimeError) -> Self {
        Self::Runtime(err.to_string())
    }
}

/// A specialized Result type for network operations.
pub type Result<T> = std::result::Result<T, NetworkError>;
