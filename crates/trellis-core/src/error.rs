//! Error types for Trellis core.

/// Errors produced by [`Dictionary`](crate::Dictionary) conversions and rendering.
#[derive(Debug, thiserror::Error)]
pub enum DictionaryError {
    /// A top-level association-list element was not a two-element sequence.
    #[error("association list element {index} is not a [key, value] pair")]
    MalformedPair {
        /// Position of the offending element.
        index: usize,
    },

    /// A top-level pair had a sequence or dictionary in key position.
    #[error("association list element {index} has a non-scalar key")]
    NonScalarKey {
        /// Position of the offending element.
        index: usize,
    },

    /// JSON text decoded to something other than an object.
    #[error("expected a JSON object, found {found}")]
    NotAnObject {
        /// The JSON type that was found instead.
        found: &'static str,
    },

    /// The dictionary holds something JSON cannot represent.
    #[error("dictionary cannot be rendered as JSON: {0}")]
    Serialization(String),

    /// JSON text could not be parsed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors produced by UI-thread dispatchers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DispatchError {
    /// The queue was pumped from a thread other than the one that owns it.
    #[error("event queue is owned by another thread")]
    WrongThread,

    /// The dispatch thread has shut down.
    #[error("dispatch thread has shut down")]
    Disconnected,
}

/// A specialized Result type for dictionary operations.
pub type Result<T> = std::result::Result<T, DictionaryError>;
