//! Prelude module for Trellis.
//!
//! This module re-exports the most commonly used types for convenient importing:
//!
//! ```ignore
//! use trellis::prelude::*;
//! ```
//!
//! This provides access to:
//! - The canonical container (`Dictionary`, `Scalar`, `Value`)
//! - Signals and dispatch (`Signal`, `EventQueue`, `DispatchThread`)
//! - The GraphQL client (`GraphQLClient`, `GraphQLRequest`)

// ============================================================================
// Canonical Container
// ============================================================================

pub use crate::{Dictionary, DictionaryError, Scalar, Value};

// ============================================================================
// Signals and Dispatch
// ============================================================================

pub use crate::{ConnectionId, Signal};
pub use crate::{DispatchThread, Dispatcher, EventQueue};

// ============================================================================
// Async Runtime
// ============================================================================

pub use crate::{AsyncRuntime, AsyncRuntimeConfig};

// ============================================================================
// GraphQL
// ============================================================================

#[cfg(feature = "networking")]
pub use crate::net::{GraphQLClient, GraphQLRequest, HttpClientBuilder, NetworkError};
