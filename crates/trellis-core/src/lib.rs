//! Core systems for Trellis.
//!
//! This crate provides the building blocks the query client is made of:
//!
//! - **Dictionary**: an ordered, recursively nested key/value container with
//!   association-list and JSON conversions
//! - **Signal/Slot System**: type-safe event delivery to connected listeners
//! - **Dispatch**: FIFO hand-off of work to a single UI thread
//! - **Async Runtime**: a Tokio bridge that delivers results through a dispatcher
//!
//! # Dictionary Example
//!
//! ```
//! use trellis_core::{Dictionary, Scalar, Value};
//!
//! let data = Dictionary::from_json_str(r#"{"user": {"name": "Ada"}}"#).unwrap();
//! let name = data.recursive_get(&[Scalar::from("user"), Scalar::from("name")]);
//! assert_eq!(name, Some(&Value::from("Ada")));
//!
//! assert_eq!(data.render(true).unwrap(), r#"{"user":{"name":"Ada"}}"#);
//! ```
//!
//! # Signal/Slot Example
//!
//! ```
//! use trellis_core::Signal;
//!
//! let value_changed = Signal::<i32>::new();
//! let conn_id = value_changed.connect(|value| {
//!     println!("Value changed to: {}", value);
//! });
//!
//! value_changed.emit(42);
//! value_changed.disconnect(conn_id);
//! ```

pub mod async_runtime;
pub mod dictionary;
pub mod dispatcher;
mod error;
pub mod logging;
pub mod signal;

pub use async_runtime::{AsyncRuntime, AsyncRuntimeConfig, AsyncRuntimeError};
pub use dictionary::{Dictionary, Scalar, Value};
pub use dispatcher::{DispatchThread, Dispatcher, EventQueue, Task};
pub use error::{DictionaryError, DispatchError, Result};
pub use logging::PerfSpan;
pub use signal::{ConnectionGuard, ConnectionId, Signal};
