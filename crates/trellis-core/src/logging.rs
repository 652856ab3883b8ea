//! Logging facilities.
//!
//! Trellis uses the `tracing` crate for instrumentation and never installs a
//! subscriber itself. To see logs, install one in your application:
//!
//! ```ignore
//! tracing_subscriber::fmt()
//!     .with_env_filter("trellis_net=debug,trellis_core=info")
//!     .init();
//! ```

use std::time::Instant;

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Core crate target.
    pub const CORE: &str = "trellis_core";
    /// Signal/slot system target.
    pub const SIGNAL: &str = "trellis_core::signal";
    /// UI-thread dispatch target.
    pub const DISPATCH: &str = "trellis_core::dispatch";
    /// Async runtime target.
    pub const RUNTIME: &str = "trellis_core::runtime";
    /// Dictionary conversion target.
    pub const DICTIONARY: &str = "trellis_core::dictionary";
    /// Performance span target.
    pub const PERF: &str = "trellis::perf";
}

/// A guard that times an operation.
///
/// Enters a `perf` span on creation and, when dropped, emits a trace event
/// with the elapsed time in microseconds.
#[derive(Debug)]
pub struct PerfSpan {
    name: &'static str,
    started: Instant,
    _span: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// Start timing `name`.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::info_span!(target: "trellis::perf", "perf", operation = name);
        Self {
            name,
            started: Instant::now(),
            _span: span.entered(),
        }
    }

    /// The operation name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Time since the span started.
    pub fn elapsed(&self) -> std::time::Duration {
        self.started.elapsed()
    }
}

impl Drop for PerfSpan {
    fn drop(&mut self) {
        tracing::trace!(
            target: targets::PERF,
            operation = self.name,
            elapsed_us = self.started.elapsed().as_micros() as u64,
            "operation finished"
        );
    }
}
