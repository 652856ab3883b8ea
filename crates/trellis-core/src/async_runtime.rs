//! Async runtime integration.
//!
//! Wraps a Tokio runtime and bridges completed futures back to a
//! [`Dispatcher`] so their results are handled on the UI thread.
//!
//! # Example: Delivering Results to the UI Thread
//!
//! ```no_run
//! use std::sync::Arc;
//! use trellis_core::async_runtime::AsyncRuntime;
//! use trellis_core::{Dispatcher, EventQueue};
//!
//! # async fn expensive_computation() -> i32 { 42 }
//! let runtime = AsyncRuntime::global().unwrap();
//! let queue = Arc::new(EventQueue::new());
//!
//! runtime.spawn_with_callback(
//!     async { expensive_computation().await },
//!     queue.clone(),
//!     |result| match result {
//!         Ok(value) => println!("Got result: {}", value),
//!         Err(err) => eprintln!("Task failed: {}", err),
//!     },
//! );
//!
//! // Later, on the UI thread:
//! queue.process_pending().unwrap();
//! ```

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

use futures_util::FutureExt;
use tokio::runtime::{Builder, Handle, Runtime};

use crate::dispatcher::Dispatcher;
use crate::logging::targets;

/// Global async runtime instance.
static GLOBAL_RUNTIME: OnceLock<Arc<AsyncRuntime>> = OnceLock::new();

/// Configuration for an owned multi-threaded runtime.
#[derive(Debug, Clone)]
pub struct AsyncRuntimeConfig {
    /// Number of worker threads.
    /// Defaults to the number of CPU cores.
    pub worker_threads: Option<usize>,
    /// Name prefix for runtime threads.
    pub thread_name: String,
}

impl Default for AsyncRuntimeConfig {
    fn default() -> Self {
        Self {
            worker_threads: None,
            thread_name: "trellis-async".to_string(),
        }
    }
}

impl AsyncRuntimeConfig {
    /// Create a configuration for a multi-threaded runtime.
    pub fn multi_threaded() -> Self {
        Self::default()
    }

    /// Set the number of worker threads.
    pub fn with_worker_threads(mut self, count: usize) -> Self {
        self.worker_threads = Some(count);
        self
    }

    /// Set the thread name prefix.
    pub fn with_thread_name(mut self, name: impl Into<String>) -> Self {
        self.thread_name = name.into();
        self
    }
}

/// The async runtime manager.
///
/// Spawns futures on a Tokio runtime and, through
/// [`spawn_with_callback`](Self::spawn_with_callback), delivers their results
/// to a [`Dispatcher`].
pub struct AsyncRuntime {
    /// Kept alive so an owned runtime does not shut down. `None` when attached
    /// to an external runtime.
    _runtime: Option<Runtime>,
    handle: Handle,
    active_tasks: Arc<AtomicU64>,
}

impl AsyncRuntime {
    /// Get the global async runtime, creating it with default settings on
    /// first use.
    pub fn global() -> Result<Arc<AsyncRuntime>, AsyncRuntimeError> {
        if let Some(runtime) = GLOBAL_RUNTIME.get() {
            return Ok(runtime.clone());
        }

        let runtime = Arc::new(AsyncRuntime::new(AsyncRuntimeConfig::default())?);
        Ok(GLOBAL_RUNTIME.get_or_init(|| runtime).clone())
    }

    /// Create an owned multi-threaded runtime.
    pub fn new(config: AsyncRuntimeConfig) -> Result<Self, AsyncRuntimeError> {
        let mut builder = Builder::new_multi_thread();
        builder.thread_name(&config.thread_name).enable_all();
        if let Some(workers) = config.worker_threads {
            builder.worker_threads(workers);
        }

        let runtime = builder
            .build()
            .map_err(|e| AsyncRuntimeError::CreationFailed(e.to_string()))?;
        let handle = runtime.handle().clone();

        tracing::debug!(
            target: targets::RUNTIME,
            thread_name = %config.thread_name,
            worker_threads = ?config.worker_threads,
            "async runtime started"
        );

        Ok(Self {
            _runtime: Some(runtime),
            handle,
            active_tasks: Arc::new(AtomicU64::new(0)),
        })
    }

    /// Attach to a runtime owned by the caller.
    ///
    /// The caller keeps the runtime alive for as long as this value is used.
    pub fn from_handle(handle: Handle) -> Self {
        Self {
            _runtime: None,
            handle,
            active_tasks: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Get the number of spawned tasks that have not finished.
    pub fn active_tasks(&self) -> u64 {
        self.active_tasks.load(Ordering::Acquire)
    }

    /// Spawn an async task and deliver its result through `dispatcher`.
    ///
    /// `callback` runs exactly once, on the dispatcher's thread, never on a
    /// runtime thread. A panic inside `future` is caught and delivered as
    /// [`AsyncRuntimeError::TaskPanicked`].
    pub fn spawn_with_callback<F, T, C>(&self, future: F, dispatcher: Arc<dyn Dispatcher>, callback: C)
    where
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
        C: FnOnce(Result<T, AsyncRuntimeError>) + Send + 'static,
    {
        let active_tasks = self.active_tasks.clone();
        active_tasks.fetch_add(1, Ordering::AcqRel);

        self.handle.spawn(async move {
            let result = AssertUnwindSafe(future).catch_unwind().await.map_err(|payload| {
                let message = panic_message(payload.as_ref());
                tracing::error!(target: targets::RUNTIME, panic = %message, "async task panicked");
                AsyncRuntimeError::TaskPanicked(message)
            });
            active_tasks.fetch_sub(1, Ordering::AcqRel);
            dispatcher.schedule(Box::new(move || callback(result)));
        });
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

impl std::fmt::Debug for AsyncRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AsyncRuntime")
            .field("owned", &self._runtime.is_some())
            .field("active_tasks", &self.active_tasks())
            .finish()
    }
}

/// Errors that can occur with the async runtime.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AsyncRuntimeError {
    /// Failed to create the runtime.
    #[error("failed to create async runtime: {0}")]
    CreationFailed(String),
    /// A spawned task panicked before producing a result.
    #[error("async task panicked: {0}")]
    TaskPanicked(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatcher::EventQueue;
    use parking_lot::Mutex;
    use std::time::Duration;

    fn test_runtime() -> AsyncRuntime {
        AsyncRuntime::new(AsyncRuntimeConfig::multi_threaded().with_worker_threads(2)).unwrap()
    }

    #[test]
    fn test_spawn_with_callback_runs_on_dispatcher() {
        let runtime = test_runtime();
        let queue = Arc::new(EventQueue::new());
        queue.bind_to_current_thread().unwrap();

        let received = Arc::new(Mutex::new(None));
        let received_clone = received.clone();
        let caller = std::thread::current().id();

        runtime.spawn_with_callback(async { "result".to_string() }, queue.clone(), move |value| {
            assert_eq!(std::thread::current().id(), caller);
            *received_clone.lock() = Some(value);
        });

        let ran = queue.wait_and_process(Duration::from_secs(5)).unwrap();
        assert_eq!(ran, 1);
        assert_eq!(*received.lock(), Some(Ok("result".to_string())));
        assert_eq!(runtime.active_tasks(), 0);
    }

    #[test]
    fn test_panicking_task_still_delivers() {
        let runtime = test_runtime();
        let queue = Arc::new(EventQueue::new());
        queue.bind_to_current_thread().unwrap();

        let received = Arc::new(Mutex::new(None));
        let received_clone = received.clone();

        runtime.spawn_with_callback(
            async {
                if std::hint::black_box(true) {
                    panic!("transport exploded");
                }
                1
            },
            queue.clone(),
            move |value: Result<i32, AsyncRuntimeError>| {
                *received_clone.lock() = Some(value);
            },
        );

        let ran = queue.wait_and_process(Duration::from_secs(5)).unwrap();
        assert_eq!(ran, 1);
        assert_eq!(
            *received.lock(),
            Some(Err(AsyncRuntimeError::TaskPanicked("transport exploded".to_string())))
        );
        assert_eq!(runtime.active_tasks(), 0);
    }

    #[test]
    fn test_from_handle() {
        let owned = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .unwrap();
        let runtime = AsyncRuntime::from_handle(owned.handle().clone());
        let queue = Arc::new(EventQueue::new());
        queue.bind_to_current_thread().unwrap();

        let received = Arc::new(Mutex::new(None));
        let received_clone = received.clone();
        runtime.spawn_with_callback(async { 7 }, queue.clone(), move |value| {
            *received_clone.lock() = Some(value);
        });

        queue.wait_and_process(Duration::from_secs(5)).unwrap();
        assert_eq!(*received.lock(), Some(Ok(7)));
    }

    #[test]
    fn test_thread_name_prefix() {
        let runtime = AsyncRuntime::new(
            AsyncRuntimeConfig::multi_threaded()
                .with_worker_threads(1)
                .with_thread_name("trellis-test-rt"),
        )
        .unwrap();
        let queue = Arc::new(EventQueue::new());
        queue.bind_to_current_thread().unwrap();

        let received = Arc::new(Mutex::new(None));
        let received_clone = received.clone();
        runtime.spawn_with_callback(
            async { std::thread::current().name().map(str::to_string) },
            queue.clone(),
            move |value| *received_clone.lock() = Some(value),
        );

        queue.wait_and_process(Duration::from_secs(5)).unwrap();
        assert_eq!(
            *received.lock(),
            Some(Ok(Some("trellis-test-rt".to_string())))
        );
    }

    #[test]
    fn test_global_is_shared() {
        let a = AsyncRuntime::global().unwrap();
        let b = AsyncRuntime::global().unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }
}
