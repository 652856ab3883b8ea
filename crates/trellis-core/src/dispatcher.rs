//! UI-thread dispatch.
//!
//! Background work never touches listeners directly. Instead, results are
//! wrapped in a [`Task`] and handed to a [`Dispatcher`], which runs tasks
//! later, in submission order, on one logical thread.
//!
//! Two dispatchers are provided:
//!
//! - [`EventQueue`]: a queue pumped by the host's own loop. The first thread
//!   that pumps it becomes its owner.
//! - [`DispatchThread`]: a dedicated, named thread that drains its queue as
//!   tasks arrive.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use trellis_core::{Dispatcher, EventQueue};
//!
//! let queue = Arc::new(EventQueue::new());
//! queue.schedule(Box::new(|| println!("first")));
//! queue.schedule(Box::new(|| println!("second")));
//!
//! assert_eq!(queue.process_pending().unwrap(), 2);
//! ```

use std::collections::VecDeque;
use std::sync::OnceLock;
use std::thread::{self, JoinHandle, ThreadId};
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender, unbounded};
use parking_lot::{Condvar, Mutex};

use crate::error::DispatchError;
use crate::logging::targets;

/// A unit of work to run on the dispatch thread.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Accepts tasks and runs them later, in submission order, on a single
/// logical thread.
pub trait Dispatcher: Send + Sync {
    /// Queue a task. Never runs the task inline.
    fn schedule(&self, task: Task);
}

// ============================================================================
// EventQueue
// ============================================================================

/// A FIFO task queue pumped by the host.
///
/// Any thread may schedule. Only the owning thread may process; the owner is
/// the first thread to call [`process_pending`](Self::process_pending) or
/// [`wait_and_process`](Self::wait_and_process), unless bound earlier with
/// [`bind_to_current_thread`](Self::bind_to_current_thread).
#[derive(Default)]
pub struct EventQueue {
    tasks: Mutex<VecDeque<Task>>,
    available: Condvar,
    owner: OnceLock<ThreadId>,
}

impl EventQueue {
    /// Create an empty, unowned queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the calling thread the owner.
    ///
    /// Fails if another thread already owns the queue.
    pub fn bind_to_current_thread(&self) -> Result<(), DispatchError> {
        self.claim()
    }

    /// Check if the calling thread owns this queue.
    pub fn is_owner(&self) -> bool {
        self.owner.get() == Some(&thread::current().id())
    }

    /// Number of tasks waiting to run.
    pub fn pending_count(&self) -> usize {
        self.tasks.lock().len()
    }

    /// Run every task queued so far.
    ///
    /// Tasks scheduled while this batch runs are left for the next call.
    /// Returns the number of tasks run.
    pub fn process_pending(&self) -> Result<usize, DispatchError> {
        self.claim()?;

        let batch = std::mem::take(&mut *self.tasks.lock());
        let count = batch.len();
        for task in batch {
            task();
        }

        if count > 0 {
            tracing::trace!(target: targets::DISPATCH, count, "processed queued tasks");
        }
        Ok(count)
    }

    /// Block until at least one task is queued or `timeout` elapses, then run
    /// everything queued.
    ///
    /// Returns the number of tasks run, which is zero on timeout.
    pub fn wait_and_process(&self, timeout: Duration) -> Result<usize, DispatchError> {
        self.claim()?;

        let deadline = Instant::now() + timeout;
        {
            let mut tasks = self.tasks.lock();
            while tasks.is_empty() {
                if self.available.wait_until(&mut tasks, deadline).timed_out() {
                    break;
                }
            }
        }

        self.process_pending()
    }

    fn claim(&self) -> Result<(), DispatchError> {
        let current = thread::current().id();
        let owner = *self.owner.get_or_init(|| current);
        if owner == current {
            Ok(())
        } else {
            tracing::warn!(
                target: targets::DISPATCH,
                ?owner,
                ?current,
                "event queue processed from a non-owning thread"
            );
            Err(DispatchError::WrongThread)
        }
    }
}

impl Dispatcher for EventQueue {
    fn schedule(&self, task: Task) {
        self.tasks.lock().push_back(task);
        self.available.notify_one();
    }
}

impl std::fmt::Debug for EventQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventQueue")
            .field("pending", &self.pending_count())
            .field("owner", &self.owner.get())
            .finish()
    }
}

// ============================================================================
// DispatchThread
// ============================================================================

/// A dedicated thread that runs scheduled tasks in order.
///
/// Dropping the handle stops accepting tasks; the thread finishes whatever is
/// already queued and exits. Use [`shutdown`](Self::shutdown) to also wait
/// for it.
pub struct DispatchThread {
    sender: Mutex<Option<Sender<Task>>>,
    handle: Mutex<Option<JoinHandle<()>>>,
    thread_id: ThreadId,
    name: String,
}

impl DispatchThread {
    /// Start a dispatch thread with the given name.
    pub fn spawn(name: impl Into<String>) -> std::io::Result<Self> {
        let name = name.into();
        let (sender, receiver) = unbounded();

        let handle = thread::Builder::new()
            .name(name.clone())
            .spawn(move || dispatch_loop(receiver))?;

        tracing::debug!(target: targets::DISPATCH, name = %name, "dispatch thread started");

        Ok(Self {
            sender: Mutex::new(Some(sender)),
            thread_id: handle.thread().id(),
            handle: Mutex::new(Some(handle)),
            name,
        })
    }

    /// The thread's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Check if the calling thread is this dispatch thread.
    pub fn is_current(&self) -> bool {
        thread::current().id() == self.thread_id
    }

    /// Check if the thread still accepts tasks.
    pub fn is_running(&self) -> bool {
        self.sender.lock().is_some()
    }

    /// Stop accepting tasks, run the ones already queued, and join the thread.
    ///
    /// Returns `Err(DispatchError::Disconnected)` if the thread was already
    /// shut down or panicked.
    pub fn shutdown(&self) -> Result<(), DispatchError> {
        drop(self.sender.lock().take());

        let handle = self.handle.lock().take().ok_or(DispatchError::Disconnected)?;
        if self.is_current() {
            // Joining ourselves would deadlock; the loop exits once drained.
            return Ok(());
        }
        handle.join().map_err(|_| DispatchError::Disconnected)?;

        tracing::debug!(target: targets::DISPATCH, name = %self.name, "dispatch thread stopped");
        Ok(())
    }
}

impl Dispatcher for DispatchThread {
    fn schedule(&self, task: Task) {
        let sender = self.sender.lock();
        let delivered = sender.as_ref().is_some_and(|s| s.send(task).is_ok());
        if !delivered {
            tracing::warn!(
                target: targets::DISPATCH,
                name = %self.name,
                "dispatch thread is shut down, dropping task"
            );
        }
    }
}

impl Drop for DispatchThread {
    fn drop(&mut self) {
        drop(self.sender.get_mut().take());
    }
}

impl std::fmt::Debug for DispatchThread {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DispatchThread")
            .field("name", &self.name)
            .field("running", &self.is_running())
            .finish()
    }
}

fn dispatch_loop(receiver: Receiver<Task>) {
    // Ends once every sender is gone and the channel is drained.
    for task in receiver {
        task();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn recorder() -> (Arc<Mutex<Vec<i32>>>, impl Fn(i32) -> Task) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let log_clone = log.clone();
        let make = move |n: i32| -> Task {
            let log = log_clone.clone();
            Box::new(move || log.lock().push(n))
        };
        (log, make)
    }

    #[test]
    fn test_event_queue_fifo() {
        let queue = EventQueue::new();
        let (log, task) = recorder();

        for n in 1..=5 {
            queue.schedule(task(n));
        }
        assert_eq!(queue.pending_count(), 5);
        assert!(log.lock().is_empty());

        assert_eq!(queue.process_pending().unwrap(), 5);
        assert_eq!(*log.lock(), vec![1, 2, 3, 4, 5]);
        assert_eq!(queue.pending_count(), 0);
    }

    #[test]
    fn test_event_queue_defers_reentrant_tasks() {
        let queue = Arc::new(EventQueue::new());
        let (log, task) = recorder();

        let inner = task(2);
        let queue_clone = queue.clone();
        let outer = task(1);
        queue.schedule(Box::new(move || {
            outer();
            queue_clone.schedule(inner);
        }));

        assert_eq!(queue.process_pending().unwrap(), 1);
        assert_eq!(*log.lock(), vec![1]);
        assert_eq!(queue.process_pending().unwrap(), 1);
        assert_eq!(*log.lock(), vec![1, 2]);
    }

    #[test]
    fn test_event_queue_rejects_other_threads() {
        let queue = Arc::new(EventQueue::new());
        queue.bind_to_current_thread().unwrap();
        assert!(queue.is_owner());

        let (log, task) = recorder();
        queue.schedule(task(1));

        let queue_clone = queue.clone();
        let result = thread::spawn(move || queue_clone.process_pending())
            .join()
            .unwrap();
        assert_eq!(result, Err(DispatchError::WrongThread));
        assert!(log.lock().is_empty());

        assert_eq!(queue.process_pending().unwrap(), 1);
    }

    #[test]
    fn test_event_queue_wait_and_process() {
        let queue = Arc::new(EventQueue::new());
        queue.bind_to_current_thread().unwrap();
        let (log, task) = recorder();

        let queue_clone = queue.clone();
        let producer = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            queue_clone.schedule(task(7));
        });

        let ran = queue.wait_and_process(Duration::from_secs(5)).unwrap();
        producer.join().unwrap();

        assert_eq!(ran, 1);
        assert_eq!(*log.lock(), vec![7]);
    }

    #[test]
    fn test_event_queue_wait_times_out() {
        let queue = EventQueue::new();
        let ran = queue.wait_and_process(Duration::from_millis(10)).unwrap();
        assert_eq!(ran, 0);
    }

    #[test]
    fn test_dispatch_thread_runs_in_order_on_its_thread() {
        let dispatch = Arc::new(DispatchThread::spawn("test-dispatch").unwrap());
        let log = Arc::new(Mutex::new(Vec::new()));

        for n in 0..50 {
            let log = log.clone();
            let dispatch_clone = dispatch.clone();
            dispatch.schedule(Box::new(move || {
                assert!(dispatch_clone.is_current());
                log.lock().push(n);
            }));
        }

        dispatch.shutdown().unwrap();
        assert_eq!(*log.lock(), (0..50).collect::<Vec<_>>());
        assert!(!dispatch.is_running());
    }

    #[test]
    fn test_dispatch_thread_drops_tasks_after_shutdown() {
        let dispatch = DispatchThread::spawn("test-dispatch-stopped").unwrap();
        dispatch.shutdown().unwrap();

        let (log, task) = recorder();
        dispatch.schedule(task(1));
        assert!(log.lock().is_empty());
        assert_eq!(dispatch.shutdown(), Err(DispatchError::Disconnected));
    }
}
