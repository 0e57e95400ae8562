//! Background Task Queue
//!
//! A named worker thread that runs submitted closures one at a time, in
//! submission order. Used for background snapshot flushes and
//! fire-and-forget transactional writes.
//!
//! ## Lifecycle
//! - `TaskQueue::new` spawns the worker
//! - Handles are cheap to clone (they share one channel)
//! - The worker drains remaining tasks and exits once every handle is dropped

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;

use crossbeam::channel::{self, Receiver, Sender};

use crate::error::{PrefError, Result};

type Task = Box<dyn FnOnce() + Send + 'static>;

/// FIFO executor backed by a single worker thread
#[derive(Clone)]
pub struct TaskQueue {
    /// Queue name (also the worker thread name)
    name: Arc<str>,

    /// Submission side of the worker channel
    sender: Sender<Task>,
}

impl TaskQueue {
    /// Spawn a new worker thread named `name`
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name: String = name.into();
        let (sender, receiver) = channel::unbounded::<Task>();

        let worker_name = name.clone();
        thread::Builder::new()
            .name(name.clone())
            .spawn(move || Self::run(&worker_name, receiver))?;

        tracing::debug!(queue = %name, "Task queue started");

        Ok(Self {
            name: name.into(),
            sender,
        })
    }

    /// Submit a task without waiting for it
    ///
    /// The task's outcome is never reported back to the caller.
    pub fn spawn<F>(&self, task: F) -> Result<()>
    where
        F: FnOnce() + Send + 'static,
    {
        self.sender
            .send(Box::new(task))
            .map_err(|_| PrefError::QueueClosed(self.name.to_string()))
    }

    /// Block until every task submitted before this call has run
    ///
    /// Must not be called from a task running on this same queue.
    pub fn drain(&self) -> Result<()> {
        let (done_tx, done_rx) = channel::bounded::<()>(1);
        self.spawn(move || {
            let _ = done_tx.send(());
        })?;

        done_rx
            .recv()
            .map_err(|_| PrefError::QueueClosed(self.name.to_string()))
    }

    /// Number of tasks waiting to run
    pub fn pending(&self) -> usize {
        self.sender.len()
    }

    /// Queue name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Worker loop: run tasks until all senders are gone
    fn run(name: &str, receiver: Receiver<Task>) {
        for task in receiver.iter() {
            if panic::catch_unwind(AssertUnwindSafe(task)).is_err() {
                tracing::warn!(queue = %name, "Background task panicked");
            }
        }

        tracing::debug!(queue = %name, "Task queue stopped");
    }
}

impl std::fmt::Debug for TaskQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskQueue")
            .field("name", &self.name)
            .field("pending", &self.pending())
            .finish()
    }
}
