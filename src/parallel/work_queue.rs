//! Fixed-size worker pool fed by a shared task queue.
//!
//! `pending` counts every accepted task until it has run, including tasks
//! submitted by other tasks, so [`WorkQueue::finish`] only returns once the
//! queue is drained and no worker is mid-task.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread::{self, JoinHandle};
use crossbeam::channel::{unbounded, Receiver, Sender};
use parking_lot::{Condvar, Mutex};
use tracing::{debug, error, warn};
use crate::core::error::{Error, Result};

type Job = Box<dyn FnOnce() -> Result<()> + Send + 'static>;

enum Message {
    Run(Job),
    Terminate,
}

struct QueueState {
    pending: usize,
    shutdown: bool,
}

struct Shared {
    state: Mutex<QueueState>,
    idle: Condvar,
    sender: Sender<Message>,
    failures: AtomicUsize,
}

impl Shared {
    fn execute(&self, job: Job) -> Result<()> {
        let mut state = self.state.lock();
        if state.shutdown {
            warn!("work queue is shut down, task rejected");
            return Err(Error::invalid_state("work queue is shut down"));
        }

        // Sent under the state lock so no task can land behind a Terminate
        self.sender
            .send(Message::Run(job))
            .map_err(|_| Error::invalid_state("work queue has no workers"))?;
        state.pending += 1;
        Ok(())
    }

    fn run(&self, job: Job) {
        match panic::catch_unwind(AssertUnwindSafe(job)) {
            Ok(Ok(())) => {}
            Ok(Err(err)) => {
                self.failures.fetch_add(1, Ordering::Relaxed);
                error!("task failed: {}", err);
            }
            Err(payload) => {
                self.failures.fetch_add(1, Ordering::Relaxed);
                error!("task panicked: {}", panic_message(payload.as_ref()));
            }
        }

        let mut state = self.state.lock();
        state.pending -= 1;
        if state.pending == 0 {
            self.idle.notify_all();
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "unknown panic"
    }
}

fn worker_loop(id: usize, receiver: Receiver<Message>, shared: Arc<Shared>) {
    debug!(worker = id, "worker started");
    while let Ok(message) = receiver.recv() {
        match message {
            Message::Run(job) => shared.run(job),
            Message::Terminate => break,
        }
    }
    debug!(worker = id, "worker stopped");
}

/// Pool of `size` worker threads
pub struct WorkQueue {
    shared: Arc<Shared>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    size: usize,
}

impl WorkQueue {
    pub fn new(size: usize) -> Result<Self> {
        if size == 0 {
            return Err(Error::invalid_argument("work queue needs at least one worker"));
        }

        let (sender, receiver) = unbounded();
        let shared = Arc::new(Shared {
            state: Mutex::new(QueueState { pending: 0, shutdown: false }),
            idle: Condvar::new(),
            sender,
            failures: AtomicUsize::new(0),
        });

        let mut workers = Vec::with_capacity(size);
        for id in 0..size {
            let receiver = receiver.clone();
            let shared = shared.clone();
            let handle = thread::Builder::new()
                .name(format!("stemdex-worker-{}", id))
                .spawn(move || worker_loop(id, receiver, shared))?;
            workers.push(handle);
        }

        Ok(WorkQueue {
            shared,
            workers: Mutex::new(workers),
            size,
        })
    }

    /// Queues `task` for one of the workers.
    ///
    /// An `Err` returned by the task, or a panic, is logged and counted in
    /// [`failures`](Self::failures); the worker keeps going.
    pub fn execute<F>(&self, task: F) -> Result<()>
    where
        F: FnOnce() -> Result<()> + Send + 'static,
    {
        self.shared.execute(Box::new(task))
    }

    /// Cloneable handle for submitting work from inside running tasks
    pub fn spawner(&self) -> Spawner {
        Spawner { shared: self.shared.clone() }
    }

    /// Blocks until every accepted task, including ones spawned by other
    /// tasks, has completed. Must not be called from inside a task.
    pub fn finish(&self) {
        let mut state = self.shared.state.lock();
        while state.pending > 0 {
            self.shared.idle.wait(&mut state);
        }
    }

    /// Lets in-flight and queued work complete, then stops every worker.
    /// Later `execute` calls are rejected. Calling it twice is a no-op.
    pub fn shutdown(&self) {
        {
            let mut state = self.shared.state.lock();
            if state.shutdown {
                return;
            }
            state.shutdown = true;
            for _ in 0..self.size {
                // Receivers outlive this send: workers hold them until Terminate
                let _ = self.shared.sender.send(Message::Terminate);
            }
        }

        let workers = std::mem::take(&mut *self.workers.lock());
        for worker in workers {
            if worker.join().is_err() {
                error!("worker thread exited abnormally");
            }
        }
        debug!(workers = self.size, "work queue shut down");
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Accepted tasks that have not completed yet
    pub fn pending(&self) -> usize {
        self.shared.state.lock().pending
    }

    /// Tasks that returned an error or panicked
    pub fn failures(&self) -> usize {
        self.shared.failures.load(Ordering::Relaxed)
    }

    pub fn is_shutdown(&self) -> bool {
        self.shared.state.lock().shutdown
    }
}

impl Drop for WorkQueue {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Submits tasks to a [`WorkQueue`] without owning it
#[derive(Clone)]
pub struct Spawner {
    shared: Arc<Shared>,
}

impl Spawner {
    pub fn execute<F>(&self, task: F) -> Result<()>
    where
        F: FnOnce() -> Result<()> + Send + 'static,
    {
        self.shared.execute(Box::new(task))
    }
}
