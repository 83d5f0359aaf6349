//! [`RequestExecutor`]: a fixed-size worker pool of OS threads fed by an
//! unbounded task queue.
//!
//! Readers perform blocking disk I/O, so workers are plain OS threads, not
//! async tasks — there is no cooperative suspension point to yield at mid-read.
//! Each worker owns a persistent scratch `Vec<u8>` for its whole lifetime,
//! reused across every task it runs, so the hot path never allocates for
//! value bytes.

use crossbeam::channel::{self, Sender};
use parking_lot::Mutex;
use std::thread::{self, JoinHandle};
use tokio::sync::oneshot;
use tracing::debug;

type Task = Box<dyn FnOnce(&mut Vec<u8>) + Send>;

/// A fixed-size worker pool bounding the number of reader calls that can run
/// concurrently.
///
/// Submitting a task never blocks the caller — the queue is unbounded and
/// backpressure is delegated to whatever sits in front of the handler (the
/// RPC transport, out of scope here). `submit` returns a [`oneshot::Receiver`]
/// an async caller can `.await`.
pub struct RequestExecutor {
    sender: Mutex<Option<Sender<Task>>>,
    handles: Mutex<Vec<JoinHandle<()>>>,
}

impl RequestExecutor {
    /// Spawn `num_workers` worker threads, each with its own scratch buffer.
    pub fn new(num_workers: u32) -> Self {
        let (tx, rx) = channel::unbounded::<Task>();
        let handles = (0..num_workers)
            .map(|i| {
                let rx = rx.clone();
                thread::Builder::new()
                    .name(format!("request-executor-{i}"))
                    .spawn(move || {
                        let mut scratch = Vec::new();
                        while let Ok(task) = rx.recv() {
                            task(&mut scratch);
                        }
                        debug!(worker = i, "request executor worker exiting");
                    })
                    .expect("failed to spawn request executor worker thread")
            })
            .collect();

        Self {
            sender: Mutex::new(Some(tx)),
            handles: Mutex::new(handles),
        }
    }

    /// Submit one unit of work. The work closure receives the calling
    /// worker's scratch buffer and its return value is delivered through the
    /// returned receiver.
    ///
    /// If the executor has already been shut down, the returned receiver
    /// resolves to an error immediately (its sender is dropped without ever
    /// running `work`).
    pub fn submit<R, F>(&self, work: F) -> oneshot::Receiver<R>
    where
        R: Send + 'static,
        F: FnOnce(&mut Vec<u8>) -> R + Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        let task: Task = Box::new(move |scratch| {
            let result = work(scratch);
            // The waiter may have stopped listening (interrupted); that is
            // not this worker's problem, the task still ran to completion.
            let _ = tx.send(result);
        });

        let guard = self.sender.lock();
        match guard.as_ref() {
            Some(sender) => {
                let _ = sender.send(task);
            }
            None => {
                // Executor shut down: drop `task` (and its `tx`) right here
                // so `rx` observes a closed channel instead of hanging.
            }
        }
        rx
    }

    /// Stop accepting new tasks, drain the queue (letting already-queued
    /// tasks finish), then join every worker thread. Idempotent: a second
    /// call is a no-op.
    pub fn shut_down(&self) {
        let sender = self.sender.lock().take();
        drop(sender); // closes the channel once every clone is dropped

        let handles = std::mem::take(&mut *self.handles.lock());
        for handle in handles {
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn runs_a_submitted_task_and_returns_its_result() {
        let executor = RequestExecutor::new(2);
        let rx = executor.submit(|_scratch| 42);
        assert_eq!(rx.await.unwrap(), 42);
        executor.shut_down();
    }

    #[tokio::test]
    async fn worker_reuses_its_scratch_buffer_across_tasks() {
        let executor = RequestExecutor::new(1);
        let rx1 = executor.submit(|scratch| {
            scratch.extend_from_slice(b"hello");
            scratch.as_ptr() as usize
        });
        let ptr1 = rx1.await.unwrap();

        let rx2 = executor.submit(|scratch| scratch.as_ptr() as usize);
        let ptr2 = rx2.await.unwrap();

        assert_eq!(ptr1, ptr2, "same worker should reuse the same allocation");
        executor.shut_down();
    }

    #[tokio::test]
    async fn never_runs_more_than_pool_size_tasks_concurrently() {
        let pool_size = 2;
        let executor = RequestExecutor::new(pool_size);
        let in_flight = Arc::new(AtomicUsize::new(0));
        let max_observed = Arc::new(AtomicUsize::new(0));

        let mut receivers = Vec::new();
        for _ in 0..10 {
            let in_flight = in_flight.clone();
            let max_observed = max_observed.clone();
            let rx = executor.submit(move |_scratch| {
                let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                max_observed.fetch_max(now, Ordering::SeqCst);
                thread::sleep(Duration::from_millis(20));
                in_flight.fetch_sub(1, Ordering::SeqCst);
            });
            receivers.push(rx);
        }

        for rx in receivers {
            rx.await.unwrap();
        }

        assert!(max_observed.load(Ordering::SeqCst) as u32 <= pool_size);
        executor.shut_down();
    }

    #[tokio::test]
    async fn shut_down_is_idempotent() {
        let executor = RequestExecutor::new(1);
        executor.shut_down();
        executor.shut_down();
    }

    #[tokio::test]
    async fn submit_after_shutdown_resolves_to_an_error_instead_of_hanging() {
        let executor = RequestExecutor::new(1);
        executor.shut_down();
        let rx = executor.submit(|_scratch| 1);
        assert!(rx.await.is_err());
    }
}
