//! Dispatch loop pairing queued requests with idle workers
//!
//! There is exactly one dispatcher, and it is the only caller of
//! `WorkerPool::acquire`. It waits for a free worker first and only then
//! takes the next entry, so an entry never sits claimed while no worker can
//! run it and FIFO order is preserved.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio::task::JoinHandle;
use tracing::{debug, error};

use super::pool::WorkerPool;
use super::queue::{QueueEntry, TaskQueue};
use crate::render::{ExecutionEngine, RenderBackend, RenderError, TaskFailure};

pub struct Scheduler {
    dispatcher: JoinHandle<()>,
}

impl Scheduler {
    /// Start dispatching from `queue` onto `pool`
    pub fn spawn<B: RenderBackend>(
        queue: Arc<TaskQueue>,
        pool: Arc<WorkerPool<B>>,
        engine: Arc<ExecutionEngine>,
    ) -> Self {
        let dispatcher = tokio::spawn(dispatch_loop(queue, pool, engine));
        Self { dispatcher }
    }

    /// Wait for the dispatcher to hand out the last entry of a closed queue
    ///
    /// Tasks already dispatched may still be running; join the pool for those.
    pub async fn join(self) {
        if let Err(e) = self.dispatcher.await {
            error!("Scheduler dispatch loop failed: {}", e);
        }
    }
}

async fn dispatch_loop<B: RenderBackend>(
    queue: Arc<TaskQueue>,
    pool: Arc<WorkerPool<B>>,
    engine: Arc<ExecutionEngine>,
) {
    debug!("Scheduler started");
    loop {
        pool.wait_for_idle().await;
        let Some(entry) = queue.next().await else {
            break;
        };
        let worker = pool.acquire().await;
        debug!(
            "Dispatching '{}' to worker {} after {:.3}s in queue",
            entry.request().url(),
            worker.id(),
            entry.request().queued_for().as_secs_f64()
        );
        tokio::spawn(run_entry(entry, worker, Arc::clone(&pool), Arc::clone(&engine)));
    }
    debug!("Scheduler stopped: queue closed and empty");
}

/// Run one entry, resolve its handle, then give the worker back
///
/// The worker is released on every path, including a panic inside the task.
async fn run_entry<B: RenderBackend>(
    entry: QueueEntry,
    mut worker: super::worker::Worker<B::Context>,
    pool: Arc<WorkerPool<B>>,
    engine: Arc<ExecutionEngine>,
) {
    let request = entry.request().clone();
    let outcome = AssertUnwindSafe(engine.execute(&mut worker, &request))
        .catch_unwind()
        .await;

    let outcome = match outcome {
        Ok(Ok(result)) => Ok(result),
        Ok(Err(failure)) => Err(RenderError::new(request.url(), failure)),
        Err(panic) => {
            let message = panic_message(panic.as_ref());
            error!(
                "Render task for '{}' panicked on worker {}: {}",
                request.url(),
                worker.id(),
                message
            );
            Err(RenderError::new(
                request.url(),
                TaskFailure::Unexpected(message),
            ))
        }
    };

    if !entry.resolve(outcome) {
        debug!("Caller for '{}' went away before completion", request.url());
    }
    pool.release(worker);
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "task panicked".to_string()
    }
}
