//! Fixed-size pool of workers
//!
//! Idle workers sit in a FIFO deque behind a single mutex; the busy counter is
//! only changed while that mutex is held, so `busy_count() <= size()` holds at
//! every instant. Acquiring moves the worker (and its context) out of the pool;
//! releasing moves it back.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;
use tokio::sync::Notify;
use tracing::{debug, error, info, warn};

use super::worker::{Worker, WorkerState};
use crate::render::{LaunchError, RenderBackend};

pub struct WorkerPool<B: RenderBackend> {
    idle: Mutex<VecDeque<Worker<B::Context>>>,
    busy: AtomicUsize,
    size: usize,
    /// Signalled whenever a worker returns to the idle set
    released: Notify,
    backend: Mutex<Option<B>>,
}

impl<B: RenderBackend> WorkerPool<B> {
    /// Open `size` rendering contexts and wrap each in a worker
    ///
    /// Fails atomically: if any context cannot be opened, the ones already
    /// opened are closed and the backend is shut down before returning.
    pub async fn launch(mut backend: B, size: usize) -> Result<Self, LaunchError> {
        if size == 0 {
            backend.shutdown().await;
            return Err(LaunchError::Config(
                "worker pool size must be at least 1".to_string(),
            ));
        }

        let mut workers = VecDeque::with_capacity(size);
        for id in 0..size {
            match backend.open_context(id).await {
                Ok(context) => workers.push_back(Worker::new(id, context)),
                Err(e) => {
                    error!("Failed to start worker {}: {}", id, e);
                    for worker in workers {
                        worker.close().await;
                    }
                    backend.shutdown().await;
                    return Err(e);
                }
            }
        }

        info!("Worker pool started with {} worker(s)", size);
        Ok(Self {
            idle: Mutex::new(workers),
            busy: AtomicUsize::new(0),
            size,
            released: Notify::new(),
            backend: Mutex::new(Some(backend)),
        })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn busy_count(&self) -> usize {
        self.busy.load(Ordering::SeqCst)
    }

    /// Take an idle worker without waiting
    pub fn try_acquire(&self) -> Option<Worker<B::Context>> {
        let mut idle = self.idle.lock();
        let mut worker = idle.pop_front()?;
        self.busy.fetch_add(1, Ordering::SeqCst);
        drop(idle);

        worker.set_state(WorkerState::Busy);
        Some(worker)
    }

    /// Wait for an idle worker and mark it busy
    pub async fn acquire(&self) -> Worker<B::Context> {
        loop {
            let notified = self.released.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if let Some(worker) = self.try_acquire() {
                return worker;
            }
            notified.await;
        }
    }

    /// Wait until at least one worker is idle, without claiming it
    pub async fn wait_for_idle(&self) {
        loop {
            let notified = self.released.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if !self.idle.lock().is_empty() {
                return;
            }
            notified.await;
        }
    }

    /// Return a worker to the idle set
    pub fn release(&self, mut worker: Worker<B::Context>) {
        worker.set_state(WorkerState::Idle);
        let id = worker.id();

        let mut idle = self.idle.lock();
        idle.push_back(worker);
        self.busy.fetch_sub(1, Ordering::SeqCst);
        drop(idle);

        debug!("Worker {} is idle", id);
        self.released.notify_waiters();
    }

    /// Wait until every worker is idle
    pub async fn join(&self) {
        loop {
            let notified = self.released.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if self.busy_count() == 0 {
                return;
            }
            notified.await;
        }
    }

    /// Close every rendering context, then the backend
    ///
    /// Call after `join()`. Workers still out on a task at this point are
    /// not closed here; their contexts go away with the backend.
    pub async fn close(&self) {
        let workers: Vec<_> = self.idle.lock().drain(..).collect();
        let busy = self.busy_count();
        if busy > 0 {
            warn!("Closing pool with {} busy worker(s)", busy);
        }

        for worker in workers {
            worker.close().await;
        }

        let backend = self.backend.lock().take();
        if let Some(backend) = backend {
            backend.shutdown().await;
            info!("Worker pool closed");
        }
    }
}
