//! Startup and shutdown of the executor
//!
//! States move strictly forward: Starting → Running → Draining → Stopped.
//! The state is published on a `watch` channel so the HTTP layer and tests can
//! observe transitions.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::info;

use super::pool::WorkerPool;
use super::queue::{CompletionHandle, TaskQueue};
use super::scheduler::Scheduler;
use super::stats::{StatsSnapshot, StatsTracker, spawn_reporter};
use crate::config::ExecutorConfig;
use crate::render::{ExecutionEngine, LaunchError, RenderBackend, RenderOutcome, RenderRequest};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleState {
    Starting,
    Running,
    Draining,
    Stopped,
}

impl LifecycleState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Starting => "starting",
            Self::Running => "running",
            Self::Draining => "draining",
            Self::Stopped => "stopped",
        }
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Point-in-time view of the executor for health reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutorStatus {
    pub state: LifecycleState,
    pub stats: StatsSnapshot,
    pub queued: usize,
    pub busy_workers: usize,
    pub max_concurrency: usize,
}

/// Owns the queue, pool, scheduler and stats for one process
pub struct LifecycleManager<B: RenderBackend> {
    state: watch::Sender<LifecycleState>,
    queue: Arc<TaskQueue>,
    pool: Arc<WorkerPool<B>>,
    stats: Arc<StatsTracker>,
    scheduler: Mutex<Option<Scheduler>>,
    reporter: Mutex<Option<JoinHandle<()>>>,
    shutdown_lock: tokio::sync::Mutex<()>,
}

impl<B: RenderBackend> LifecycleManager<B> {
    /// Bring the pool up to `config.max_concurrency` workers and start dispatching
    ///
    /// On error nothing is left running: the pool has already released any
    /// contexts it opened and shut the backend down.
    pub async fn launch(backend: B, config: &ExecutorConfig) -> Result<Self, LaunchError> {
        let (state, _) = watch::channel(LifecycleState::Starting);
        info!(
            max_concurrency = config.max_concurrency,
            navigation_timeout_secs = config.navigation_timeout.as_secs_f64(),
            header_policy = ?config.header_policy,
            "Starting render executor"
        );

        let pool = Arc::new(WorkerPool::launch(backend, config.max_concurrency).await?);
        let queue = Arc::new(TaskQueue::new());
        let stats = Arc::new(StatsTracker::new());
        let engine = Arc::new(ExecutionEngine::new(
            config.navigation_timeout,
            config.header_policy,
            Arc::clone(&stats),
        ));

        let scheduler = Scheduler::spawn(Arc::clone(&queue), Arc::clone(&pool), engine);
        let reporter = spawn_reporter(Arc::clone(&stats), config.stats_interval);

        state.send_replace(LifecycleState::Running);
        info!("Render executor running");

        Ok(Self {
            state,
            queue,
            pool,
            stats,
            scheduler: Mutex::new(Some(scheduler)),
            reporter: Mutex::new(Some(reporter)),
            shutdown_lock: tokio::sync::Mutex::new(()),
        })
    }

    /// Queue a request; after draining started the handle fails immediately
    pub fn submit(&self, request: RenderRequest) -> CompletionHandle {
        self.queue.enqueue(request)
    }

    /// Queue a request and wait for its outcome
    pub async fn render(&self, request: RenderRequest) -> RenderOutcome {
        self.submit(request).wait().await
    }

    pub fn stats(&self) -> &Arc<StatsTracker> {
        &self.stats
    }

    pub fn state(&self) -> LifecycleState {
        *self.state.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<LifecycleState> {
        self.state.subscribe()
    }

    pub fn status(&self) -> ExecutorStatus {
        ExecutorStatus {
            state: self.state(),
            stats: self.stats.snapshot(),
            queued: self.queue.len(),
            busy_workers: self.pool.busy_count(),
            max_concurrency: self.pool.size(),
        }
    }

    /// Stop intake; queued and in-flight work keeps running
    pub fn begin_drain(&self) {
        let started = self.state.send_if_modified(|state| {
            if *state == LifecycleState::Running {
                *state = LifecycleState::Draining;
                true
            } else {
                false
            }
        });
        if started {
            info!(
                queued = self.queue.len(),
                busy_workers = self.pool.busy_count(),
                "Draining render executor"
            );
        }
        self.queue.close();
    }

    /// Drain every accepted request, then release all browser resources
    ///
    /// Blocks until the queue is empty and every worker is idle. Safe to call
    /// more than once; later calls return once the first has finished.
    pub async fn shutdown(&self) {
        let _guard = self.shutdown_lock.lock().await;
        if self.state() == LifecycleState::Stopped {
            return;
        }
        self.begin_drain();

        let scheduler = self.scheduler.lock().take();
        if let Some(scheduler) = scheduler {
            scheduler.join().await;
        }
        self.pool.join().await;
        self.pool.close().await;

        let reporter = self.reporter.lock().take();
        if let Some(reporter) = reporter {
            reporter.abort();
        }

        let snapshot = self.stats.snapshot();
        info!(
            served_requests = snapshot.served_requests,
            error_count = snapshot.error_count,
            "Render executor stopped"
        );
        self.state.send_replace(LifecycleState::Stopped);
    }
}
