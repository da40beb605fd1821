//! Bounded-concurrency render executor
//!
//! Requests enter a FIFO `TaskQueue`; a single `Scheduler` hands each one to
//! an idle `Worker` from the fixed-size `WorkerPool`, which runs it through
//! the `ExecutionEngine`. `LifecycleManager` owns the whole assembly.

pub mod lifecycle;
pub mod pool;
pub mod queue;
pub mod scheduler;
pub mod stats;
pub mod worker;

pub use lifecycle::{ExecutorStatus, LifecycleManager, LifecycleState};
pub use pool::WorkerPool;
pub use queue::{CompletionHandle, QueueEntry, TaskQueue};
pub use scheduler::Scheduler;
pub use stats::{StatsSnapshot, StatsTracker, spawn_reporter};
pub use worker::{Worker, WorkerState};
