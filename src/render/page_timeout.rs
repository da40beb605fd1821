//! Timeout wrapper for navigations
//!
//! Keeps a hung page from pinning a worker forever: every navigation runs
//! under `tokio::time::timeout` and a lapse becomes `TaskFailure::Timeout`.

use std::future::Future;
use std::time::Duration;

use super::error::{NavigationError, TaskFailure};

/// Run a navigation future with an explicit deadline
///
/// # Returns
/// * `Ok(T)` - navigation completed in time
/// * `Err(TaskFailure::Navigation)` - the collaborator reported a failure
/// * `Err(TaskFailure::Timeout)` - the deadline passed first; the future is dropped
pub async fn with_navigation_timeout<F, T>(operation: F, timeout: Duration) -> Result<T, TaskFailure>
where
    F: Future<Output = Result<T, NavigationError>>,
{
    match tokio::time::timeout(timeout, operation).await {
        Ok(result) => result.map_err(TaskFailure::from),
        Err(_) => Err(TaskFailure::Timeout(timeout)),
    }
}
