//! Per-task logic run on a worker
//!
//! Applies the caller's headers, navigates under the configured timeout and
//! turns the navigation into a `RenderResult`. The served counter is bumped
//! here on success; failures are counted by whoever surfaces them.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{info, warn};

use super::context::RenderingContext;
use super::error::TaskFailure;
use super::page_timeout::with_navigation_timeout;
use super::types::{RenderRequest, RenderResult};
use crate::config::HeaderPolicy;
use crate::executor::{StatsTracker, Worker};

#[derive(Debug, Clone)]
pub struct ExecutionEngine {
    navigation_timeout: Duration,
    header_policy: HeaderPolicy,
    stats: Arc<StatsTracker>,
}

impl ExecutionEngine {
    pub fn new(
        navigation_timeout: Duration,
        header_policy: HeaderPolicy,
        stats: Arc<StatsTracker>,
    ) -> Self {
        Self {
            navigation_timeout,
            header_policy,
            stats,
        }
    }

    /// Render one request on `worker`'s context
    pub async fn execute<C: RenderingContext>(
        &self,
        worker: &mut Worker<C>,
        request: &RenderRequest,
    ) -> Result<RenderResult, TaskFailure> {
        let started = Instant::now();
        let policy = self.header_policy;

        let navigation = with_navigation_timeout(
            async {
                worker.prepare_headers(request.headers(), policy).await?;
                worker.context_mut().navigate(request.url()).await
            },
            self.navigation_timeout,
        )
        .await;

        let navigation = match navigation {
            Ok(navigation) => navigation,
            Err(failure) => {
                if failure.is_timeout() {
                    warn!(
                        "Worker {} timed out on '{}', stopping page load",
                        worker.id(),
                        request.url()
                    );
                    worker.context_mut().stop_loading().await;
                }
                return Err(failure);
            }
        };

        let duration = started.elapsed();
        let target = if navigation.final_url == request.url() {
            format!("'{}'", request.url())
        } else {
            format!("'{}' -> '{}'", request.url(), navigation.final_url)
        };
        info!(
            url = %request.url(),
            final_url = %navigation.final_url,
            status = navigation.status_code,
            duration_ms = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX),
            worker = worker.id(),
            "Fetched {} status: {} ({:.3}s)",
            target,
            navigation.status_code,
            duration.as_secs_f64()
        );

        self.stats.record_served();

        Ok(RenderResult {
            body: navigation.content,
            status_code: navigation.status_code,
            headers: navigation.headers,
            final_url: navigation.final_url,
            duration,
        })
    }
}
