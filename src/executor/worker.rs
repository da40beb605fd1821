use tracing::trace;

use crate::config::HeaderPolicy;
use crate::render::{HeaderMap, NavigationError, RenderingContext};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Idle,
    Busy,
    Closing,
}

/// Exclusive owner of one rendering context
///
/// A worker is moved out of the pool while it runs a task, so only one task
/// can ever touch its context at a time.
#[derive(Debug)]
pub struct Worker<C> {
    id: usize,
    state: WorkerState,
    context: C,
    /// Extra headers last requested for the context
    applied_headers: HeaderMap,
    /// False while an install is in flight or after one failed
    headers_in_sync: bool,
}

impl<C: RenderingContext> Worker<C> {
    pub fn new(id: usize, context: C) -> Self {
        Self {
            id,
            state: WorkerState::Idle,
            context,
            applied_headers: HeaderMap::new(),
            headers_in_sync: true,
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn state(&self) -> WorkerState {
        self.state
    }

    pub(crate) fn set_state(&mut self, state: WorkerState) {
        self.state = state;
    }

    pub fn context_mut(&mut self) -> &mut C {
        &mut self.context
    }

    pub fn applied_headers(&self) -> &HeaderMap {
        &self.applied_headers
    }

    /// Whether the context is known to carry exactly `applied_headers`
    pub fn headers_in_sync(&self) -> bool {
        self.headers_in_sync
    }

    /// Install the headers a task should navigate with
    ///
    /// `Reset` replaces whatever the previous task left behind with exactly
    /// `requested`. `Retain` layers `requested` over the headers already on
    /// the context, so earlier tasks' headers persist. The context is only
    /// skipped when the effective set is unchanged and the last install
    /// completed. An install cut short by a timeout or an error leaves the
    /// page in an unknown state, so the next task always reinstalls.
    pub async fn prepare_headers(
        &mut self,
        requested: &HeaderMap,
        policy: HeaderPolicy,
    ) -> Result<(), NavigationError> {
        let target = match policy {
            HeaderPolicy::Reset => requested.clone(),
            HeaderPolicy::Retain => {
                let mut merged = self.applied_headers.clone();
                merged.extend(requested.iter().map(|(k, v)| (k.clone(), v.clone())));
                merged
            }
        };

        if self.headers_in_sync && target == self.applied_headers {
            return Ok(());
        }

        trace!(
            "Worker {} applying {} extra header(s)",
            self.id,
            target.len()
        );
        self.headers_in_sync = false;
        self.applied_headers = target;
        self.context.apply_headers(&self.applied_headers).await?;
        self.headers_in_sync = true;
        Ok(())
    }

    /// Release the rendering context
    pub async fn close(mut self) {
        self.state = WorkerState::Closing;
        trace!("Closing worker {}", self.id);
        self.context.close().await;
    }
}
