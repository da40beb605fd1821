//! Browser collaborator seam
//!
//! The executor never talks to Chrome directly. It drives a `RenderBackend`
//! that hands out one `RenderingContext` per worker at launch and is shut down
//! once every worker has been released. `chrome` is the production backend;
//! tests plug in scripted ones.

use std::future::Future;

use super::error::{LaunchError, NavigationError};
use super::types::HeaderMap;

/// What a context reports after a page finished loading
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    pub status_code: u16,
    pub final_url: String,
    pub content: String,
    pub headers: HeaderMap,
}

/// A page/tab exclusively owned by one worker for the lifetime of the pool
pub trait RenderingContext: Send + 'static {
    /// Replace the set of extra HTTP headers sent with subsequent navigations
    fn apply_headers(
        &mut self,
        headers: &HeaderMap,
    ) -> impl Future<Output = Result<(), NavigationError>> + Send;

    /// Load `url`, wait for it to settle and capture the rendered page
    fn navigate(
        &mut self,
        url: &str,
    ) -> impl Future<Output = Result<Navigation, NavigationError>> + Send;

    /// Best-effort abort of an in-flight navigation after a timeout
    fn stop_loading(&mut self) -> impl Future<Output = ()> + Send {
        async {}
    }

    /// Release the context
    fn close(self) -> impl Future<Output = ()> + Send;
}

/// Pool-wide browser resources
pub trait RenderBackend: Send + Sync + 'static {
    type Context: RenderingContext;

    /// Open the rendering context for worker `worker_id`
    fn open_context(
        &mut self,
        worker_id: usize,
    ) -> impl Future<Output = Result<Self::Context, LaunchError>> + Send;

    /// Tear down the browser once all contexts are closed
    fn shutdown(self) -> impl Future<Output = ()> + Send;
}
