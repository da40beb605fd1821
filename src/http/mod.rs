//! HTTP front end
//!
//! `GET /` reports health and counters; `POST /render` feeds the executor.

pub mod handlers;
pub mod types;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};

use crate::executor::LifecycleManager;
use crate::render::RenderBackend;

pub struct AppState<B: RenderBackend> {
    pub executor: Arc<LifecycleManager<B>>,
}

// Derived Clone would require `B: Clone`
impl<B: RenderBackend> Clone for AppState<B> {
    fn clone(&self) -> Self {
        Self {
            executor: Arc::clone(&self.executor),
        }
    }
}

pub fn router<B: RenderBackend>(executor: Arc<LifecycleManager<B>>) -> Router {
    Router::new()
        .route("/", get(handlers::health::<B>))
        .route("/render", post(handlers::render::<B>))
        .with_state(AppState { executor })
}
