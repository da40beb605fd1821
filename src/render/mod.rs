//! Render data model, browser seam and per-task execution

pub mod chrome;
pub mod context;
pub mod engine;
pub mod error;
pub mod page_timeout;
pub mod types;

pub use chrome::{ChromeBackend, ChromePage};
pub use context::{Navigation, RenderBackend, RenderingContext};
pub use engine::ExecutionEngine;
pub use error::{LaunchError, NavigationError, RenderError, RenderOutcome, TaskFailure};
pub use page_timeout::with_navigation_timeout;
pub use types::{HeaderMap, RenderRequest, RenderResult};
