pub mod browser_profile;
pub mod browser_setup;
pub mod config;
pub mod executor;
pub mod http;
pub mod render;
pub mod telemetry;
pub mod utils;

pub use browser_profile::{BrowserProfile, create_unique_profile};
pub use browser_setup::{BrowserLaunchOptions, launch_browser, verify_executable};
pub use config::{Cli, ExecutorConfig, HeaderPolicy, ServerConfig};
pub use executor::{
    CompletionHandle, ExecutorStatus, LifecycleManager, LifecycleState, StatsSnapshot,
    StatsTracker, TaskQueue, WorkerPool,
};
pub use render::{
    ChromeBackend, ExecutionEngine, HeaderMap, LaunchError, Navigation, NavigationError,
    RenderBackend, RenderError, RenderOutcome, RenderRequest, RenderResult, RenderingContext,
    TaskFailure,
};
