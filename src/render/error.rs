//! Error types for rendering and browser startup
//!
//! `RenderError` is what a caller observes through its completion handle.
//! `LaunchError` only ever happens while the process is starting and is fatal.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for a single render task
pub type RenderOutcome = Result<super::RenderResult, RenderError>;

/// Failure reported by the browser collaborator while loading a page
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct NavigationError(pub String);

impl NavigationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Why a render task did not produce a result
#[derive(Debug, Clone, Error)]
pub enum TaskFailure {
    /// Chrome reported a navigation or protocol error
    #[error("{0}")]
    Navigation(#[from] NavigationError),

    /// Navigation did not finish inside the configured window
    #[error("Navigation timeout of {} ms exceeded", .0.as_millis())]
    Timeout(Duration),

    /// The task was dropped before it could resolve
    #[error("Render task aborted: {0}")]
    Aborted(String),

    /// The request arrived after draining started
    #[error("Server is shutting down and no longer accepts render requests")]
    ShuttingDown,

    /// A task panicked or hit an otherwise unhandled condition
    #[error("Unexpected render failure: {0}")]
    Unexpected(String),
}

impl TaskFailure {
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }
}

/// A failed render, tagged with the URL the caller asked for
#[derive(Debug, Clone, Error)]
#[error("Could not get '{url}': {failure}")]
pub struct RenderError {
    pub url: String,
    #[source]
    pub failure: TaskFailure,
}

impl RenderError {
    pub fn new(url: impl Into<String>, failure: TaskFailure) -> Self {
        Self {
            url: url.into(),
            failure,
        }
    }

    /// Human-readable cause, without the URL prefix
    #[must_use]
    pub fn message(&self) -> String {
        self.failure.to_string()
    }
}

/// Errors raised while bringing the browser and worker pool up
#[derive(Debug, Error)]
pub enum LaunchError {
    /// Configured Chrome binary is missing
    #[error("Chrome executable not found at {}", .0.display())]
    ExecutableNotFound(PathBuf),

    /// Per-process profile directory could not be created
    #[error("Failed to create browser profile directory: {0}")]
    Profile(#[from] std::io::Error),

    /// Chrome failed to start or its config was rejected
    #[error("Failed to launch browser: {0}")]
    Browser(String),

    /// A worker's rendering context could not be opened
    #[error("Failed to open rendering context for worker {worker}: {message}")]
    Context { worker: usize, message: String },

    /// Executor settings are unusable
    #[error("Invalid executor configuration: {0}")]
    Config(String),
}
