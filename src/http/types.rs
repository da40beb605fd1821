//! JSON bodies of the HTTP surface

use serde::{Deserialize, Serialize};

use crate::executor::{ExecutorStatus, LifecycleState};
use crate::render::{HeaderMap, RenderError, RenderResult};
use crate::utils::constants::HEALTH_MESSAGE;

pub const URL_REQUIRED: &str = "URL parameter is required.";
pub const RENDER_FAILED: &str = "An error occurred while processing the URL.";

/// `POST /render` request body
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RenderBody {
    pub url: Option<String>,
    pub headers: Option<HeaderMap>,
}

impl RenderBody {
    /// The requested URL, treating an empty string as absent
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref().filter(|url| !url.is_empty())
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
    pub served_requests: u64,
    pub error_count: u64,
    pub queued_requests: usize,
    pub busy_workers: usize,
    pub max_concurrency: usize,
    pub state: LifecycleState,
}

impl From<ExecutorStatus> for HealthResponse {
    fn from(status: ExecutorStatus) -> Self {
        Self {
            status: "ok".to_string(),
            message: HEALTH_MESSAGE.to_string(),
            served_requests: status.stats.served_requests,
            error_count: status.stats.error_count,
            queued_requests: status.queued,
            busy_workers: status.busy_workers,
            max_concurrency: status.max_concurrency,
            state: status.state,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RenderResponse {
    pub page: String,
    pub status: u16,
    pub headers: HeaderMap,
}

impl From<RenderResult> for RenderResponse {
    fn from(result: RenderResult) -> Self {
        Self {
            page: result.body,
            status: result.status_code,
            headers: result.headers,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl ErrorResponse {
    pub fn bad_request(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: None,
            url: None,
        }
    }
}

impl From<&RenderError> for ErrorResponse {
    fn from(err: &RenderError) -> Self {
        Self {
            error: RENDER_FAILED.to_string(),
            message: Some(err.message()),
            url: Some(err.url.clone()),
        }
    }
}
