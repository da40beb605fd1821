//! Request and result types flowing through the executor

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

/// Header name to value mapping supplied by callers and returned by Chrome
///
/// A `BTreeMap` keeps application order deterministic across runs.
pub type HeaderMap = BTreeMap<String, String>;

/// A single render job as accepted from a caller
///
/// Immutable once built: the executor only ever reads it.
#[derive(Debug, Clone)]
pub struct RenderRequest {
    url: String,
    headers: HeaderMap,
    submitted_at: Instant,
}

impl RenderRequest {
    /// Create a request for `url` with no extra headers
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            headers: HeaderMap::new(),
            submitted_at: Instant::now(),
        }
    }

    /// Attach caller-supplied HTTP headers
    #[must_use]
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn submitted_at(&self) -> Instant {
        self.submitted_at
    }

    /// Time spent between intake and now
    pub fn queued_for(&self) -> Duration {
        self.submitted_at.elapsed()
    }
}

/// Outcome of a successful render
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderResult {
    /// Serialized DOM after client-side scripts ran
    pub body: String,
    /// HTTP status of the main navigation response
    pub status_code: u16,
    /// Headers of the main navigation response
    pub headers: HeaderMap,
    /// URL the page ended up on after redirects
    pub final_url: String,
    /// Wall-clock time from navigation start to content capture
    pub duration: Duration,
}

impl RenderResult {
    #[must_use]
    pub fn duration_ms(&self) -> u128 {
        self.duration.as_millis()
    }
}
