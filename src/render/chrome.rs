//! chromiumoxide implementation of the browser collaborator
//!
//! One Chrome process per proxy, one tab per worker. Tabs are opened on
//! `about:blank` at launch and live until shutdown.

use chromiumoxide::browser::Browser;
use chromiumoxide::cdp::browser_protocol::network::{Headers, SetExtraHttpHeadersParams};
use chromiumoxide::cdp::browser_protocol::page::StopLoadingParams;
use chromiumoxide::page::Page;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::context::{Navigation, RenderBackend, RenderingContext};
use super::error::{LaunchError, NavigationError};
use super::types::HeaderMap;
use crate::browser_profile::{BrowserProfile, create_unique_profile};
use crate::browser_setup::{BrowserLaunchOptions, launch_browser};
use crate::utils::constants::PROFILE_PREFIX;

/// The shared Chrome process plus its handler task and profile directory
pub struct ChromeBackend {
    browser: Browser,
    handler: JoinHandle<()>,
    profile: BrowserProfile,
}

impl ChromeBackend {
    /// Create a profile directory and launch Chrome into it
    pub async fn launch(options: &BrowserLaunchOptions) -> Result<Self, LaunchError> {
        let profile = create_unique_profile(PROFILE_PREFIX)?;
        let (browser, handler) = launch_browser(options, profile.path()).await?;
        info!("Chrome started successfully");
        Ok(Self {
            browser,
            handler,
            profile,
        })
    }
}

impl RenderBackend for ChromeBackend {
    type Context = ChromePage;

    async fn open_context(&mut self, worker_id: usize) -> Result<ChromePage, LaunchError> {
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .map_err(|e| LaunchError::Context {
                worker: worker_id,
                message: e.to_string(),
            })?;
        debug!("Opened tab for worker {}", worker_id);
        Ok(ChromePage { page, worker_id })
    }

    async fn shutdown(mut self) {
        info!("Closing Chrome");
        if let Err(e) = self.browser.close().await {
            warn!("Failed to close browser cleanly: {}", e);
        }
        // Wait for the process to exit so the profile directory is unlocked
        if let Err(e) = self.browser.wait().await {
            warn!("Failed to wait for browser exit: {}", e);
        }
        self.handler.abort();
        self.profile.cleanup();
    }
}

/// A worker's tab
pub struct ChromePage {
    page: Page,
    worker_id: usize,
}

impl RenderingContext for ChromePage {
    async fn apply_headers(&mut self, headers: &HeaderMap) -> Result<(), NavigationError> {
        let value = serde_json::to_value(headers)
            .map_err(|e| NavigationError::new(format!("invalid headers: {e}")))?;
        self.page
            .execute(SetExtraHttpHeadersParams::new(Headers::new(value)))
            .await
            .map_err(|e| NavigationError::new(e.to_string()))?;
        Ok(())
    }

    async fn navigate(&mut self, url: &str) -> Result<Navigation, NavigationError> {
        self.page
            .goto(url)
            .await
            .map_err(|e| NavigationError::new(e.to_string()))?;

        let request = self
            .page
            .wait_for_navigation_response()
            .await
            .map_err(|e| NavigationError::new(e.to_string()))?;

        let response = request
            .as_ref()
            .and_then(|request| request.response.as_ref())
            .ok_or_else(|| NavigationError::new(format!("No response received for {url}")))?;

        let status_code = u16::try_from(response.status).unwrap_or_default();
        let headers = header_map(&response.headers);

        let final_url = match self.page.url().await {
            Ok(Some(current)) => current,
            Ok(None) => url.to_string(),
            Err(e) => return Err(NavigationError::new(e.to_string())),
        };

        let content = self
            .page
            .content()
            .await
            .map_err(|e| NavigationError::new(e.to_string()))?;

        Ok(Navigation {
            status_code,
            final_url,
            content,
            headers,
        })
    }

    async fn stop_loading(&mut self) {
        if let Err(e) = self.page.execute(StopLoadingParams::default()).await {
            warn!("Worker {} failed to stop loading: {}", self.worker_id, e);
        }
    }

    async fn close(self) {
        let worker_id = self.worker_id;
        if let Err(e) = self.page.close().await {
            warn!("Failed to close tab for worker {}: {}", worker_id, e);
        }
    }
}

/// Flatten CDP response headers into a string map
///
/// CDP sends `{"name": "value"}`; repeated headers arrive joined by newlines.
fn header_map(headers: &Headers) -> HeaderMap {
    headers
        .inner()
        .as_object()
        .map(|object| {
            object
                .iter()
                .map(|(name, value)| {
                    let value = value
                        .as_str()
                        .map(str::to_string)
                        .unwrap_or_else(|| value.to_string());
                    (name.to_lowercase(), value)
                })
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_map_lowercases_and_stringifies() {
        let headers = Headers::new(serde_json::json!({
            "Content-Type": "text/html",
            "X-Count": 3,
        }));
        let map = header_map(&headers);
        assert_eq!(map.get("content-type").map(String::as_str), Some("text/html"));
        assert_eq!(map.get("x-count").map(String::as_str), Some("3"));
    }

    #[test]
    fn header_map_ignores_non_objects() {
        let headers = Headers::new(serde_json::Value::Null);
        assert!(header_map(&headers).is_empty());
    }
}
