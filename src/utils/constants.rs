//! Shared configuration constants for the render proxy
//!
//! Default values used by the configuration layer and the browser launcher so
//! that the CLI, the environment and the tests agree on one set of numbers.

use std::time::Duration;

/// Default HTTP listen port
pub const DEFAULT_PORT: u16 = 3000;

/// Default HTTP listen address (all interfaces, container friendly)
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default worker pool size
///
/// One browser page at a time keeps memory flat on small dynos. Raise it via
/// `MAX_CONCURRENCY` when the host has headroom.
pub const DEFAULT_MAX_CONCURRENCY: usize = 1;

/// Hard ceiling on a single navigation, from `Page.navigate` to content capture
pub const DEFAULT_NAVIGATION_TIMEOUT: Duration = Duration::from_secs(60);

/// Cadence of the periodic "served / errors" log line
pub const DEFAULT_STATS_INTERVAL: Duration = Duration::from_secs(60);

/// Message returned by the health endpoint
pub const HEALTH_MESSAGE: &str = "Render proxy is running";

/// Prefix for per-process Chrome profile directories under the temp dir
pub const PROFILE_PREFIX: &str = "render_proxy_chrome";

/// Platform-standard Chrome location used when no path is configured
#[cfg(target_os = "windows")]
pub const DEFAULT_CHROME_PATH: &str = r"C:\Program Files\Google\Chrome\Application\chrome.exe";

/// Platform-standard Chrome location used when no path is configured
#[cfg(target_os = "macos")]
pub const DEFAULT_CHROME_PATH: &str = "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome";

/// Platform-standard Chrome location used when no path is configured
#[cfg(not(any(target_os = "windows", target_os = "macos")))]
pub const DEFAULT_CHROME_PATH: &str = "/usr/bin/google-chrome";

/// Chrome command-line flags applied to every launch
///
/// Tuned for constrained containers: no sandbox (usually running as root),
/// single process, no GPU, no background throttling of hidden tabs.
pub const CHROME_LAUNCH_ARGS: &[&str] = &[
    "--no-sandbox",
    "--disable-gpu",
    "--disable-dev-shm-usage",
    "--disable-setuid-sandbox",
    "--no-first-run",
    "--no-zygote",
    "--deterministic-fetch",
    "--disable-features=IsolateOrigins",
    "--disable-site-isolation-trials",
    "--single-process",
    "--memory-pressure-off",
    "--disable-background-timer-throttling",
    "--disable-backgrounding-occluded-windows",
    "--disable-renderer-backgrounding",
    "--disable-extensions",
    "--disable-plugins",
    "--disable-web-security",
    "--disable-features=VizDisplayCompositor",
];
