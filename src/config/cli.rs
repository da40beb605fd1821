//! Command-line and environment surface

use std::path::PathBuf;

use clap::{ArgAction, Parser, builder::BoolishValueParser};

use super::types::{HeaderPolicy, LogFormat};
use crate::utils::constants::{
    DEFAULT_CHROME_PATH, DEFAULT_HOST, DEFAULT_MAX_CONCURRENCY, DEFAULT_NAVIGATION_TIMEOUT,
    DEFAULT_PORT, DEFAULT_STATS_INTERVAL,
};

/// Every option is also read from the environment variable named beside it.
#[derive(Debug, Clone, Parser)]
#[command(name = "render-proxy", version, about = "Headless Chrome rendering proxy")]
pub struct Cli {
    /// HTTP listen port.
    #[arg(long, env = "PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// HTTP listen address.
    #[arg(long, env = "HOST", default_value = DEFAULT_HOST)]
    pub host: String,

    /// Number of browser workers (concurrency ceiling).
    #[arg(long, env = "MAX_CONCURRENCY", default_value_t = DEFAULT_MAX_CONCURRENCY)]
    pub max_concurrency: usize,

    /// Path to the Chrome/Chromium executable.
    #[arg(
        long,
        env = "CHROME_EXECUTABLE_PATH",
        value_name = "PATH",
        default_value = DEFAULT_CHROME_PATH
    )]
    pub chrome_executable_path: PathBuf,

    /// Per-request navigation timeout in seconds.
    #[arg(
        long,
        env = "NAVIGATION_TIMEOUT_SECS",
        value_name = "SECONDS",
        default_value_t = DEFAULT_NAVIGATION_TIMEOUT.as_secs()
    )]
    pub navigation_timeout_secs: u64,

    /// Seconds between periodic stats log lines.
    #[arg(
        long,
        env = "STATS_INTERVAL_SECS",
        value_name = "SECONDS",
        default_value_t = DEFAULT_STATS_INTERVAL.as_secs()
    )]
    pub stats_interval_secs: u64,

    /// Whether caller headers persist on a worker across requests.
    #[arg(long, env = "HEADER_POLICY", value_enum, default_value_t = HeaderPolicy::Reset)]
    pub header_policy: HeaderPolicy,

    /// Run Chrome without a window.
    #[arg(
        long,
        env = "HEADLESS",
        value_name = "BOOL",
        default_value = "true",
        action = ArgAction::Set,
        value_parser = BoolishValueParser::new()
    )]
    pub headless: bool,

    /// Base log level (trace|debug|info|warn|error); RUST_LOG takes precedence.
    #[arg(long, env = "LOG_LEVEL", value_name = "LEVEL", default_value = "info")]
    pub log_level: String,

    /// Log output format.
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,
}
