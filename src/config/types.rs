//! Typed configuration
//!
//! `ServerConfig` is built once from the CLI/environment and validated before
//! anything is launched. The executor only sees `ExecutorConfig`.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::level_filters::LevelFilter;

use super::cli::Cli;
use crate::browser_setup::BrowserLaunchOptions;
use crate::utils::constants::{
    DEFAULT_CHROME_PATH, DEFAULT_HOST, DEFAULT_MAX_CONCURRENCY, DEFAULT_NAVIGATION_TIMEOUT,
    DEFAULT_PORT, DEFAULT_STATS_INTERVAL,
};

/// What happens to caller-supplied headers once a task finishes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum HeaderPolicy {
    /// Every task starts from an empty extra-header set
    #[default]
    Reset,
    /// Headers stay installed on the worker's page and accumulate
    Retain,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Json,
    #[default]
    Compact,
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub format: LogFormat,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: LevelFilter::INFO,
            format: LogFormat::Compact,
        }
    }
}

/// Settings the executor is launched with
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    pub max_concurrency: usize,
    pub navigation_timeout: Duration,
    pub header_policy: HeaderPolicy,
    pub stats_interval: Duration,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            navigation_timeout: DEFAULT_NAVIGATION_TIMEOUT,
            header_policy: HeaderPolicy::Reset,
            stats_interval: DEFAULT_STATS_INTERVAL,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for `{field}`: {message}")]
    Invalid { field: &'static str, message: String },
}

impl ConfigError {
    fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub chrome_executable: PathBuf,
    pub headless: bool,
    pub executor: ExecutorConfig,
    pub logging: LoggingSettings,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            chrome_executable: PathBuf::from(DEFAULT_CHROME_PATH),
            headless: true,
            executor: ExecutorConfig::default(),
            logging: LoggingSettings::default(),
        }
    }
}

impl ServerConfig {
    /// Build and validate settings from parsed arguments
    pub fn from_cli(cli: Cli) -> Result<Self, ConfigError> {
        let level = LevelFilter::from_str(cli.log_level.trim())
            .map_err(|err| ConfigError::invalid("log_level", format!("failed to parse: {err}")))?;

        let config = Self {
            host: cli.host.trim().to_string(),
            port: cli.port,
            chrome_executable: cli.chrome_executable_path,
            headless: cli.headless,
            executor: ExecutorConfig {
                max_concurrency: cli.max_concurrency,
                navigation_timeout: Duration::from_secs(cli.navigation_timeout_secs),
                header_policy: cli.header_policy,
                stats_interval: Duration::from_secs(cli.stats_interval_secs),
            },
            logging: LoggingSettings {
                level,
                format: cli.log_format,
            },
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.executor.max_concurrency == 0 {
            return Err(ConfigError::invalid(
                "max_concurrency",
                "must be at least 1",
            ));
        }
        if self.executor.navigation_timeout.is_zero() {
            return Err(ConfigError::invalid(
                "navigation_timeout_secs",
                "must be greater than zero",
            ));
        }
        if self.executor.stats_interval.is_zero() {
            return Err(ConfigError::invalid(
                "stats_interval_secs",
                "must be greater than zero",
            ));
        }
        self.listen_addr()?;
        Ok(())
    }

    pub fn listen_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|err| ConfigError::invalid("host", format!("{err}")))
    }

    /// Chrome launch options; the CDP request timeout outlives the navigation timeout
    pub fn browser_options(&self) -> BrowserLaunchOptions {
        BrowserLaunchOptions {
            executable: self.chrome_executable.clone(),
            headless: self.headless,
            request_timeout: self.executor.navigation_timeout + Duration::from_secs(30),
        }
    }
}
