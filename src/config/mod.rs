//! Configuration module for the render proxy
//!
//! Options come from CLI flags or their environment variables (clap `env`),
//! with defaults from `utils::constants`.

pub mod cli;
pub mod types;

pub use cli::Cli;
pub use types::{
    ConfigError, ExecutorConfig, HeaderPolicy, LogFormat, LoggingSettings, ServerConfig,
};
