//! Chrome discovery and launch
//!
//! The executable path is configured (or falls back to the platform default)
//! and verified before anything else happens. A missing binary is fatal: the
//! proxy must not come up with a pool it cannot fill.

use chromiumoxide::browser::{Browser, BrowserConfigBuilder, HeadlessMode};
use futures::StreamExt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::task::{self, JoinHandle};
use tracing::{error, info, trace};

use crate::render::LaunchError;
use crate::utils::constants::{CHROME_LAUNCH_ARGS, DEFAULT_CHROME_PATH};

/// Options for the single Chrome process shared by all workers
#[derive(Debug, Clone)]
pub struct BrowserLaunchOptions {
    /// Chrome/Chromium binary
    pub executable: PathBuf,
    /// Run without a visible window
    pub headless: bool,
    /// CDP request timeout; must exceed the navigation timeout
    pub request_timeout: Duration,
}

impl Default for BrowserLaunchOptions {
    fn default() -> Self {
        Self {
            executable: PathBuf::from(DEFAULT_CHROME_PATH),
            headless: true,
            request_timeout: Duration::from_secs(90),
        }
    }
}

/// Check that the configured Chrome binary exists
pub fn verify_executable(path: &Path) -> Result<PathBuf, LaunchError> {
    if path.is_file() {
        info!("Chrome executable found at: {}", path.display());
        Ok(path.to_path_buf())
    } else {
        error!("Chrome executable NOT found at: {}", path.display());
        Err(LaunchError::ExecutableNotFound(path.to_path_buf()))
    }
}

/// Launch Chrome with the proxy's flags and spawn its CDP event handler
///
/// The returned `JoinHandle` drives the websocket connection; it must be
/// aborted after the browser is closed.
pub async fn launch_browser(
    options: &BrowserLaunchOptions,
    user_data_dir: &Path,
) -> Result<(Browser, JoinHandle<()>), LaunchError> {
    let executable = verify_executable(&options.executable)?;

    let mut config_builder = BrowserConfigBuilder::default()
        .request_timeout(options.request_timeout)
        .user_data_dir(user_data_dir)
        .chrome_executable(executable);

    if options.headless {
        config_builder = config_builder.headless_mode(HeadlessMode::New);
    } else {
        config_builder = config_builder.with_head();
    }

    for arg in CHROME_LAUNCH_ARGS {
        config_builder = config_builder.arg(*arg);
    }

    let browser_config = config_builder
        .build()
        .map_err(|e| LaunchError::Browser(format!("invalid browser config: {e}")))?;

    info!(
        executable = %options.executable.display(),
        headless = options.headless,
        args = ?CHROME_LAUNCH_ARGS,
        "Starting Chrome"
    );
    let (browser, mut handler) = Browser::launch(browser_config)
        .await
        .map_err(|e| LaunchError::Browser(e.to_string()))?;

    let handler_task = task::spawn(async move {
        while let Some(event) = handler.next().await {
            if let Err(e) = event {
                let error_msg = e.to_string();

                // Chrome emits CDP events chromiumoxide cannot deserialize;
                // they are harmless and would otherwise flood the log.
                let is_benign_serialization_error = error_msg
                    .contains("data did not match any variant of untagged enum Message")
                    || error_msg.contains("Failed to deserialize WS response");

                if is_benign_serialization_error {
                    trace!("Suppressed benign CDP serialization error: {}", error_msg);
                } else {
                    error!("Browser handler error: {:?}", e);
                }
            }
        }
        info!("Browser handler task completed");
    });

    Ok((browser, handler_task))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_accepts_existing_file() {
        let file = tempfile::NamedTempFile::new().expect("temp file");
        let path = verify_executable(file.path()).expect("file exists");
        assert_eq!(path, file.path());
    }

    #[test]
    fn verify_rejects_missing_file() {
        let err = verify_executable(Path::new("/definitely/not/chrome")).unwrap_err();
        assert!(matches!(err, LaunchError::ExecutableNotFound(_)));
    }

    #[test]
    fn verify_rejects_directory() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert!(verify_executable(dir.path()).is_err());
    }

    #[tokio::test]
    async fn launch_fails_fast_without_binary() {
        let options = BrowserLaunchOptions {
            executable: PathBuf::from("/definitely/not/chrome"),
            ..BrowserLaunchOptions::default()
        };
        let dir = tempfile::tempdir().expect("tempdir");
        let err = launch_browser(&options, dir.path()).await.unwrap_err();
        assert!(matches!(err, LaunchError::ExecutableNotFound(_)));
    }

    #[test]
    fn default_options_are_headless() {
        let options = BrowserLaunchOptions::default();
        assert!(options.headless);
        assert_eq!(options.executable, PathBuf::from(DEFAULT_CHROME_PATH));
    }
}
