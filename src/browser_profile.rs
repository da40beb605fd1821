//! Per-process Chrome profile directory
//!
//! Each launch gets a UUID-named user data dir so two proxies on one host never
//! fight over Chrome's SingletonLock. The directory is removed on drop.

use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// RAII wrapper for a Chrome profile directory
#[derive(Debug)]
pub struct BrowserProfile {
    path: PathBuf,
    cleanup_on_drop: bool,
}

impl BrowserProfile {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Remove the directory now
    ///
    /// Must run after Chrome exited, otherwise locked files stay behind.
    pub fn cleanup(&mut self) {
        if !self.cleanup_on_drop {
            return;
        }
        self.cleanup_on_drop = false;
        if self.path.exists() {
            info!("Removing browser profile directory: {}", self.path.display());
            if let Err(e) = std::fs::remove_dir_all(&self.path) {
                warn!(
                    "Failed to remove profile directory {}: {}",
                    self.path.display(),
                    e
                );
            }
        }
    }
}

impl Drop for BrowserProfile {
    fn drop(&mut self) {
        self.cleanup();
    }
}

/// Create `<temp>/<prefix>_<uuid>` for a fresh Chrome profile
///
/// `create_dir` rather than `create_dir_all` so a collision fails loudly.
pub fn create_unique_profile(prefix: &str) -> io::Result<BrowserProfile> {
    create_unique_profile_in(&std::env::temp_dir(), prefix)
}

pub(crate) fn create_unique_profile_in(parent: &Path, prefix: &str) -> io::Result<BrowserProfile> {
    let path = parent.join(format!("{}_{}", prefix, Uuid::new_v4()));
    debug!("Creating browser profile: {}", path.display());
    std::fs::create_dir(&path)?;
    Ok(BrowserProfile {
        path,
        cleanup_on_drop: true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_is_removed_on_drop() {
        let parent = tempfile::tempdir().expect("tempdir");
        let profile = create_unique_profile_in(parent.path(), "test_profile").expect("create");
        let path = profile.path().to_path_buf();
        assert!(path.exists());
        assert!(path.file_name().unwrap().to_string_lossy().starts_with("test_profile_"));

        drop(profile);
        assert!(!path.exists());
    }

    #[test]
    fn explicit_cleanup_runs_once() {
        let parent = tempfile::tempdir().expect("tempdir");
        let mut profile = create_unique_profile_in(parent.path(), "early").expect("create");
        let path = profile.path().to_path_buf();
        profile.cleanup();
        assert!(!path.exists());

        std::fs::create_dir(&path).expect("recreate");
        drop(profile);
        assert!(path.exists());
    }

    #[test]
    fn profiles_are_unique() {
        let parent = tempfile::tempdir().expect("tempdir");
        let a = create_unique_profile_in(parent.path(), "dup").expect("create a");
        let b = create_unique_profile_in(parent.path(), "dup").expect("create b");
        assert_ne!(a.path(), b.path());
    }
}
