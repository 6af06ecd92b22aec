//! Temporary workspace for one bundling or install run.
//!
//! A [`Workspace`] is a uniquely named directory under a temp root, by
//! default the system temp area.
//! It is removed when [`Workspace::close`] is called or, failing that, when
//! the value is dropped, so every exit path (errors and panics included)
//! cleans up. Removal failures are logged and never escalate.

use crate::bundler::{
    error::{ErrorExt, Result},
    utils::fs,
};
use std::path::{Path, PathBuf};

/// Prefix used for bundling workspaces.
pub const BUNDLE_PREFIX: &str = "bundler_";

/// Prefix used for install-time workspaces.
pub const INSTALL_PREFIX: &str = "installer_";

/// Prefix used by the NSIS strategy.
pub const NSIS_PREFIX: &str = "nsis_bundler_";

/// Prefix used while extracting an installer for repackaging.
pub const REPACKAGE_PREFIX: &str = "repackage_";

/// Exclusively owned temporary directory.
#[derive(Debug)]
pub struct Workspace {
    path: PathBuf,
    removed: bool,
}

impl Workspace {
    /// Creates `<parent>/<prefix><uuid>`.
    ///
    /// Fails rather than reusing a directory that already exists.
    pub async fn create_in(parent: &Path, prefix: &str) -> Result<Self> {
        let path = parent.join(format!("{}{}", prefix, uuid::Uuid::new_v4().simple()));
        tokio::fs::create_dir(&path)
            .await
            .fs_context("creating temporary directory", &path)?;
        log::info!("Created temporary directory: {}", path.display());
        Ok(Self {
            path,
            removed: false,
        })
    }

    /// Root of the workspace.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path of `name` inside the workspace.
    pub fn join(&self, name: impl AsRef<Path>) -> PathBuf {
        self.path.join(name)
    }

    /// Copies `source` into the workspace as `name`, keeping its metadata.
    pub async fn stage(&self, source: &Path, name: &str) -> Result<PathBuf> {
        let dest = self.join(name);
        fs::copy_file(source, &dest).await?;
        log::debug!("Staged {} as {}", source.display(), dest.display());
        Ok(dest)
    }

    /// Removes the workspace now.
    ///
    /// Failures are logged, not returned.
    pub async fn close(mut self) {
        log::info!("Cleaning up temporary directory: {}", self.path.display());
        match fs::remove_dir_all(&self.path).await {
            Ok(()) => log::debug!("Removed {}", self.path.display()),
            Err(e) => log::error!("Error cleaning up temporary directory: {}", e),
        }
        self.removed = true;
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        if self.removed {
            return;
        }
        // Drop cannot await; fall back to the blocking removal.
        match std::fs::remove_dir_all(&self.path) {
            Ok(()) => log::debug!("Removed {} on drop", self.path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => log::error!(
                "Error cleaning up temporary directory {}: {}",
                self.path.display(),
                e
            ),
        }
    }
}
