//! Source installer resolution.
//!
//! Finds the application and SDK installers, either from explicit paths or
//! by matching file name patterns in an ordered list of directories.

mod naming;

pub use naming::{derive_output_path, extract_version};

use crate::bundler::{
    Result,
    error::{Context, Error},
};
use glob::{MatchOptions, Pattern};
use std::path::{Path, PathBuf};

/// The two installers a bundle is made of.
///
/// Either slot is `None` when nothing was given and nothing matched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceInstallers {
    /// Application installer, run attended.
    pub app: Option<PathBuf>,
    /// SDK installer, run unattended.
    pub sdk: Option<PathBuf>,
}

/// Pattern-based installer locator.
#[derive(Debug, Clone)]
pub struct Locator {
    search_dirs: Vec<PathBuf>,
}

impl Locator {
    /// Creates a locator searching `search_dirs` in order.
    ///
    /// Duplicate directories are searched once.
    pub fn new(search_dirs: &[PathBuf]) -> Self {
        let mut dirs: Vec<PathBuf> = Vec::with_capacity(search_dirs.len());
        for dir in search_dirs {
            if !dirs.contains(dir) {
                dirs.push(dir.clone());
            }
        }
        Self { search_dirs: dirs }
    }

    /// Directories searched, in priority order.
    pub fn search_dirs(&self) -> &[PathBuf] {
        &self.search_dirs
    }

    /// Resolves both installers.
    ///
    /// Explicit paths are taken as given; missing slots are searched with
    /// the matching pattern. Zero matches is not an error.
    pub fn locate(
        &self,
        app: Option<&Path>,
        app_pattern: &str,
        sdk: Option<&Path>,
        sdk_pattern: &str,
    ) -> Result<SourceInstallers> {
        let app = match app {
            Some(path) => Some(path.to_path_buf()),
            None => self.find(app_pattern)?,
        };
        let sdk = match sdk {
            Some(path) => Some(path.to_path_buf()),
            None => self.find(sdk_pattern)?,
        };
        Ok(SourceInstallers { app, sdk })
    }

    /// Returns the first file matching `pattern`.
    ///
    /// Directories are tried in order; within a directory the first match in
    /// glob order wins. Missing directories are skipped.
    pub fn find(&self, pattern: &str) -> Result<Option<PathBuf>> {
        // Validate once so a bad pattern is reported even when no directory exists.
        Pattern::new(pattern)?;

        let options = MatchOptions {
            case_sensitive: false,
            require_literal_separator: true,
            require_literal_leading_dot: false,
        };

        for dir in &self.search_dirs {
            if !dir.is_dir() {
                log::debug!("Skipping missing search directory {}", dir.display());
                continue;
            }

            let dir_str = dir
                .to_str()
                .with_context(|| format!("search directory is not valid UTF-8: {}", dir.display()))?;
            let full = format!("{}/{}", Pattern::escape(dir_str), pattern);

            let found = glob::glob_with(&full, options)?
                .filter_map(|entry| match entry {
                    Ok(path) => Some(path),
                    Err(e) => {
                        log::debug!("Unreadable entry while searching {}: {}", dir.display(), e);
                        None
                    }
                })
                .find(|path| path.is_file());

            if let Some(path) = found {
                log::info!("Found installer matching {}: {}", pattern, path.display());
                return Ok(Some(path));
            }
        }

        log::debug!("No file matching {} in {:?}", pattern, self.search_dirs);
        Ok(None)
    }
}

/// Default search directories: current directory, executable directory, its parent.
pub fn default_search_dirs() -> Result<Vec<PathBuf>> {
    let mut dirs = vec![std::env::current_dir().map_err(Error::IoError)?];

    match std::env::current_exe() {
        Ok(exe) => {
            if let Some(exe_dir) = exe.parent() {
                dirs.push(exe_dir.to_path_buf());
                if let Some(parent) = exe_dir.parent() {
                    dirs.push(parent.to_path_buf());
                }
            }
        }
        Err(e) => log::debug!("Could not determine executable directory: {}", e),
    }

    Ok(dirs)
}
