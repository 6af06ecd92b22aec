//! Builder for constructing Settings.

use super::{ArchiveSettings, NsisSettings, ProductSettings, SdkSettings, Settings};
use crate::bundler::strategy::Strategy;
use std::path::{Path, PathBuf};

/// Builder for constructing [`Settings`].
///
/// Every field has a default; `build` only fails when the search
/// directories cannot be determined.
#[derive(Default)]
pub struct SettingsBuilder {
    product: ProductSettings,
    sdk: SdkSettings,
    archive: ArchiveSettings,
    nsis: NsisSettings,
    strategy: Strategy,
    app_installer: Option<PathBuf>,
    sdk_installer: Option<PathBuf>,
    output: Option<PathBuf>,
    stub: Option<PathBuf>,
    search_dirs: Option<Vec<PathBuf>>,
    temp_root: Option<PathBuf>,
}

impl SettingsBuilder {
    /// Creates a new settings builder.
    pub fn new() -> Self {
        Default::default()
    }

    /// Sets product naming rules.
    ///
    /// Default: [`ProductSettings::default`]
    pub fn product(mut self, product: ProductSettings) -> Self {
        self.product = product;
        self
    }

    /// Sets how the SDK installer is launched.
    pub fn sdk(mut self, sdk: SdkSettings) -> Self {
        self.sdk = sdk;
        self
    }

    /// Sets 7-Zip configuration.
    pub fn archive(mut self, archive: ArchiveSettings) -> Self {
        self.archive = archive;
        self
    }

    /// Sets NSIS configuration.
    pub fn nsis(mut self, nsis: NsisSettings) -> Self {
        self.nsis = nsis;
        self
    }

    /// Sets the packaging strategy.
    ///
    /// Default: [`Strategy::Script`]
    pub fn strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Sets the application installer explicitly instead of searching.
    pub fn app_installer<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.app_installer = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the SDK installer explicitly instead of searching.
    pub fn sdk_installer<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.sdk_installer = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the output artifact path.
    ///
    /// Default: derived from the application installer name
    pub fn output<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.output = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the stub executable used for self-running artifacts.
    ///
    /// Default: the running executable
    pub fn stub<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.stub = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the directories searched for installers.
    ///
    /// Default: [`crate::source::default_search_dirs`]
    pub fn search_dirs(mut self, dirs: Vec<PathBuf>) -> Self {
        self.search_dirs = Some(dirs);
        self
    }

    /// Sets the parent directory of bundling workspaces.
    ///
    /// Default: the system temp directory
    pub fn temp_root<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.temp_root = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Builds the settings.
    pub fn build(self) -> crate::bundler::Result<Settings> {
        let search_dirs = match self.search_dirs {
            Some(dirs) => dirs,
            None => crate::source::default_search_dirs()?,
        };

        Ok(Settings::new(
            self.product,
            self.sdk,
            self.archive,
            self.nsis,
            self.strategy,
            self.app_installer,
            self.sdk_installer,
            self.output,
            self.stub,
            search_dirs,
            self.temp_root.unwrap_or_else(std::env::temp_dir),
        ))
    }
}
