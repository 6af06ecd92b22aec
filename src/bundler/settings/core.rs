//! Core Settings struct and implementations.

use super::{ArchiveSettings, NsisSettings, ProductSettings, SdkSettings};
use crate::bundler::strategy::Strategy;
use std::path::{Path, PathBuf};

/// Main settings for one bundling run.
///
/// Constructed via [`SettingsBuilder`](super::SettingsBuilder). Holds the
/// product naming rules, tool configuration, the chosen strategy and any
/// explicit paths given on the command line.
///
/// # Examples
///
/// ```no_run
/// use installer_bundler::bundler::{ProductSettings, SettingsBuilder, Strategy};
///
/// # fn example() -> installer_bundler::bundler::Result<()> {
/// let settings = SettingsBuilder::new()
///     .product(ProductSettings::named("Product"))
///     .strategy(Strategy::Archive)
///     .app_installer("Product-4.85.1-win32-x64.exe")
///     .sdk_installer("winsdksetup.exe")
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct Settings {
    product: ProductSettings,
    sdk: SdkSettings,
    archive: ArchiveSettings,
    nsis: NsisSettings,
    strategy: Strategy,

    /// Explicit application installer; None means search.
    app_installer: Option<PathBuf>,

    /// Explicit SDK installer; None means search.
    sdk_installer: Option<PathBuf>,

    /// Explicit output path; None means derive from the application installer.
    output: Option<PathBuf>,

    /// Stub executable for self-running artifacts; None means this executable.
    stub: Option<PathBuf>,

    /// Ordered directories searched for installers.
    search_dirs: Vec<PathBuf>,

    /// Parent directory of bundling workspaces.
    temp_root: PathBuf,
}

impl Settings {
    /// Returns the product settings.
    pub fn product(&self) -> &ProductSettings {
        &self.product
    }

    /// Returns the SDK launch settings.
    pub fn sdk(&self) -> &SdkSettings {
        &self.sdk
    }

    /// Returns the 7-Zip settings.
    pub fn archive(&self) -> &ArchiveSettings {
        &self.archive
    }

    /// Returns the NSIS settings.
    pub fn nsis(&self) -> &NsisSettings {
        &self.nsis
    }

    /// Returns the requested packaging strategy.
    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Returns the explicit application installer, if any.
    pub fn app_installer(&self) -> Option<&Path> {
        self.app_installer.as_deref()
    }

    /// Returns the explicit SDK installer, if any.
    pub fn sdk_installer(&self) -> Option<&Path> {
        self.sdk_installer.as_deref()
    }

    /// Returns the explicit output path, if any.
    pub fn output(&self) -> Option<&Path> {
        self.output.as_deref()
    }

    /// Returns the configured stub executable, if any.
    pub fn stub(&self) -> Option<&Path> {
        self.stub.as_deref()
    }

    /// Returns the directories searched for installers, in priority order.
    pub fn search_dirs(&self) -> &[PathBuf] {
        &self.search_dirs
    }

    /// Returns the directory bundling workspaces are created in.
    pub fn temp_root(&self) -> &Path {
        &self.temp_root
    }

    /// Creates a new Settings instance (used by SettingsBuilder).
    #[allow(clippy::too_many_arguments)]
    pub(super) fn new(
        product: ProductSettings,
        sdk: SdkSettings,
        archive: ArchiveSettings,
        nsis: NsisSettings,
        strategy: Strategy,
        app_installer: Option<PathBuf>,
        sdk_installer: Option<PathBuf>,
        output: Option<PathBuf>,
        stub: Option<PathBuf>,
        search_dirs: Vec<PathBuf>,
        temp_root: PathBuf,
    ) -> Self {
        Self {
            product,
            sdk,
            archive,
            nsis,
            strategy,
            app_installer,
            sdk_installer,
            output,
            stub,
            search_dirs,
            temp_root,
        }
    }
}
