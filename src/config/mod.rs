//! Configuration file loading.
//!
//! An optional TOML file adjusts product naming, tool locations and NSIS
//! options. Lookup order:
//!
//! 1. `--config <PATH>` (must exist)
//! 2. `./installer-bundler.toml`
//! 3. `<config dir>/installer-bundler/config.toml`
//! 4. built-in defaults
//!
//! ```toml
//! [product]
//! name = "SCRM Champion"
//! app_pattern = "*SCRM*Champion*.exe"
//! sdk_pattern = "*winsdksetup*.exe"
//!
//! [sdk]
//! silent_args = ["/quiet", "/norestart"]
//!
//! [archive]
//! archiver = "7z"
//! sfx_module = "7zS.sfx"
//!
//! [nsis]
//! execution_level = "user"
//! ```

use crate::bundler::{
    ArchiveSettings, NsisSettings, ProductSettings, Result, SdkSettings, SettingsBuilder,
    error::{Error, ErrorExt},
};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// File name looked up in the working directory.
pub const LOCAL_CONFIG: &str = "installer-bundler.toml";

/// Parsed configuration file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    pub product: ProductSettings,
    pub sdk: SdkSettings,
    pub archive: ArchiveSettings,
    pub nsis: NsisSettings,
}

impl ConfigFile {
    /// Parses a configuration file.
    pub async fn load(path: &Path) -> Result<Self> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .fs_context("reading configuration file", path)?;
        let config = toml::from_str(&contents).map_err(|e| {
            Error::Context(format!("parsing {}", path.display()), Box::new(Error::from(e)))
        })?;
        log::info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Finds and loads the configuration following the lookup order.
    pub async fn discover(explicit: Option<&Path>) -> Result<Self> {
        let cwd = std::env::current_dir().map_err(Error::IoError)?;
        let user_dir = dirs::config_dir().map(|dir| dir.join("installer-bundler"));
        match config_path(explicit, &cwd, user_dir.as_deref())? {
            Some(path) => Self::load(&path).await,
            None => {
                log::debug!("No configuration file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Settings builder pre-filled with this configuration.
    pub fn into_builder(self) -> SettingsBuilder {
        SettingsBuilder::new()
            .product(self.product)
            .sdk(self.sdk)
            .archive(self.archive)
            .nsis(self.nsis)
    }
}

fn config_path(
    explicit: Option<&Path>,
    cwd: &Path,
    user_dir: Option<&Path>,
) -> Result<Option<PathBuf>> {
    if let Some(path) = explicit {
        if !path.is_file() {
            return Err(Error::MissingInput {
                what: format!("Configuration file {}", path.display()),
                hint: "Check the --config path.".into(),
            });
        }
        return Ok(Some(path.to_path_buf()));
    }

    Ok(std::iter::once(cwd.join(LOCAL_CONFIG))
        .chain(user_dir.map(|dir| dir.join("config.toml")))
        .find(|path| path.is_file()))
}
