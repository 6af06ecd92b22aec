//! Bundle manifest staged next to the installers.
//!
//! Tells the install-time sequencer which staged file is run first, which
//! second, and with which arguments.

use crate::bundler::{
    Result,
    error::{Error, ErrorExt},
    settings::{ProductSettings, SdkSettings},
};
use serde::{Deserialize, Serialize};
use std::path::{Component, Path};

/// File name of the manifest inside a staged directory or payload.
pub const MANIFEST_FILE: &str = "bundle.json";

/// One installer inside a bundle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallerEntry {
    /// Staged file name, relative to the bundle root.
    pub file_name: String,
    /// Arguments appended when launching.
    #[serde(default)]
    pub args: Vec<String>,
}

/// What a bundle contains and how to run it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundleManifest {
    /// Product name, used for log file naming.
    pub product: String,
    /// Installer run attended; gates the second.
    pub first: InstallerEntry,
    /// Installer run after the first succeeded.
    pub second: InstallerEntry,
}

impl BundleManifest {
    /// Manifest for an application installer followed by the SDK installer.
    ///
    /// The SDK always gets its silent arguments here; only the NSIS
    /// strategies honour [`SdkSettings::silent`].
    pub fn for_product(product: &ProductSettings, sdk: &SdkSettings) -> Self {
        Self {
            product: product.name.clone(),
            first: InstallerEntry {
                file_name: product.app_staged_name.clone(),
                args: Vec::new(),
            },
            second: InstallerEntry {
                file_name: product.sdk_staged_name.clone(),
                args: sdk.silent_args.clone(),
            },
        }
    }

    /// Rejects file names that would escape the bundle root.
    pub fn validate(&self) -> Result<()> {
        for entry in [&self.first, &self.second] {
            let mut components = Path::new(&entry.file_name).components();
            let plain = matches!(
                (components.next(), components.next()),
                (Some(Component::Normal(_)), None)
            );
            if !plain {
                return Err(Error::Payload(format!(
                    "installer file name must be a plain file name: {:?}",
                    entry.file_name
                )));
            }
        }
        if self.first.file_name == self.second.file_name {
            return Err(Error::Payload(format!(
                "both installers are staged as {:?}",
                self.first.file_name
            )));
        }
        Ok(())
    }

    /// Reads and validates `<dir>/bundle.json`.
    pub async fn read_from(dir: &Path) -> Result<Self> {
        let path = dir.join(MANIFEST_FILE);
        let contents = tokio::fs::read_to_string(&path)
            .await
            .fs_context("reading bundle manifest", &path)?;
        let manifest: Self = serde_json::from_str(&contents)?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Writes `<dir>/bundle.json`.
    pub async fn write_to(&self, dir: &Path) -> Result<()> {
        self.validate()?;
        let path = dir.join(MANIFEST_FILE);
        let contents = serde_json::to_string_pretty(self)?;
        tokio::fs::write(&path, contents)
            .await
            .fs_context("writing bundle manifest", &path)
    }
}
