//! Packaging strategies.
//!
//! Each strategy turns the two located installers into one output artifact:
//!
//! - [`Strategy::Script`] - self-running stub with an embedded payload
//! - [`Strategy::Archive`] - 7-Zip SFX archive, falls back to `Script`
//! - [`Strategy::Nsis`] - NSIS wrapper installer
//! - [`Strategy::Repackage`] - NSIS installer built from the extracted application

pub(crate) mod archive;
pub(crate) mod nsis;
pub(crate) mod script;

use crate::{
    bundler::{
        Result,
        error::{Context, Error, ErrorExt},
        settings::Settings,
        utils::fs,
    },
    sequencer::BundleManifest,
};
use std::{
    fmt,
    path::{Path, PathBuf},
};

/// Name of the staging directory inside a bundling workspace.
pub(crate) const STAGE_DIR: &str = "bundle";

/// How the output artifact is produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum Strategy {
    /// Self-running executable that sequences the embedded installers.
    #[default]
    Script,
    /// 7-Zip self-extracting archive with a run script.
    Archive,
    /// NSIS wrapper installer compiled with makensis.
    Nsis,
    /// Direct NSIS installer built from the extracted application installer.
    Repackage,
}

impl Strategy {
    /// Short lowercase name, as accepted on the command line.
    pub fn short_name(&self) -> &'static str {
        match self {
            Strategy::Script => "script",
            Strategy::Archive => "archive",
            Strategy::Nsis => "nsis",
            Strategy::Repackage => "repackage",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

/// Resolved inputs of one bundling run.
#[derive(Debug, Clone)]
pub(crate) struct BundleInputs {
    pub app: PathBuf,
    pub sdk: PathBuf,
    pub output: PathBuf,
}

/// Executable the self-running artifact is built on.
pub(crate) fn resolve_stub(settings: &Settings) -> Result<PathBuf> {
    match settings.stub() {
        Some(stub) => {
            if !stub.is_file() {
                return Err(Error::MissingInput {
                    what: format!("Stub executable {}", stub.display()),
                    hint: "Pass an existing file with --stub.".into(),
                });
            }
            Ok(stub.to_path_buf())
        }
        None => std::env::current_exe()
            .map_err(Error::from)
            .context("locating the running executable"),
    }
}

/// Copies both installers and `bundle.json` into `<workspace>/bundle`.
///
/// Returns the staging directory.
pub(crate) async fn stage_bundle(
    workspace_root: &Path,
    settings: &Settings,
    inputs: &BundleInputs,
) -> Result<PathBuf> {
    let stage_dir = workspace_root.join(STAGE_DIR);
    tokio::fs::create_dir(&stage_dir)
        .await
        .fs_context("creating staging directory", &stage_dir)?;

    let manifest = BundleManifest::for_product(settings.product(), settings.sdk());
    log::info!("Copying installers to temporary directory...");
    fs::copy_file(&inputs.app, &stage_dir.join(&manifest.first.file_name)).await?;
    fs::copy_file(&inputs.sdk, &stage_dir.join(&manifest.second.file_name)).await?;
    manifest.write_to(&stage_dir).await?;

    Ok(stage_dir)
}
