//! Install-time entry points: from an embedded payload or a staged directory.

use super::{
    BundleManifest, InstallerRunner, Invocation, SequenceOutcome, Sequencer,
    payload::{self, PayloadLocation},
};
use crate::bundler::{
    Result,
    workspace::{INSTALL_PREFIX, Workspace},
};
use std::path::{Path, PathBuf};

/// Where the bundled installers come from.
#[derive(Debug, Clone, Copy)]
enum BundleSource<'a> {
    Payload(&'a Path, PayloadLocation),
    Dir(&'a Path),
}

/// One install run over a bundle.
///
/// Copies the bundled installers into a fresh workspace, sequences them and
/// removes the workspace again. Every error is logged and turned into exit
/// status 1.
#[derive(Debug)]
pub struct Installation<R> {
    runner: R,
    temp_root: PathBuf,
}

impl<R: InstallerRunner> Installation<R> {
    pub fn new(runner: R) -> Self {
        Self {
            runner,
            temp_root: std::env::temp_dir(),
        }
    }

    /// Parent directory of the install workspace.
    ///
    /// Default: the system temp directory
    pub fn temp_root(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_root = dir.into();
        self
    }

    /// Installs from the payload embedded in `artifact`.
    pub async fn from_payload(&self, artifact: &Path, location: PayloadLocation) -> i32 {
        log::info!("Installing from bundle {}", artifact.display());
        self.install(BundleSource::Payload(artifact, location)).await
    }

    /// Installs from a directory holding `bundle.json` and both installers.
    pub async fn from_dir(&self, dir: &Path) -> i32 {
        log::info!("Installing from staged directory {}", dir.display());
        self.install(BundleSource::Dir(dir)).await
    }

    async fn install(&self, source: BundleSource<'_>) -> i32 {
        let workspace = match Workspace::create_in(&self.temp_root, INSTALL_PREFIX).await {
            Ok(workspace) => workspace,
            Err(e) => {
                log::error!("Error during installation: {}", e);
                return 1;
            }
        };

        let code = match self.run_in(&workspace, source).await {
            Ok(outcome) => outcome.exit_code(),
            Err(e) => {
                log::error!("Error during installation: {}", e);
                1
            }
        };

        workspace.close().await;
        code
    }

    async fn run_in(
        &self,
        workspace: &Workspace,
        source: BundleSource<'_>,
    ) -> Result<SequenceOutcome> {
        let manifest = match source {
            BundleSource::Payload(artifact, location) => {
                payload::unpack(artifact, location, workspace.path()).await?;
                BundleManifest::read_from(workspace.path()).await?
            }
            BundleSource::Dir(dir) => {
                let manifest = BundleManifest::read_from(dir).await?;
                for entry in [&manifest.first, &manifest.second] {
                    workspace
                        .stage(&dir.join(&entry.file_name), &entry.file_name)
                        .await?;
                }
                manifest
            }
        };

        let first = Invocation {
            program: workspace.join(&manifest.first.file_name),
            args: manifest.first.args.clone(),
        };
        let second = Invocation {
            program: workspace.join(&manifest.second.file_name),
            args: manifest.second.args.clone(),
        };

        let outcome = Sequencer::new(&self.runner).run(&first, &second).await;
        match outcome.exit_code() {
            0 => log::info!("{} installation completed", manifest.product),
            _ => log::error!("{} installation failed", manifest.product),
        }
        Ok(outcome)
    }
}
