//! Main bundler orchestration and coordination.

use crate::{
    bundler::{
        BundledArtifact, Error, Result, Settings,
        error::ErrorExt,
        strategy::{self, BundleInputs, Strategy},
    },
    source::{self, Locator},
};
use path_absolutize::Absolutize;
use std::path::{Path, PathBuf};

use super::checksum::calculate_sha256;

/// Main bundler orchestrator.
///
/// Resolves the installers and the output path for one run, then delegates
/// to the strategy selected in [`Settings`].
///
/// # Examples
///
/// ```no_run
/// use installer_bundler::bundler::{Bundler, Settings};
///
/// # async fn example(settings: Settings) -> installer_bundler::bundler::Result<()> {
/// let artifact = Bundler::new(settings).bundle().await?;
/// println!("SHA256: {}", artifact.checksum);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Bundler {
    settings: Settings,
}

impl Bundler {
    /// Creates a new bundler with the given settings.
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    /// Returns a reference to the bundler settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Produces the combined installer.
    ///
    /// # Errors
    ///
    /// - [`Error::MissingInput`] when either installer can't be found
    /// - tool errors from the `nsis` and `repackage` strategies
    /// - I/O errors from any strategy
    pub async fn bundle(&self) -> Result<BundledArtifact> {
        let inputs = self.resolve_inputs()?;
        log::info!("Application installer: {}", inputs.app.display());
        log::info!("SDK installer: {}", inputs.sdk.display());
        log::info!("Output: {}", inputs.output.display());

        let strategy = self.run_strategy(&inputs).await?;

        let metadata = tokio::fs::metadata(&inputs.output)
            .await
            .fs_context("reading artifact metadata", &inputs.output)?;
        let checksum = calculate_sha256(&inputs.output).await?;

        Ok(BundledArtifact {
            strategy,
            path: inputs.output,
            size: metadata.len(),
            checksum,
        })
    }

    /// Runs the selected strategy and returns the one that produced the output.
    async fn run_strategy(&self, inputs: &BundleInputs) -> Result<Strategy> {
        let settings = &self.settings;
        log::info!("Bundling with strategy: {}", settings.strategy());

        match settings.strategy() {
            Strategy::Script => strategy::script::bundle(settings, inputs).await?,
            Strategy::Archive => match strategy::archive::bundle(settings, inputs).await {
                Ok(()) => {}
                Err(e) if e.is_tool_failure() => {
                    log::warn!("Error creating 7z archive: {}", e);
                    log::info!("Falling back to the {} strategy", Strategy::Script);
                    strategy::script::bundle(settings, inputs).await?;
                    return Ok(Strategy::Script);
                }
                Err(e) => return Err(e),
            },
            Strategy::Nsis => strategy::nsis::bundle_wrapper(settings, inputs).await?,
            Strategy::Repackage => strategy::nsis::bundle_repackage(settings, inputs).await?,
        }

        Ok(settings.strategy())
    }

    /// Locates both installers and settles the output path.
    fn resolve_inputs(&self) -> Result<BundleInputs> {
        let settings = &self.settings;
        let product = settings.product();

        let found = Locator::new(settings.search_dirs()).locate(
            settings.app_installer(),
            &product.app_pattern,
            settings.sdk_installer(),
            &product.sdk_pattern,
        )?;

        let app = require(
            found.app,
            &format!("{} installer", product.name),
            "Please specify it with --app-installer.",
        )?;
        let sdk = require(
            found.sdk,
            "Windows SDK installer",
            "Please specify it with --sdk-installer.",
        )?;

        let output = match settings.output() {
            Some(output) => output.to_path_buf(),
            None => source::derive_output_path(&app, product)?,
        };

        Ok(BundleInputs {
            app: absolute(&app)?,
            sdk: absolute(&sdk)?,
            output: absolute(&output)?,
        })
    }
}

/// Turns an absent or nonexistent installer into [`Error::MissingInput`].
fn require(path: Option<PathBuf>, what: &str, hint: &str) -> Result<PathBuf> {
    match path {
        Some(path) if path.is_file() => Ok(path),
        Some(path) => Err(Error::MissingInput {
            what: format!("{} {}", what, path.display()),
            hint: hint.to_string(),
        }),
        None => Err(Error::MissingInput {
            what: what.to_string(),
            hint: hint.to_string(),
        }),
    }
}

fn absolute(path: &Path) -> Result<PathBuf> {
    Ok(path
        .absolutize()
        .fs_context("resolving absolute path", path)?
        .into_owned())
}
