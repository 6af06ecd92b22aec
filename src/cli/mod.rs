//! Command line interface for the installer bundler.
//!
//! Two modes share one binary:
//!
//! - bundling (default): locate both installers and produce the artifact
//! - install time: run the bundled installers, either from a payload embedded
//!   in this executable or from `--sequence-dir`

mod args;
pub mod logging;
mod output;

pub use args::{Args, RuntimeConfig};
pub use output::OutputManager;

use crate::{
    bundler::{self, BundledArtifact, Bundler, ProductSettings, SettingsBuilder, Strategy},
    config::ConfigFile,
    error::Result,
    sequencer::{BundleManifest, Installation, ProcessRunner, payload},
};
use std::path::PathBuf;

/// Runs the embedded payload if this executable carries one.
///
/// Returns `None` for a plain bundler binary.
pub async fn run_embedded() -> Option<i32> {
    let exe = std::env::current_exe().ok()?;
    let location = match payload::locate(&exe) {
        Ok(Some(location)) => location,
        Ok(None) => return None,
        Err(e) => {
            eprintln!("Warning: could not inspect {}: {}", exe.display(), e);
            return None;
        }
    };

    let manifest = payload::read_manifest(&exe, location).await;
    let log_file = install_log_for(manifest);
    if let Err(e) = logging::init(Some(&log_file)) {
        eprintln!("Warning: could not open {}: {}", log_file.display(), e);
        let _ = logging::init(None);
    }

    Some(
        Installation::new(ProcessRunner)
            .from_payload(&exe, location)
            .await,
    )
}

/// Main CLI entry point
pub async fn run() -> Result<i32> {
    let args = Args::parse_args();

    let log_file = match (&args.log_file, &args.sequence_dir) {
        (Some(path), _) => Some(path.clone()),
        (None, Some(dir)) => Some(install_log_for(BundleManifest::read_from(dir).await)),
        (None, None) => None,
    };
    logging::init(log_file.as_deref())?;

    args.validate()?;
    let config = RuntimeConfig::from(&args);

    if let Some(dir) = &args.sequence_dir {
        return Ok(Installation::new(ProcessRunner).from_dir(dir).await);
    }

    let settings = settings_from(&args).await?;
    let strategy = settings.strategy();
    if args.interactive_sdk && matches!(strategy, Strategy::Script | Strategy::Archive) {
        config.warn("--interactive-sdk only applies to the nsis and repackage strategies")?;
    }

    config.section(&format!("Bundling {}", settings.product().name))?;
    let artifact = Bundler::new(settings).bundle().await?;
    report(&config, &artifact, strategy)?;

    Ok(0)
}

/// Install log named after the bundled product, or the default product when
/// the manifest can't be read.
fn install_log_for(manifest: bundler::Result<BundleManifest>) -> PathBuf {
    let product = manifest
        .map(|manifest| manifest.product)
        .unwrap_or_else(|_| ProductSettings::default().name);
    logging::install_log_path(&product)
}

/// Merges the configuration file with command line overrides.
async fn settings_from(args: &Args) -> Result<bundler::Settings> {
    let mut file = ConfigFile::discover(args.config.as_deref()).await?;
    if args.interactive_sdk {
        file.sdk.silent = false;
    }

    let mut builder: SettingsBuilder = file.into_builder();
    if let Some(strategy) = args.effective_strategy() {
        builder = builder.strategy(strategy);
    }
    if let Some(path) = &args.app_installer {
        builder = builder.app_installer(path);
    }
    if let Some(path) = &args.sdk_installer {
        builder = builder.sdk_installer(path);
    }
    if let Some(path) = &args.output {
        builder = builder.output(path);
    }
    if let Some(path) = &args.stub {
        builder = builder.stub(path);
    }

    Ok(builder.build()?)
}

fn report(
    config: &RuntimeConfig,
    artifact: &BundledArtifact,
    requested: Strategy,
) -> std::io::Result<()> {
    if artifact.strategy != requested {
        config.warn(&format!(
            "{} strategy failed, bundle was created with the {} strategy",
            requested, artifact.strategy
        ))?;
    }
    config.success(&format!(
        "Combined installer created: {}",
        artifact.path.display()
    ))?;
    config.indent(&format!("Strategy: {}", artifact.strategy))?;
    config.indent(&format!("Size: {} bytes", artifact.size))?;
    config.indent(&format!("SHA256: {}", artifact.checksum))
}
