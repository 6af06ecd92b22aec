//! NSIS installers.
//!
//! Two flavours, both compiled with makensis:
//!
//! - wrapper: embeds both installers and sequences them at install time
//! - direct: built from the extracted application files plus the SDK installer
//!
//! # Module Organization
//!
//! - `template` - NSI script templates
//! - `toolset` - makensis lookup
//! - `script` - NSI script generation from templates
//! - `build` - makensis execution
//! - `extract` - application installer extraction for the direct flavour
//! - `utils` - settings mappings and BOM writing

mod build;
mod extract;
mod script;
mod template;
mod toolset;
mod utils;

use super::BundleInputs;
use crate::bundler::{
    Result,
    settings::Settings,
    workspace::{NSIS_PREFIX, REPACKAGE_PREFIX, Workspace},
};

/// Builds the wrapper installer at `inputs.output`.
///
/// Missing makensis or a failed compile is returned as is; there is no fallback.
pub async fn bundle_wrapper(settings: &Settings, inputs: &BundleInputs) -> Result<()> {
    log::info!("Building NSIS installer for {}", settings.product().name);
    let makensis = toolset::get_nsis_compiler(settings).await?;

    let workspace = Workspace::create_in(settings.temp_root(), NSIS_PREFIX).await?;
    let result: Result<()> = async {
        let product = settings.product();
        let app = workspace.stage(&inputs.app, &product.app_staged_name).await?;
        let sdk = workspace.stage(&inputs.sdk, &product.sdk_staged_name).await?;

        let content = script::render_wrapper(
            settings,
            &script::WrapperInputs {
                app: &app,
                sdk: &sdk,
                output: &inputs.output,
            },
        )?;
        let nsi_path =
            script::write_script(workspace.path(), "wrapper_installer.nsi", &content).await?;

        build::run_makensis(&makensis, &nsi_path, &inputs.output).await?;
        log::info!("Created NSIS installer: {}", inputs.output.display());
        Ok(())
    }
    .await;

    workspace.close().await;
    result
}

/// Builds the direct installer at `inputs.output` from the extracted
/// application installer.
pub async fn bundle_repackage(settings: &Settings, inputs: &BundleInputs) -> Result<()> {
    log::info!("Repackaging {} as a direct NSIS installer", inputs.app.display());
    let makensis = toolset::get_nsis_compiler(settings).await?;

    let workspace = Workspace::create_in(settings.temp_root(), REPACKAGE_PREFIX).await?;
    let result: Result<()> = async {
        let app_dir =
            extract::extract_application(settings, &inputs.app, workspace.path()).await?;
        let sdk = workspace
            .stage(&inputs.sdk, &settings.product().sdk_staged_name)
            .await?;

        let content = script::render_direct(
            settings,
            &script::DirectInputs {
                app_dir: &app_dir,
                sdk: &sdk,
                output: &inputs.output,
            },
        )?;
        let nsi_path =
            script::write_script(workspace.path(), "direct_installer.nsi", &content).await?;

        build::run_makensis(&makensis, &nsi_path, &inputs.output).await?;
        log::info!("Created direct NSIS installer: {}", inputs.output.display());
        Ok(())
    }
    .await;

    workspace.close().await;
    result
}
