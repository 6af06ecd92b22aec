//! NSIS installer build execution.
//!
//! Compiles NSI scripts into Windows installer executables using makensis.

use crate::bundler::{
    builder::tool_detection::run_tool,
    error::{ErrorExt, Result},
};
use std::{ffi::OsStr, path::Path};

/// Run makensis to compile an NSI script.
///
/// The script names its own `OutFile`; `output_path` is only used to make
/// sure the destination directory exists.
pub async fn run_makensis(makensis: &Path, nsi_path: &Path, output_path: &Path) -> Result<()> {
    log::info!("Running makensis...");

    if let Some(parent) = output_path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .fs_context("creating installer output directory", parent)?;
    }

    run_tool(
        makensis,
        [
            OsStr::new("-V3"),
            OsStr::new("-INPUTCHARSET"),
            OsStr::new("UTF8"),
            OsStr::new("-OUTPUTCHARSET"),
            OsStr::new("UTF8"),
            nsi_path.as_os_str(),
        ],
    )
    .await
}
