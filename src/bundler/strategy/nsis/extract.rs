//! Application installer extraction for repackaging.

use crate::bundler::{
    builder::tool_detection::{find_tool, run_tool},
    error::Result,
    settings::Settings,
};
use std::{
    ffi::OsString,
    path::{Path, PathBuf},
};

/// Archive NSIS-based installers keep the 64-bit application in.
pub const NESTED_APP_ARCHIVE: &str = "$PLUGINSDIR/app-64.7z";

/// Extracts `installer` into `<workspace>/extracted` and returns the
/// directory holding the application files.
///
/// When the extraction contains [`NESTED_APP_ARCHIVE`] it is extracted into
/// `<workspace>/app` and that directory is returned instead.
pub async fn extract_application(
    settings: &Settings,
    installer: &Path,
    workspace: &Path,
) -> Result<PathBuf> {
    let archiver = find_tool(
        &settings.archive().archiver,
        "install 7-Zip to extract the application installer",
    )?;

    let extract_dir = workspace.join("extracted");
    log::info!("Extracting {} with 7zip...", installer.display());
    extract(&archiver, installer, &extract_dir).await?;

    let nested = extract_dir.join(NESTED_APP_ARCHIVE);
    if nested.is_file() {
        log::info!("Found {}, extracting...", NESTED_APP_ARCHIVE);
        let app_dir = workspace.join("app");
        extract(&archiver, &nested, &app_dir).await?;
        Ok(app_dir)
    } else {
        log::warn!("{} not found in extracted files", NESTED_APP_ARCHIVE);
        Ok(extract_dir)
    }
}

/// `7z x -o<dest> <archive> -y`
async fn extract(archiver: &Path, archive: &Path, dest: &Path) -> Result<()> {
    let mut out_flag = OsString::from("-o");
    out_flag.push(dest.as_os_str());
    run_tool(
        archiver,
        [
            OsString::from("x"),
            out_flag,
            archive.as_os_str().to_owned(),
            OsString::from("-y"),
        ],
    )
    .await
}
