//! NSIS compiler lookup.

use crate::bundler::{
    builder::tool_detection::{find_tool, log_tool_version},
    error::Result,
    settings::Settings,
};
use std::path::PathBuf;

/// Locates the configured makensis and logs its version.
pub async fn get_nsis_compiler(settings: &Settings) -> Result<PathBuf> {
    let makensis = find_tool(
        &settings.nsis().compiler,
        "install NSIS (e.g. apt-get install nsis) or set [nsis] compiler",
    )?;
    log_tool_version(&makensis, "-VERSION").await;
    Ok(makensis)
}
