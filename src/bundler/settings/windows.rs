//! Windows packaging tool settings (7-Zip SFX and NSIS).

use serde::Deserialize;
use std::path::PathBuf;

/// 7-Zip self-extracting archive configuration.
///
/// # Configuration
///
/// ```toml
/// [archive]
/// archiver = "7z"
/// sfx_module = "7zS.sfx"
/// ```
#[derive(Clone, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ArchiveSettings {
    /// Archiver program, looked up on `PATH` unless it is a path.
    pub archiver: String,

    /// SFX module prepended to the archive.
    ///
    /// Relative paths are searched in the installer search directories
    /// and next to the archiver.
    pub sfx_module: PathBuf,

    /// Window title shown by the SFX module.
    ///
    /// Default: None (uses `"<product> with Windows SDK Installer"`)
    pub title: Option<String>,

    /// Confirmation prompt shown before extraction.
    ///
    /// Default: None (uses `"Do you want to install <product> with Windows SDK?"`)
    pub begin_prompt: Option<String>,
}

impl Default for ArchiveSettings {
    fn default() -> Self {
        Self {
            archiver: "7z".into(),
            sfx_module: PathBuf::from("7zS.sfx"),
            title: None,
            begin_prompt: None,
        }
    }
}

/// Privilege level requested by the generated NSIS installer.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionLevel {
    /// Run as the invoking user (matches the wrapped installer's `asInvoker`).
    #[default]
    User,

    /// Require elevation.
    Admin,

    /// Elevate only when the user is an administrator.
    Highest,
}

/// NSIS compression algorithm.
///
/// | Algorithm | Speed | Size |
/// |-----------|-------|------|
/// | Zlib | Fast | Medium |
/// | Bzip2 | Medium | Small |
/// | LZMA | Slowest | Smallest |
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NsisCompression {
    /// zlib compression.
    Zlib,

    /// bzip2 compression.
    Bzip2,

    /// LZMA compression (default).
    #[default]
    Lzma,
}

/// NSIS installer (.exe) configuration.
///
/// ```toml
/// [nsis]
/// compiler = "makensis"
/// execution_level = "user"
/// silent_install = true
/// ```
#[derive(Clone, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NsisSettings {
    /// Installer-script compiler, looked up on `PATH` unless it is a path.
    pub compiler: String,

    /// Requested privilege level of the wrapper installer.
    pub execution_level: ExecutionLevel,

    /// Build the wrapper installer without any UI of its own.
    pub silent_install: bool,

    /// Install directory override.
    ///
    /// Default: None (`$TEMP\<product>_Installer` for the wrapper,
    /// `$PROGRAMFILES64\<product>` for repackaging)
    pub install_dir: Option<String>,

    /// Compression algorithm for the installer.
    pub compression: NsisCompression,
}

impl Default for NsisSettings {
    fn default() -> Self {
        Self {
            compiler: "makensis".into(),
            execution_level: ExecutionLevel::User,
            silent_install: true,
            install_dir: None,
            compression: NsisCompression::Lzma,
        }
    }
}
