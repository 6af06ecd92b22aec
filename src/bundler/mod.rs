//! Installer bundling.
//!
//! Combines an application installer and the Windows SDK installer into one
//! distributable, using one of several packaging strategies.
//!
//! # Configuration
//!
//! Bundling is configured via an optional `installer-bundler.toml`:
//!
//! ```toml
//! [product]
//! name = "SCRM Champion"
//! app_pattern = "*SCRM*Champion*.exe"
//!
//! [archive]
//! archiver = "7z"
//! ```
//!
//! # Strategies
//!
//! | Strategy | Output | External tool | On tool failure |
//! |----------|--------|---------------|-----------------|
//! | `script` | stub + embedded payload | none | - |
//! | `archive` | 7-Zip SFX archive | `7z`, `7zS.sfx` | falls back to `script` |
//! | `nsis` | NSIS wrapper installer | `makensis` | fatal |
//! | `repackage` | direct NSIS installer | `7z`, `makensis` | fatal |
//!
//! # Integration
//!
//! ```no_run
//! use installer_bundler::bundler::{Bundler, SettingsBuilder, Strategy};
//!
//! # async fn example() -> installer_bundler::bundler::Result<()> {
//! let settings = SettingsBuilder::new()
//!     .strategy(Strategy::Archive)
//!     .build()?;
//!
//! let artifact = Bundler::new(settings).bundle().await?;
//! println!("{} ({} bytes)", artifact.path.display(), artifact.size);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub(crate) mod builder;
pub mod error;
pub mod settings;
pub(crate) mod strategy;
pub(crate) mod utils;
pub mod workspace;

// Public re-exports
pub use builder::Bundler;
pub use error::{Error, Result};
pub use settings::{
    ArchiveSettings,
    // NSIS enums
    ExecutionLevel,
    NsisCompression,
    NsisSettings,
    // Product naming and discovery
    ProductSettings,
    SdkSettings,
    // Main configuration types
    Settings,
    SettingsBuilder,
};
pub use strategy::Strategy;

/// A bundled artifact with metadata about the created installer.
///
/// Returned by [`Bundler::bundle`] after a successful run.
#[derive(Debug, Clone)]
pub struct BundledArtifact {
    /// Strategy that produced the artifact, after any fallback.
    pub strategy: Strategy,

    /// Path of the created artifact.
    pub path: std::path::PathBuf,

    /// Size of the artifact in bytes.
    pub size: u64,

    /// SHA-256 checksum of the artifact for integrity verification.
    pub checksum: String,
}
