//! Command line argument parsing and validation.

use crate::{bundler::Strategy, error::CliError};
use clap::Parser;
use std::path::PathBuf;

/// Bundles an application installer with the Windows SDK installer
#[derive(Parser, Debug)]
#[command(
    name = "installer_bundler",
    version,
    about = "Bundles an application installer with the Windows SDK installer",
    long_about = "Combines the application installer and the Windows SDK installer into one
distributable that runs the application installer first and the SDK installer
only when the first one succeeded.

Both installers are searched for in the working directory unless given explicitly.

Usage:
  installer_bundler
  installer_bundler --strategy archive --stub bundle-sequencer.exe
  installer_bundler --nsis --app-installer ./SCRM-Champion-4.85.1-win32-x64.exe -o setup.exe

Exit code 0 = artifact guaranteed to exist at output path."
)]
pub struct Args {
    /// Path to the application installer
    #[arg(long, value_name = "PATH", visible_alias = "scrm-installer")]
    pub app_installer: Option<PathBuf>,

    /// Path to the Windows SDK installer
    #[arg(long, value_name = "PATH")]
    pub sdk_installer: Option<PathBuf>,

    /// Output path for the combined installer
    ///
    /// Defaults to `<product>-<version>-with-SDK-win32-x64.exe` next to the
    /// application installer.
    #[arg(short = 'o', long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Packaging strategy
    #[arg(short = 's', long, value_enum, value_name = "STRATEGY")]
    pub strategy: Option<Strategy>,

    /// Build an NSIS wrapper installer (same as `--strategy nsis`)
    #[arg(long, conflicts_with = "strategy")]
    pub nsis: bool,

    /// Configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Stub executable that runs the bundled installers (script and archive strategies)
    ///
    /// Defaults to this executable.
    #[arg(long, value_name = "PATH")]
    pub stub: Option<PathBuf>,

    /// Run the SDK installer with its own UI instead of the silent flags (nsis and repackage strategies)
    #[arg(long)]
    pub interactive_sdk: bool,

    /// Also write log output to this file
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Run the installers staged in DIR instead of bundling
    #[arg(long, value_name = "DIR")]
    pub sequence_dir: Option<PathBuf>,

    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate arguments for consistency
    pub fn validate(&self) -> Result<(), CliError> {
        if self.sequence_dir.is_none() {
            return Ok(());
        }

        let bundling: Vec<String> = [
            ("--app-installer", self.app_installer.is_some()),
            ("--sdk-installer", self.sdk_installer.is_some()),
            ("--output", self.output.is_some()),
            ("--strategy", self.strategy.is_some()),
            ("--nsis", self.nsis),
            ("--stub", self.stub.is_some()),
            ("--interactive-sdk", self.interactive_sdk),
        ]
        .into_iter()
        .filter(|(_, set)| *set)
        .map(|(flag, _)| flag.to_string())
        .collect();

        if bundling.is_empty() {
            Ok(())
        } else {
            let mut arguments = vec!["--sequence-dir".to_string()];
            arguments.extend(bundling);
            Err(CliError::ConflictingArguments { arguments })
        }
    }

    /// Strategy after applying `--nsis`.
    pub fn effective_strategy(&self) -> Option<Strategy> {
        if self.nsis {
            Some(Strategy::Nsis)
        } else {
            self.strategy
        }
    }
}

/// Configuration derived from command line arguments
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    output: super::OutputManager,
}

impl From<&Args> for RuntimeConfig {
    fn from(args: &Args) -> Self {
        Self {
            output: super::OutputManager::new(args.quiet),
        }
    }
}

impl RuntimeConfig {
    /// Print success message if not in quiet mode
    pub fn success(&self, message: &str) -> std::io::Result<()> {
        self.output.success(message)
    }

    /// Print warning message if not in quiet mode
    pub fn warn(&self, message: &str) -> std::io::Result<()> {
        self.output.warn(message)
    }

    /// Print section header
    pub fn section(&self, title: &str) -> std::io::Result<()> {
        self.output.section(title)
    }

    /// Print indented text
    pub fn indent(&self, message: &str) -> std::io::Result<()> {
        self.output.indent(message)
    }
}
