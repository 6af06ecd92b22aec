//! Installer bundler library.
//!
//! Combines an application installer and the Windows SDK installer into one
//! distributable that runs them in order:
//!
//! - [`source`] finds the installers and names the output
//! - [`bundler`] packages them with one of several strategies
//! - [`sequencer`] runs them at install time, the SDK only after the
//!   application installer succeeded
//!
//! It can be used both as a CLI tool and as a library dependency.

pub mod bundler;
pub mod cli;
pub mod config;
pub mod error;
pub mod sequencer;
pub mod source;

// Re-export commonly used types
pub use error::{BundlerError, CliError, Result};
