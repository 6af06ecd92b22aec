//! Configuration structures for bundling operations.
//!
//! Product naming rules, tool configuration, and the builder that
//! assembles them into [`Settings`] for one run.

mod builder;
mod core;
mod product;
mod windows;

pub use builder::SettingsBuilder;
pub use core::Settings;
pub use product::{ProductSettings, SdkSettings};
pub use windows::{ArchiveSettings, ExecutionLevel, NsisCompression, NsisSettings};
