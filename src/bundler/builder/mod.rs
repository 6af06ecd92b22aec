//! Bundle orchestration.
//!
//! This module provides the [`Bundler`] orchestrator that resolves the
//! inputs of a run and dispatches to the selected strategy.
//!
//! # Overview
//!
//! The bundler:
//! 1. Locates both installers (explicit paths or pattern search)
//! 2. Derives the output path when none is given
//! 3. Runs the selected strategy, falling back from `archive` to `script`
//! 4. Returns a [`BundledArtifact`](super::BundledArtifact) with size and checksum
//!
//! # Module Organization
//!
//! - [`checksum`] - SHA256 checksum calculation for artifacts
//! - [`orchestrator`] - Main [`Bundler`] struct
//! - [`tool_detection`] - External tool lookup and invocation

mod checksum;
mod orchestrator;
pub(crate) mod tool_detection;

pub use orchestrator::Bundler;
