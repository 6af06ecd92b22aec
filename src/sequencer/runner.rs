//! Process execution seam for the sequencer.

use std::{future::Future, io, path::Path};

/// Launches an installer and waits for it.
///
/// Returns the exit code, or `None` when the process ended without one
/// (killed by a signal).
pub trait InstallerRunner {
    fn run(&self, program: &Path, args: &[String])
    -> impl Future<Output = io::Result<Option<i32>>>;
}

/// Runs installers as child processes attached to this console.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

impl InstallerRunner for ProcessRunner {
    async fn run(&self, program: &Path, args: &[String]) -> io::Result<Option<i32>> {
        let status = tokio::process::Command::new(program)
            .args(args)
            .status()
            .await?;
        Ok(status.code())
    }
}

impl<R: InstallerRunner> InstallerRunner for &R {
    fn run(
        &self,
        program: &Path,
        args: &[String],
    ) -> impl Future<Output = io::Result<Option<i32>>> {
        (**self).run(program, args)
    }
}
