//! External tool detection and invocation.
//!
//! Resolves the archiver and the NSIS compiler on `PATH` and runs them,
//! turning "not installed" and "exited non-zero" into distinct errors.

use crate::bundler::error::{Error, Result};
use std::{
    ffi::OsStr,
    path::{Path, PathBuf},
};

/// Resolves `program` on `PATH` (or as a path).
///
/// Fails with [`Error::ToolNotFound`] carrying `hint`.
pub fn find_tool(program: &str, hint: &str) -> Result<PathBuf> {
    match which::which(program) {
        Ok(path) => {
            log::debug!("Found {} at: {}", program, path.display());
            Ok(path)
        }
        Err(e) => {
            log::debug!("{} not found in PATH: {}", program, e);
            Err(Error::ToolNotFound {
                tool: program.to_string(),
                hint: hint.to_string(),
            })
        }
    }
}

/// Runs `tool` with `args`, inheriting stdio, and waits for it.
///
/// Spawn failures become [`Error::CommandFailed`]; a non-zero exit becomes
/// [`Error::ToolFailed`].
pub async fn run_tool<I, S>(tool: &Path, args: I) -> Result<()>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let name = tool
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| tool.display().to_string());

    let mut command = tokio::process::Command::new(tool);
    command.args(args);
    log::debug!("Running {:?}", command.as_std());

    let status = command.status().await.map_err(|e| Error::CommandFailed {
        command: tool.display().to_string(),
        error: e,
    })?;

    if !status.success() {
        log::error!("{} exited with {}", name, status);
        return Err(Error::ToolFailed { tool: name, status });
    }
    Ok(())
}

/// Logs the version line reported by `tool`, if any.
pub async fn log_tool_version(tool: &Path, version_arg: &str) {
    match tokio::process::Command::new(tool)
        .arg(version_arg)
        .output()
        .await
    {
        Ok(output) if output.status.success() => {
            let version = String::from_utf8_lossy(&output.stdout);
            let first_line = version.lines().find(|l| !l.trim().is_empty()).unwrap_or("");
            log::info!("{} available: {}", tool.display(), first_line.trim());
        }
        Ok(output) => log::debug!(
            "{} {} exited with {:?}",
            tool.display(),
            version_arg,
            output.status.code()
        ),
        Err(e) => log::debug!("{} {} failed: {}", tool.display(), version_arg, e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_tool_is_tool_not_found() {
        let err = find_tool("definitely-not-an-installed-tool", "install it").unwrap_err();
        assert!(matches!(err, Error::ToolNotFound { .. }));
        assert!(err.is_tool_failure());
        assert!(err.to_string().contains("install it"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn non_zero_exit_is_tool_failed() {
        let sh = find_tool("sh", "").unwrap();
        let err = run_tool(&sh, ["-c", "exit 3"]).await.unwrap_err();
        assert!(matches!(err, Error::ToolFailed { ref tool, .. } if tool == "sh"));
        assert!(err.is_tool_failure());

        run_tool(&sh, ["-c", "exit 0"]).await.unwrap();
    }

    #[tokio::test]
    async fn spawn_failure_is_tool_failure() {
        let err = run_tool(&PathBuf::from("/nonexistent/7z"), ["a"])
            .await
            .unwrap_err();
        assert!(matches!(err, Error::CommandFailed { .. }));
        assert!(err.is_tool_failure());
    }
}
