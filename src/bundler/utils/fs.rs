//! File system utilities for bundling.
//!
//! Copies that keep file metadata, idempotent removal, and byte-level
//! concatenation used to assemble self-extracting artifacts.

use crate::bundler::error::{Error, ErrorExt, Result};
use std::{
    fs::FileTimes,
    io::{self},
    path::Path,
};
use tokio::{
    fs,
    io::{AsyncWriteExt, BufWriter},
};

/// Copies a regular file, keeping permissions and timestamps.
///
/// Creates the parent directories of `to` as needed.
/// Fails if the source path is a directory or doesn't exist.
pub async fn copy_file(from: &Path, to: &Path) -> Result<()> {
    if !from.exists() {
        crate::bail!("{:?} does not exist", from);
    }
    if !from.is_file() {
        crate::bail!("{:?} is not a file", from);
    }
    if let Some(dest_dir) = to.parent() {
        fs::create_dir_all(dest_dir)
            .await
            .fs_context("creating destination directory", dest_dir)?;
    }

    // fs::copy carries permission bits; timestamps are set below.
    fs::copy(from, to).await.fs_context("copying file", from)?;

    let metadata = fs::metadata(from)
        .await
        .fs_context("reading file metadata", from)?;
    let mut times = FileTimes::new();
    if let Ok(modified) = metadata.modified() {
        times = times.set_modified(modified);
    }
    if let Ok(accessed) = metadata.accessed() {
        times = times.set_accessed(accessed);
    }

    let dest = to.to_path_buf();
    tokio::task::spawn_blocking(move || -> io::Result<()> {
        let file = std::fs::OpenOptions::new().write(true).open(&dest)?;
        file.set_times(times)
    })
    .await
    .map_err(|e| Error::GenericError(format!("metadata copy task panicked: {}", e)))?
    .fs_context("setting file times", to)?;

    Ok(())
}

/// Removes the directory and its contents if it exists.
pub async fn remove_dir_all(path: &Path) -> Result<()> {
    match fs::remove_dir_all(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()), // Idempotent
        Err(e) => Err(Error::Fs {
            context: "removing directory",
            path: path.to_path_buf(),
            error: e,
        }),
    }
}

/// Writes `parts` back to back into a new file at `output`.
///
/// Each part is either a file on disk or an in-memory block. Creates the
/// parent directories of `output` as needed and truncates an existing file.
pub async fn concat(output: &Path, parts: &[Part<'_>]) -> Result<u64> {
    if let Some(parent) = output.parent() {
        fs::create_dir_all(parent)
            .await
            .fs_context("creating output directory", parent)?;
    }

    let file = fs::File::create(output)
        .await
        .fs_context("creating output file", output)?;
    let mut writer = BufWriter::new(file);
    let mut written = 0u64;

    for part in parts {
        match part {
            Part::File(path) => {
                let mut source = fs::File::open(path)
                    .await
                    .fs_context("opening file to concatenate", *path)?;
                written += tokio::io::copy(&mut source, &mut writer)
                    .await
                    .fs_context("concatenating file", *path)?;
            }
            Part::FilePrefix(path, len) => {
                use tokio::io::AsyncReadExt;
                let source = fs::File::open(path)
                    .await
                    .fs_context("opening file to concatenate", *path)?;
                let mut limited = source.take(*len);
                written += tokio::io::copy(&mut limited, &mut writer)
                    .await
                    .fs_context("concatenating file", *path)?;
            }
            Part::Bytes(bytes) => {
                writer
                    .write_all(bytes)
                    .await
                    .fs_context("writing output file", output)?;
                written += bytes.len() as u64;
            }
        }
    }

    writer.flush().await.fs_context("flushing output file", output)?;
    Ok(written)
}

/// One piece of a concatenated output file.
#[derive(Debug, Clone, Copy)]
pub enum Part<'a> {
    /// Whole file.
    File(&'a Path),
    /// First `n` bytes of a file.
    FilePrefix(&'a Path, u64),
    /// Literal bytes.
    Bytes(&'a [u8]),
}

/// Marks a file executable for everyone (0o755). No-op off Unix.
pub async fn set_executable(path: &Path) -> Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))
            .await
            .fs_context("setting executable permissions", path)?;
    }
    #[cfg(not(unix))]
    let _ = path;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, SystemTime};

    #[tokio::test]
    async fn copy_keeps_modification_time() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("a.exe");
        std::fs::write(&src, b"payload").unwrap();

        let old = SystemTime::UNIX_EPOCH + Duration::from_secs(1_600_000_000);
        std::fs::OpenOptions::new()
            .write(true)
            .open(&src)
            .unwrap()
            .set_modified(old)
            .unwrap();

        let dst = dir.path().join("nested/b.exe");
        copy_file(&src, &dst).await.unwrap();

        assert_eq!(std::fs::read(&dst).unwrap(), b"payload");
        let copied = std::fs::metadata(&dst).unwrap().modified().unwrap();
        assert_eq!(copied, old);
    }

    #[tokio::test]
    async fn copy_rejects_directories() {
        let dir = tempfile::tempdir().unwrap();
        let err = copy_file(dir.path(), &dir.path().join("x")).await;
        assert!(err.is_err());
    }

    #[tokio::test]
    async fn concat_joins_parts_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a");
        let b = dir.path().join("b");
        std::fs::write(&a, b"head").unwrap();
        std::fs::write(&b, b"0123456789").unwrap();

        let out = dir.path().join("out/joined");
        let n = concat(
            &out,
            &[Part::File(&a), Part::Bytes(b"|"), Part::FilePrefix(&b, 4)],
        )
        .await
        .unwrap();

        assert_eq!(n, 9);
        assert_eq!(std::fs::read(&out).unwrap(), b"head|0123");
    }

    #[tokio::test]
    async fn remove_missing_dir_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        remove_dir_all(&dir.path().join("gone")).await.unwrap();
    }
}
