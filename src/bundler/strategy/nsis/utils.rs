//! NSIS utility functions.
//!
//! Settings-to-NSIS mappings and the BOM-prefixed script writer.

use crate::bundler::{
    error::{ErrorExt, Result},
    settings::{ExecutionLevel, NsisCompression},
};
use std::path::Path;
use tokio::io::AsyncWriteExt;

/// Map compression setting to NSIS compression string.
pub fn map_compression(compression: NsisCompression) -> &'static str {
    match compression {
        NsisCompression::Zlib => "zlib",
        NsisCompression::Bzip2 => "bzip2",
        NsisCompression::Lzma => "lzma",
    }
}

/// Map privilege level to the `RequestExecutionLevel` argument.
pub fn map_execution_level(level: ExecutionLevel) -> &'static str {
    match level {
        ExecutionLevel::User => "user",
        ExecutionLevel::Admin => "admin",
        ExecutionLevel::Highest => "highest",
    }
}

/// `" a b"` for `["a", "b"]`, empty for no arguments.
pub fn command_tail(args: &[String]) -> String {
    args.iter().map(|arg| format!(" {}", arg)).collect()
}

/// Path of `name` inside `$INSTDIR`, as NSIS expects it.
pub fn in_instdir(name: &str) -> String {
    format!("$INSTDIR\\{}", name)
}

/// Write file with UTF-8 BOM (required by NSIS).
///
/// NSIS reads the script as UTF-8 only when it starts with the byte order
/// mark (EF BB BF).
pub async fn write_utf8_bom(path: &Path, content: &str) -> Result<()> {
    let mut file = tokio::fs::File::create(path)
        .await
        .fs_context("creating NSI script file", path)?;

    file.write_all(&[0xEF, 0xBB, 0xBF])
        .await
        .fs_context("writing UTF-8 BOM", path)?;
    file.write_all(content.as_bytes())
        .await
        .fs_context("writing NSI content", path)?;
    file.flush().await.fs_context("flushing NSI file", path)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_tail_prefixes_each_argument() {
        assert_eq!(command_tail(&[]), "");
        assert_eq!(
            command_tail(&["/quiet".into(), "/norestart".into()]),
            " /quiet /norestart"
        );
    }

    #[tokio::test]
    async fn script_starts_with_bom() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("x.nsi");
        write_utf8_bom(&path, "Name \"Ä\"").await.unwrap();
        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[..3], &[0xEF, 0xBB, 0xBF]);
        assert_eq!(std::str::from_utf8(&bytes[3..]).unwrap(), "Name \"Ä\"");
    }
}
