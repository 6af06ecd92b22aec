//! Payload embedded at the end of a self-running artifact.
//!
//! Layout of an artifact:
//!
//! ```text
//! +-------------+------------------+---------------+-------------+----------+
//! | stub binary | tar.gz of bundle | archive len   | SHA-256 of  | magic    |
//! |             |                  | (u64 LE)      | archive     | INSTBNDL |
//! +-------------+------------------+---------------+-------------+----------+
//! ```
//!
//! The stub finds the trailer in its own executable at startup.

use super::manifest::{BundleManifest, MANIFEST_FILE};
use crate::bundler::{
    Result,
    error::{Error, ErrorExt},
    utils::fs::{self, Part},
};
use flate2::{Compression, read::GzDecoder, write::GzEncoder};
use sha2::{Digest, Sha256};
use std::{
    fs::File,
    io::{self, BufReader, BufWriter, Read, Seek, SeekFrom, Write},
    path::{Path, PathBuf},
};

/// Marks the end of an artifact carrying a payload.
pub const MAGIC: &[u8; 8] = b"INSTBNDL";

const DIGEST_LEN: usize = 32;
const TRAILER_LEN: u64 = 8 + DIGEST_LEN as u64 + MAGIC.len() as u64;

/// Where the payload archive sits inside an artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PayloadLocation {
    /// Offset of the archive, which is also the stub length.
    pub offset: u64,
    /// Archive length in bytes.
    pub len: u64,
    /// SHA-256 of the archive.
    pub digest: [u8; DIGEST_LEN],
}

/// Looks for a payload trailer at the end of `path`.
///
/// Returns `None` for files without one.
pub fn locate(path: &Path) -> Result<Option<PayloadLocation>> {
    let mut file = File::open(path).fs_context("opening artifact", path)?;
    let file_len = file
        .metadata()
        .fs_context("reading artifact metadata", path)?
        .len();
    if file_len < TRAILER_LEN {
        return Ok(None);
    }

    let mut trailer = [0u8; TRAILER_LEN as usize];
    file.seek(SeekFrom::End(-(TRAILER_LEN as i64)))
        .fs_context("seeking to payload trailer", path)?;
    file.read_exact(&mut trailer)
        .fs_context("reading payload trailer", path)?;

    let (len_bytes, rest) = trailer.split_at(8);
    let (digest_bytes, magic) = rest.split_at(DIGEST_LEN);
    if magic != MAGIC {
        return Ok(None);
    }

    let mut len_buf = [0u8; 8];
    len_buf.copy_from_slice(len_bytes);
    let len = u64::from_le_bytes(len_buf);

    let body_len = file_len - TRAILER_LEN;
    if len > body_len {
        return Err(Error::Payload(format!(
            "archive length {} exceeds artifact body of {} bytes",
            len, body_len
        )));
    }

    let mut digest = [0u8; DIGEST_LEN];
    digest.copy_from_slice(digest_bytes);

    Ok(Some(PayloadLocation {
        offset: body_len - len,
        len,
        digest,
    }))
}

/// Length of `stub` without any payload it may already carry.
pub fn stub_len(stub: &Path) -> Result<u64> {
    match locate(stub)? {
        Some(location) => Ok(location.offset),
        None => Ok(std::fs::metadata(stub)
            .fs_context("reading stub metadata", stub)?
            .len()),
    }
}

/// Packs every file under `dir` into a gzip-compressed tar at `archive`.
///
/// `bundle.json` comes first, the rest follows in file name order so identical
/// inputs give identical archives.
pub async fn pack_dir(dir: &Path, archive: &Path) -> Result<()> {
    let dir = dir.to_path_buf();
    let archive = archive.to_path_buf();
    tokio::task::spawn_blocking(move || pack_dir_blocking(&dir, &archive))
        .await
        .map_err(|e| Error::GenericError(format!("payload packing task panicked: {}", e)))?
}

fn pack_dir_blocking(dir: &Path, archive: &Path) -> Result<()> {
    let file = File::create(archive).fs_context("creating payload archive", archive)?;
    let encoder = GzEncoder::new(BufWriter::new(file), Compression::default());
    let mut builder = tar::Builder::new(encoder);

    let walker = walkdir::WalkDir::new(dir)
        .min_depth(1)
        .sort_by_key(|entry| (entry.file_name() != MANIFEST_FILE, entry.file_name().to_owned()));
    for entry in walker {
        let entry = entry?;
        let rel_path = entry.path().strip_prefix(dir)?;
        if entry.file_type().is_dir() {
            builder
                .append_dir(rel_path, entry.path())
                .fs_context("adding directory to payload", entry.path())?;
        } else if entry.file_type().is_file() {
            builder
                .append_path_with_name(entry.path(), rel_path)
                .fs_context("adding file to payload", entry.path())?;
        }
    }

    let encoder = builder
        .into_inner()
        .fs_context("finishing payload archive", archive)?;
    let mut writer = encoder
        .finish()
        .fs_context("compressing payload archive", archive)?;
    writer.flush().fs_context("flushing payload archive", archive)?;
    Ok(())
}

/// Writes `stub || archive || trailer` to `output`.
///
/// A payload already present on the stub is left out. Returns the artifact size.
pub async fn write_artifact(stub: &Path, archive: &Path, output: &Path) -> Result<u64> {
    let (stub_bytes, archive_len, digest) = {
        let stub = stub.to_path_buf();
        let archive = archive.to_path_buf();
        tokio::task::spawn_blocking(move || -> Result<(u64, u64, [u8; DIGEST_LEN])> {
            let stub_bytes = stub_len(&stub)?;
            let file = File::open(&archive).fs_context("opening payload archive", &archive)?;
            let archive_len = file
                .metadata()
                .fs_context("reading payload archive metadata", &archive)?
                .len();
            let digest = hash_reader(BufReader::new(file))
                .fs_context("hashing payload archive", &archive)?;
            Ok((stub_bytes, archive_len, digest))
        })
        .await
        .map_err(|e| Error::GenericError(format!("payload hashing task panicked: {}", e)))??
    };

    let mut trailer = Vec::with_capacity(TRAILER_LEN as usize);
    trailer.extend_from_slice(&archive_len.to_le_bytes());
    trailer.extend_from_slice(&digest);
    trailer.extend_from_slice(MAGIC);

    fs::concat(
        output,
        &[
            Part::FilePrefix(stub, stub_bytes),
            Part::File(archive),
            Part::Bytes(&trailer),
        ],
    )
    .await
}

/// Verifies the payload of `artifact` and unpacks it into `dest`.
pub async fn unpack(artifact: &Path, location: PayloadLocation, dest: &Path) -> Result<()> {
    let artifact: PathBuf = artifact.to_path_buf();
    let dest = dest.to_path_buf();
    tokio::task::spawn_blocking(move || unpack_blocking(&artifact, location, &dest))
        .await
        .map_err(|e| Error::GenericError(format!("payload unpacking task panicked: {}", e)))?
}

fn unpack_blocking(artifact: &Path, location: PayloadLocation, dest: &Path) -> Result<()> {
    let open_region = || -> io::Result<io::Take<BufReader<File>>> {
        let mut file = File::open(artifact)?;
        file.seek(SeekFrom::Start(location.offset))?;
        Ok(BufReader::new(file).take(location.len))
    };

    let digest = open_region()
        .and_then(hash_reader)
        .fs_context("hashing embedded payload", artifact)?;
    if digest != location.digest {
        return Err(Error::Payload("checksum mismatch, the artifact is corrupt".into()));
    }

    let region = open_region().fs_context("opening embedded payload", artifact)?;
    let mut archive = tar::Archive::new(GzDecoder::new(region));
    archive
        .unpack(dest)
        .fs_context("unpacking embedded payload", dest)?;
    Ok(())
}

/// Reads `bundle.json` from the payload without unpacking the installers.
///
/// The digest is not checked here; [`unpack`] does that.
pub async fn read_manifest(artifact: &Path, location: PayloadLocation) -> Result<BundleManifest> {
    let artifact = artifact.to_path_buf();
    tokio::task::spawn_blocking(move || read_manifest_blocking(&artifact, location))
        .await
        .map_err(|e| Error::GenericError(format!("manifest reading task panicked: {}", e)))?
}

fn read_manifest_blocking(artifact: &Path, location: PayloadLocation) -> Result<BundleManifest> {
    let mut file = File::open(artifact).fs_context("opening artifact", artifact)?;
    file.seek(SeekFrom::Start(location.offset))
        .fs_context("seeking to embedded payload", artifact)?;
    let region = BufReader::new(file).take(location.len);

    let mut archive = tar::Archive::new(GzDecoder::new(region));
    let entries = archive
        .entries()
        .fs_context("reading embedded payload", artifact)?;
    for entry in entries {
        let mut entry = entry.fs_context("reading embedded payload", artifact)?;
        let is_manifest = entry
            .path()
            .fs_context("reading embedded payload", artifact)?
            .as_os_str()
            == MANIFEST_FILE;
        if is_manifest {
            let mut contents = String::new();
            entry
                .read_to_string(&mut contents)
                .fs_context("reading bundle manifest", artifact)?;
            let manifest: BundleManifest = serde_json::from_str(&contents)?;
            manifest.validate()?;
            return Ok(manifest);
        }
    }

    Err(Error::Payload(format!("{} is missing", MANIFEST_FILE)))
}

fn hash_reader<R: Read>(mut reader: R) -> io::Result<[u8; DIGEST_LEN]> {
    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; 8192];
    loop {
        let n = reader.read(&mut buffer)?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }
    Ok(hasher.finalize().into())
}
