//! Decoder for legacy `.jar.pack.xz` library containers.
//!
//! After xz decompression the container looks like:
//!
//! ```text
//! [pack200 payload][checksum manifest][u32 LE manifest length]["SIGN"]
//! ```
//!
//! The manifest is newline separated `"<sha1> <path>"` records. The payload
//! is turned back into a jar by an external `unpack200`, and every file
//! named in the manifest is checked against its digest before the jar is
//! put in place.

use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{debug, info};
use xz2::read::XzDecoder;

use super::download::{calculate_file_checksum, part_path, HashAlgorithm};
use super::error::{InstallError, InstallResult};
use super::extractor::ZipExtractor;
use super::layout::ensure_dir;

/// Trailer marking a signed container.
pub const SIGNATURE: &[u8; 4] = b"SIGN";

/// Name of the external unpacker.
pub const UNPACK200: &str = "unpack200";

/// Turns a pack200 payload into a jar.
pub trait PackUnpacker {
    fn unpack(&self, pack: &Path, jar: &Path) -> InstallResult<()>;
}

/// `unpack200` from a JDK, either configured explicitly or found on `PATH`.
#[derive(Debug, Clone, Default)]
pub struct Unpack200 {
    program: Option<PathBuf>,
}

impl Unpack200 {
    pub fn new(program: Option<PathBuf>) -> Self {
        Self { program }
    }

    fn locate(&self) -> InstallResult<PathBuf> {
        match &self.program {
            Some(path) if path.is_file() => Ok(path.clone()),
            Some(_) => Err(InstallError::ToolMissing {
                tool: UNPACK200.to_string(),
            }),
            None => which::which(UNPACK200).map_err(|_| InstallError::ToolMissing {
                tool: UNPACK200.to_string(),
            }),
        }
    }
}

impl PackUnpacker for Unpack200 {
    fn unpack(&self, pack: &Path, jar: &Path) -> InstallResult<()> {
        let program = self.locate()?;
        debug!(program = %program.display(), pack = %pack.display(), "Running unpack200");

        let output = Command::new(&program)
            .arg(pack)
            .arg(jar)
            .output()
            .map_err(|e| InstallError::ToolFailed {
                tool: UNPACK200.to_string(),
                status: "spawn error".to_string(),
                output: e.to_string(),
            })?;

        if !output.status.success() {
            let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
            text.push_str(&String::from_utf8_lossy(&output.stderr));
            return Err(InstallError::ToolFailed {
                tool: UNPACK200.to_string(),
                status: output.status.to_string(),
                output: text.trim().to_string(),
            });
        }
        Ok(())
    }
}

/// One `"<sha1> <path>"` record of the embedded manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestRecord {
    pub sha1: String,
    pub path: String,
}

/// Split a decompressed container into payload and manifest text.
pub fn split_container<'a>(container: &Path, data: &'a [u8]) -> InstallResult<(&'a [u8], &'a str)> {
    let corrupt = |reason: &str| InstallError::CorruptContainer {
        path: container.to_path_buf(),
        reason: reason.to_string(),
    };

    if data.len() < 8 {
        return Err(corrupt("container is shorter than its trailer"));
    }
    let trailer_start = data.len() - 8;
    if &data[data.len() - 4..] != SIGNATURE {
        return Err(corrupt("signature trailer missing"));
    }

    let mut len_bytes = [0u8; 4];
    len_bytes.copy_from_slice(&data[trailer_start..trailer_start + 4]);
    let manifest_len = u32::from_le_bytes(len_bytes) as usize;
    if manifest_len > trailer_start {
        return Err(corrupt("manifest length exceeds container size"));
    }

    let manifest_start = trailer_start - manifest_len;
    let manifest = std::str::from_utf8(&data[manifest_start..trailer_start])
        .map_err(|_| corrupt("checksum manifest is not valid UTF-8"))?;
    Ok((&data[..manifest_start], manifest))
}

/// Parse the newline separated checksum manifest.
///
/// A trailing empty record (from the final newline) is ignored; any other
/// record must be a hex digest and a path separated by one space.
pub fn parse_manifest(text: &str) -> InstallResult<Vec<ManifestRecord>> {
    let mut lines: Vec<&str> = text.split('\n').collect();
    if lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }

    lines
        .into_iter()
        .map(|line| {
            let record = line.trim_end_matches('\r');
            let corrupt = || InstallError::CorruptSignature {
                record: line.to_string(),
            };
            let (sha1, path) = record.split_once(' ').ok_or_else(corrupt)?;
            if sha1.is_empty()
                || path.is_empty()
                || !sha1.chars().all(|c| c.is_ascii_hexdigit())
            {
                return Err(corrupt());
            }
            Ok(ManifestRecord {
                sha1: sha1.to_lowercase(),
                path: path.to_string(),
            })
        })
        .collect()
}

/// Decodes `.pack.xz` containers into verified jars.
pub struct LegacyPackDecoder<'a> {
    unpacker: &'a dyn PackUnpacker,
    scratch: PathBuf,
}

impl<'a> LegacyPackDecoder<'a> {
    /// `scratch` receives intermediate files and is cleaned per container.
    pub fn new(unpacker: &'a dyn PackUnpacker, scratch: impl Into<PathBuf>) -> Self {
        Self {
            unpacker,
            scratch: scratch.into(),
        }
    }

    /// Decode `container` and write the verified jar to `jar`.
    ///
    /// Returns the number of manifest records checked.
    pub fn decode(&self, container: &Path, jar: &Path) -> InstallResult<usize> {
        let work = self.scratch.join(format!("pack-{}", uuid::Uuid::new_v4()));
        ensure_dir(&work)?;

        let result = self.decode_in(container, jar, &work);
        fs::remove_dir_all(&work).ok();
        result
    }

    fn decode_in(&self, container: &Path, jar: &Path, work: &Path) -> InstallResult<usize> {
        let data = decompress(container)?;
        let (payload, manifest_text) = split_container(container, &data)?;
        let records = parse_manifest(manifest_text)?;

        let pack = work.join("payload.pack");
        fs::write(&pack, payload).map_err(|e| InstallError::WriteFailed {
            path: pack.clone(),
            source: e,
        })?;

        let unpacked = work.join("unpacked.jar");
        self.unpacker.unpack(&pack, &unpacked)?;

        let tree = work.join("tree");
        ZipExtractor::new().extract(&unpacked, &tree)?;
        verify_records(&tree, &records)?;

        if let Some(parent) = jar.parent() {
            ensure_dir(parent)?;
        }
        install_jar(&unpacked, jar)?;

        info!(
            jar = %jar.display(),
            files = records.len(),
            "Decoded legacy pack"
        );
        Ok(records.len())
    }
}

/// Only a complete copy ever appears at `jar`; later runs trust its presence.
fn install_jar(unpacked: &Path, jar: &Path) -> InstallResult<()> {
    let part = part_path(jar);
    let copied = fs::copy(unpacked, &part).and_then(|_| fs::rename(&part, jar));
    copied.map_err(|e| {
        fs::remove_file(&part).ok();
        InstallError::WriteFailed {
            path: jar.to_path_buf(),
            source: e,
        }
    })
}

fn decompress(container: &Path) -> InstallResult<Vec<u8>> {
    let file = File::open(container).map_err(|e| InstallError::ReadFailed {
        path: container.to_path_buf(),
        source: e,
    })?;
    let mut data = Vec::new();
    XzDecoder::new(file)
        .read_to_end(&mut data)
        .map_err(|e| InstallError::CorruptContainer {
            path: container.to_path_buf(),
            reason: format!("xz decompression failed: {}", e),
        })?;
    Ok(data)
}

fn verify_records(tree: &Path, records: &[ManifestRecord]) -> InstallResult<()> {
    for record in records {
        let file = tree.join(&record.path);
        if !file.is_file() {
            return Err(InstallError::MissingFile { path: file });
        }
        let actual = calculate_file_checksum(&file, HashAlgorithm::Sha1)?;
        if actual != record.sha1 {
            return Err(InstallError::ChecksumMismatch {
                file: record.path.clone(),
                expected: record.sha1.clone(),
                actual,
            });
        }
    }
    Ok(())
}
