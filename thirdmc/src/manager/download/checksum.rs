//! Checksum utilities for downloaded and extracted files.
//!
//! Version metadata, libraries and asset objects are addressed by SHA-1,
//! so both SHA-1 and SHA-256 are supported.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use sha1::Sha1;
use sha2::{Digest, Sha256};

use crate::manager::error::{InstallError, InstallResult};

/// Buffer size for reading files during checksum calculation (64KB).
const BUFFER_SIZE: usize = 64 * 1024;

/// Supported hash algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HashAlgorithm {
    Sha1,
    Sha256,
}

impl HashAlgorithm {
    /// Get the string representation of this algorithm.
    pub fn as_str(&self) -> &'static str {
        match self {
            HashAlgorithm::Sha1 => "sha1",
            HashAlgorithm::Sha256 => "sha256",
        }
    }

    /// Length of the hex-encoded digest.
    pub fn hex_len(&self) -> usize {
        match self {
            HashAlgorithm::Sha1 => 40,
            HashAlgorithm::Sha256 => 64,
        }
    }
}

/// An expected digest: algorithm plus lowercase hex value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checksum {
    pub algorithm: HashAlgorithm,
    pub hex: String,
}

impl Checksum {
    pub fn new(algorithm: HashAlgorithm, hex: &str) -> Self {
        Self {
            algorithm,
            hex: hex.trim().to_lowercase(),
        }
    }

    pub fn sha1(hex: &str) -> Self {
        Self::new(HashAlgorithm::Sha1, hex)
    }

    pub fn sha256(hex: &str) -> Self {
        Self::new(HashAlgorithm::Sha256, hex)
    }
}

impl std::fmt::Display for Checksum {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.algorithm.as_str(), self.hex)
    }
}

enum Hasher {
    Sha1(Sha1),
    Sha256(Sha256),
}

impl Hasher {
    fn new(algorithm: HashAlgorithm) -> Self {
        match algorithm {
            HashAlgorithm::Sha1 => Hasher::Sha1(Sha1::new()),
            HashAlgorithm::Sha256 => Hasher::Sha256(Sha256::new()),
        }
    }

    fn update(&mut self, data: &[u8]) {
        match self {
            Hasher::Sha1(h) => h.update(data),
            Hasher::Sha256(h) => h.update(data),
        }
    }

    fn finish(self) -> String {
        match self {
            Hasher::Sha1(h) => format!("{:x}", h.finalize()),
            Hasher::Sha256(h) => format!("{:x}", h.finalize()),
        }
    }
}

/// Digest of an in-memory buffer as lowercase hex.
pub fn digest_bytes(data: &[u8], algorithm: HashAlgorithm) -> String {
    let mut hasher = Hasher::new(algorithm);
    hasher.update(data);
    hasher.finish()
}

/// Calculate the digest of a file.
///
/// # Errors
///
/// Returns an error if the file cannot be read.
pub fn calculate_file_checksum(path: &Path, algorithm: HashAlgorithm) -> InstallResult<String> {
    let mut file = File::open(path).map_err(|e| InstallError::ReadFailed {
        path: path.to_path_buf(),
        source: e,
    })?;

    let mut hasher = Hasher::new(algorithm);
    let mut buffer = vec![0u8; BUFFER_SIZE];

    loop {
        let bytes_read = file
            .read(&mut buffer)
            .map_err(|e| InstallError::ReadFailed {
                path: path.to_path_buf(),
                source: e,
            })?;

        if bytes_read == 0 {
            break;
        }

        hasher.update(&buffer[..bytes_read]);
    }

    Ok(hasher.finish())
}

/// Verify that a file matches an expected checksum.
pub fn verify_checksum(path: &Path, expected: &Checksum) -> InstallResult<()> {
    let actual = calculate_file_checksum(path, expected.algorithm)?;
    if actual != expected.hex {
        return Err(InstallError::ChecksumMismatch {
            file: path
                .file_name()
                .unwrap_or_default()
                .to_string_lossy()
                .to_string(),
            expected: expected.hex.clone(),
            actual,
        });
    }
    Ok(())
}

/// Whether an existing file at `dest` can be kept instead of re-fetched.
///
/// Only a present file that hashes to `expected` is kept. Without a
/// digest there is nothing to trust, so the file is fetched again.
pub fn is_reusable(dest: &Path, expected: Option<&Checksum>) -> InstallResult<bool> {
    let Some(checksum) = expected else {
        return Ok(false);
    };
    if !dest.is_file() {
        return Ok(false);
    }
    let actual = calculate_file_checksum(dest, checksum.algorithm)?;
    Ok(actual == checksum.hex)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_calculate_file_checksum_sha256() {
        let temp = TempDir::new().unwrap();
        let file_path = temp.path().join("test.txt");

        let mut file = File::create(&file_path).unwrap();
        file.write_all(b"hello world").unwrap();

        let checksum = calculate_file_checksum(&file_path, HashAlgorithm::Sha256).unwrap();
        assert_eq!(
            checksum,
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }

    #[test]
    fn test_calculate_file_checksum_sha1() {
        let temp = TempDir::new().unwrap();
        let file_path = temp.path().join("test.txt");
        std::fs::write(&file_path, b"hello world").unwrap();

        let checksum = calculate_file_checksum(&file_path, HashAlgorithm::Sha1).unwrap();
        assert_eq!(checksum, "2aae6c35c94fcfb415dbe95f408b9ce91ee846ed");
        assert_eq!(checksum.len(), HashAlgorithm::Sha1.hex_len());
    }

    #[test]
    fn test_digest_bytes_empty() {
        assert_eq!(
            digest_bytes(b"", HashAlgorithm::Sha1),
            "da39a3ee5e6b4b0d3255bfef95601890afd80709"
        );
    }

    #[test]
    fn test_verify_checksum_mismatch() {
        let temp = TempDir::new().unwrap();
        let file_path = temp.path().join("lib.jar");
        std::fs::write(&file_path, b"content").unwrap();

        let result = verify_checksum(&file_path, &Checksum::sha1("0000"));
        match result {
            Err(InstallError::ChecksumMismatch { file, expected, .. }) => {
                assert_eq!(file, "lib.jar");
                assert_eq!(expected, "0000");
            }
            other => panic!("expected mismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_checksum_normalises_case() {
        let checksum = Checksum::sha1("  2AAE6C35C94FCFB415DBE95F408B9CE91EE846ED ");
        assert_eq!(checksum.hex, "2aae6c35c94fcfb415dbe95f408b9ce91ee846ed");
        assert_eq!(
            checksum.to_string(),
            "sha1:2aae6c35c94fcfb415dbe95f408b9ce91ee846ed"
        );
    }

    #[test]
    fn test_is_reusable() {
        let temp = TempDir::new().unwrap();
        let file_path = temp.path().join("a.bin");

        assert!(!is_reusable(&file_path, None).unwrap());

        std::fs::write(&file_path, b"hello world").unwrap();
        assert!(!is_reusable(&file_path, None).unwrap());
        assert!(is_reusable(
            &file_path,
            Some(&Checksum::sha1("2aae6c35c94fcfb415dbe95f408b9ce91ee846ed"))
        )
        .unwrap());
        assert!(!is_reusable(&file_path, Some(&Checksum::sha1("ffff"))).unwrap());
    }
}
