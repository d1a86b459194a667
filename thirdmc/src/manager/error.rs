//! Error types for the install pipeline.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::profile::StoreError;

/// Result type for install operations.
pub type InstallResult<T> = Result<T, InstallError>;

/// Errors that can occur while installing versions, loaders and packages.
///
/// Every variant aborts the running job and clears the queue. Failures of
/// individual package files are not errors; they are counted as skipped.
#[derive(Debug, Error)]
pub enum InstallError {
    /// The server answered 404 somewhere in the redirect chain.
    #[error("resource not found: {url}")]
    NotFound { url: String },

    /// Connection, TLS, timeout or unexpected-status failure.
    #[error("failed to fetch {url}: {reason}")]
    Transport { url: String, reason: String },

    /// The redirect chain exceeded the configured bound.
    #[error("too many redirects while fetching {url} (limit {limit})")]
    TooManyRedirects { url: String, limit: usize },

    /// A legacy pack container is truncated or lacks its trailer.
    #[error("corrupt pack container {}: {reason}", path.display())]
    CorruptContainer { path: PathBuf, reason: String },

    /// A record of the embedded checksum manifest could not be parsed.
    #[error("corrupt checksum manifest record: {record:?}")]
    CorruptSignature { record: String },

    /// Digest of a file did not match its expected value.
    #[error("checksum mismatch for {file}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        file: String,
        expected: String,
        actual: String,
    },

    /// A file still mismatched after its one forced re-download.
    #[error("{file} changed upstream: expected {expected}, got {actual} after re-download")]
    RemoteContentDrifted {
        file: String,
        expected: String,
        actual: String,
    },

    /// A file the pipeline depends on is absent.
    #[error("missing file: {}", path.display())]
    MissingFile { path: PathBuf },

    /// Manifest type, version or source kind is not handled.
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// An external tool could not be located.
    #[error("{tool} was not found; install it or set tools.{tool} in config.ini")]
    ToolMissing { tool: String },

    /// An external tool exited unsuccessfully.
    #[error("{tool} exited with {status}: {output}")]
    ToolFailed {
        tool: String,
        status: String,
        output: String,
    },

    /// A job declared the same prerequisites twice.
    #[error("{job} still requires {missing} after its prerequisites ran")]
    UnresolvedDependency { job: String, missing: String },

    /// Failed to read a file or directory.
    #[error("failed to read {}: {source}", path.display())]
    ReadFailed { path: PathBuf, source: io::Error },

    /// Failed to write a file or directory.
    #[error("failed to write {}: {source}", path.display())]
    WriteFailed { path: PathBuf, source: io::Error },

    /// Failed to create a directory.
    #[error("failed to create directory {}: {source}", path.display())]
    CreateDirFailed { path: PathBuf, source: io::Error },

    /// An archive could not be opened or unpacked.
    #[error("failed to extract {}: {reason}", path.display())]
    ExtractionFailed { path: PathBuf, reason: String },

    /// A metadata document did not parse.
    #[error("failed to parse {what}: {source}")]
    Json {
        what: String,
        source: serde_json::Error,
    },

    /// Handing the launch plan to the process launcher failed.
    #[error("launch failed: {0}")]
    Launch(String),

    /// The profile store could not be read or persisted.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl InstallError {
    /// Builds a `Json` error for the named document.
    pub fn json(what: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Json {
            what: what.into(),
            source,
        }
    }

    /// Returns true for errors that mean "the remote does not have this".
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns true for digest failures that a single re-download may cure.
    pub fn is_checksum_mismatch(&self) -> bool {
        matches!(self, Self::ChecksumMismatch { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display() {
        let err = InstallError::NotFound {
            url: "https://example.com/a.jar".to_string(),
        };
        assert_eq!(err.to_string(), "resource not found: https://example.com/a.jar");
        assert!(err.is_not_found());
        assert!(!err.is_checksum_mismatch());
    }

    #[test]
    fn test_read_failed_keeps_source() {
        use std::error::Error as _;

        let err = InstallError::ReadFailed {
            path: PathBuf::from("/tmp/x"),
            source: io::Error::new(io::ErrorKind::NotFound, "gone"),
        };
        assert!(err.to_string().contains("/tmp/x"));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_tool_missing_mentions_config_key() {
        let err = InstallError::ToolMissing {
            tool: "unpack200".to_string(),
        };
        assert!(err.to_string().contains("tools.unpack200"));
    }
}
