//! HTTP transport and digest verification.
//!
//! - Single file downloads with bounded redirects (`http`)
//! - SHA-1 / SHA-256 checksum verification (`checksum`)

mod checksum;
mod http;

pub use checksum::{
    calculate_file_checksum, digest_bytes, is_reusable, verify_checksum, Checksum, HashAlgorithm,
};
pub use http::{file_name_from_url, HttpDownloader, DEFAULT_MAX_REDIRECTS, DEFAULT_TIMEOUT_SECS};
pub(crate) use http::part_path;
