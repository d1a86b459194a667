//! Install primitives shared by every job.
//!
//! # Overview
//!
//! - **Downloader**: blocking HTTP with bounded redirects and digest-gated reuse
//! - **Checksums**: SHA-1 / SHA-256 digests of files and buffers
//! - **Extractor**: zip/jar unpacking with exclusions
//! - **Legacy packs**: `.pack.xz` containers decoded through `unpack200`
//! - **Layout**: where everything lives under the data directory
//!
//! Jobs reach the network only through the [`Downloader`] trait so they can
//! be driven by an in-memory implementation in tests.

pub mod config;
pub mod download;
pub mod error;
pub mod extractor;
pub mod fs_ops;
pub mod layout;
pub mod legacy_pack;
pub mod traits;

pub use config::{Endpoints, InstallerConfig};
pub use download::{Checksum, HashAlgorithm, HttpDownloader};
pub use error::{InstallError, InstallResult};
pub use extractor::{ExtractReport, ZipExtractor};
pub use layout::DataLayout;
pub use legacy_pack::{LegacyPackDecoder, PackUnpacker, Unpack200};
pub use traits::{fetch_json, Downloader, FetchOutcome, ProgressCallback};
