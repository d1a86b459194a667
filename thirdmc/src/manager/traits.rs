//! Seams between the install pipeline and the outside world.

use std::path::Path;

use serde::de::DeserializeOwned;

use super::download::Checksum;
use super::error::{InstallError, InstallResult};

/// Progress callback for a single transfer.
///
/// Called with `(bytes_written, total_bytes)`; only invoked when the
/// server advertised a content length.
pub type ProgressCallback<'a> = &'a mut dyn FnMut(u64, u64);

/// What a download call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The file was transferred; carries the number of bytes written.
    Downloaded(u64),
    /// An existing file satisfied the request and no transfer happened.
    Reused,
}

impl FetchOutcome {
    pub fn was_downloaded(&self) -> bool {
        matches!(self, Self::Downloaded(_))
    }
}

/// Fetches remote resources.
///
/// Implementations follow redirects up to a bound, map a 404 anywhere in
/// the chain to [`InstallError::NotFound`], and never leave a partial file
/// at a destination path.
pub trait Downloader {
    /// Download `url` to `dest`.
    ///
    /// An existing `dest` is reused only when it hashes to `expected`;
    /// without a digest it is fetched again. After a transfer the file is
    /// verified against `expected`; on mismatch it is removed and
    /// `ChecksumMismatch` returned.
    fn download(
        &self,
        url: &str,
        dest: &Path,
        expected: Option<&Checksum>,
        progress: Option<ProgressCallback<'_>>,
    ) -> InstallResult<FetchOutcome>;

    /// Download `url` into `dir`, naming the file after the last path
    /// segment of the final URL in the redirect chain.
    ///
    /// Returns the file name. A file of that name already in `dir` is
    /// reused without transferring the body.
    fn download_named(
        &self,
        url: &str,
        dir: &Path,
        progress: Option<ProgressCallback<'_>>,
    ) -> InstallResult<String>;

    /// Fetch `url` as text, following redirects.
    fn get_text(&self, url: &str) -> InstallResult<String>;

    /// Issue one request without following redirects and return the
    /// `Location` header if the server redirected.
    fn redirect_location(&self, url: &str) -> InstallResult<Option<String>>;
}

/// Fetch and deserialize a JSON document.
pub fn fetch_json<T: DeserializeOwned>(downloader: &dyn Downloader, url: &str) -> InstallResult<T> {
    let body = downloader.get_text(url)?;
    serde_json::from_str(&body).map_err(|e| InstallError::json(url, e))
}
