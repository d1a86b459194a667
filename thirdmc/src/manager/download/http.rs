//! HTTP-based file downloader.
//!
//! This module provides the blocking HTTP transport used by every job:
//! - Redirects followed by hand up to a configured bound
//! - 404 anywhere in the chain reported as `NotFound`
//! - Bodies streamed to a `.part` file and renamed into place
//! - Digest-gated reuse of existing files

use std::fs::{self, File};
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use percent_encoding::percent_decode_str;
use reqwest::blocking::{Client, Response};
use reqwest::header::{CONTENT_LENGTH, LOCATION};
use reqwest::redirect::Policy;
use reqwest::StatusCode;
use tracing::{debug, trace};
use url::Url;

use super::checksum::{is_reusable, verify_checksum, Checksum};
use crate::manager::config::InstallerConfig;
use crate::manager::error::{InstallError, InstallResult};
use crate::manager::traits::{Downloader, FetchOutcome, ProgressCallback};

/// Default timeout for HTTP requests in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Default bound on redirect hops.
pub const DEFAULT_MAX_REDIRECTS: usize = 10;

/// Buffer size for reading/writing during downloads (64KB).
const BUFFER_SIZE: usize = 64 * 1024;

/// HTTP-based downloader.
#[derive(Debug)]
pub struct HttpDownloader {
    client: Client,
    pub(crate) timeout: Duration,
    pub(crate) max_redirects: usize,
}

impl HttpDownloader {
    /// Create a new HTTP downloader with default settings.
    pub fn new() -> InstallResult<Self> {
        Self::build(
            Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            DEFAULT_MAX_REDIRECTS,
            None,
        )
    }

    /// Create a downloader from installer settings.
    pub fn from_config(config: &InstallerConfig) -> InstallResult<Self> {
        Self::build(
            config.timeout,
            config.max_redirects,
            Some(config.user_agent.as_str()),
        )
    }

    fn build(
        timeout: Duration,
        max_redirects: usize,
        user_agent: Option<&str>,
    ) -> InstallResult<Self> {
        let mut builder = Client::builder()
            .timeout(timeout)
            .redirect(Policy::none());
        if let Some(agent) = user_agent {
            builder = builder.user_agent(agent.to_string());
        }
        let client = builder.build().map_err(|e| InstallError::Transport {
            url: String::new(),
            reason: format!("failed to create HTTP client: {}", e),
        })?;

        Ok(Self {
            client,
            timeout,
            max_redirects,
        })
    }

    fn request_error(&self, url: &str, e: reqwest::Error) -> InstallError {
        let reason = if e.is_timeout() {
            format!("timed out after {}s", self.timeout.as_secs())
        } else {
            e.to_string()
        };
        InstallError::Transport {
            url: url.to_string(),
            reason,
        }
    }

    /// Send a GET and walk the redirect chain.
    ///
    /// Returns the final URL together with its successful response.
    fn follow(&self, url: &str) -> InstallResult<(String, Response)> {
        let mut current = url.to_string();

        for _ in 0..=self.max_redirects {
            let response = self
                .client
                .get(&current)
                .send()
                .map_err(|e| self.request_error(&current, e))?;
            let status = response.status();

            if status.is_redirection() {
                let next = redirect_target(&current, &response)?;
                debug!(from = %current, to = %next, "Following redirect");
                current = next;
                continue;
            }
            if status == StatusCode::NOT_FOUND {
                return Err(InstallError::NotFound { url: current });
            }
            if !status.is_success() {
                return Err(InstallError::Transport {
                    url: current,
                    reason: format!("GET request failed with status {}", status),
                });
            }
            return Ok((current, response));
        }

        Err(InstallError::TooManyRedirects {
            url: url.to_string(),
            limit: self.max_redirects,
        })
    }

    /// Stream a response body to `dest` through a sibling `.part` file.
    fn stream_to(
        &self,
        url: &str,
        mut response: Response,
        dest: &Path,
        mut progress: Option<ProgressCallback<'_>>,
    ) -> InstallResult<u64> {
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).map_err(|e| InstallError::CreateDirFailed {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let total_size = response
            .headers()
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<u64>().ok());

        let part = part_path(dest);
        let result = (|| -> InstallResult<u64> {
            let file = File::create(&part).map_err(|e| InstallError::WriteFailed {
                path: part.clone(),
                source: e,
            })?;
            let mut writer = BufWriter::new(file);
            let mut buffer = vec![0u8; BUFFER_SIZE];
            let mut downloaded = 0u64;

            loop {
                let bytes_read =
                    response
                        .read(&mut buffer)
                        .map_err(|e| InstallError::Transport {
                            url: url.to_string(),
                            reason: format!("read error: {}", e),
                        })?;

                if bytes_read == 0 {
                    break;
                }

                writer
                    .write_all(&buffer[..bytes_read])
                    .map_err(|e| InstallError::WriteFailed {
                        path: part.clone(),
                        source: e,
                    })?;

                downloaded += bytes_read as u64;

                if let (Some(cb), Some(total)) = (progress.as_mut(), total_size) {
                    cb(downloaded, total);
                }
            }

            writer.flush().map_err(|e| InstallError::WriteFailed {
                path: part.clone(),
                source: e,
            })?;
            Ok(downloaded)
        })();

        match result {
            Ok(downloaded) => {
                fs::rename(&part, dest).map_err(|e| InstallError::WriteFailed {
                    path: dest.to_path_buf(),
                    source: e,
                })?;
                trace!(path = %dest.display(), bytes = downloaded, "Download complete");
                Ok(downloaded)
            }
            Err(e) => {
                fs::remove_file(&part).ok();
                Err(e)
            }
        }
    }
}

impl Downloader for HttpDownloader {
    fn download(
        &self,
        url: &str,
        dest: &Path,
        expected: Option<&Checksum>,
        progress: Option<ProgressCallback<'_>>,
    ) -> InstallResult<FetchOutcome> {
        if is_reusable(dest, expected)? {
            trace!(path = %dest.display(), "Reusing existing file");
            return Ok(FetchOutcome::Reused);
        }
        if dest.exists() {
            fs::remove_file(dest).ok();
        }

        let (final_url, response) = self.follow(url)?;
        let written = self.stream_to(&final_url, response, dest, progress)?;

        if let Some(expected) = expected {
            if let Err(e) = verify_checksum(dest, expected) {
                fs::remove_file(dest).ok();
                return Err(e);
            }
        }
        Ok(FetchOutcome::Downloaded(written))
    }

    fn download_named(
        &self,
        url: &str,
        dir: &Path,
        progress: Option<ProgressCallback<'_>>,
    ) -> InstallResult<String> {
        let (final_url, response) = self.follow(url)?;
        let name = file_name_from_url(&final_url)?;
        let dest = dir.join(&name);

        if dest.is_file() {
            debug!(file = %name, "File already present, not downloading");
            return Ok(name);
        }

        self.stream_to(&final_url, response, &dest, progress)?;
        Ok(name)
    }

    fn get_text(&self, url: &str) -> InstallResult<String> {
        let (final_url, response) = self.follow(url)?;
        response.text().map_err(|e| self.request_error(&final_url, e))
    }

    fn redirect_location(&self, url: &str) -> InstallResult<Option<String>> {
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| self.request_error(url, e))?;
        let status = response.status();

        if status.is_redirection() {
            return redirect_target(url, &response).map(Some);
        }
        if status == StatusCode::NOT_FOUND {
            return Err(InstallError::NotFound {
                url: url.to_string(),
            });
        }
        Ok(None)
    }
}

/// Resolve a response's `Location` header against the URL that produced it.
fn redirect_target(current: &str, response: &Response) -> InstallResult<String> {
    let location = response
        .headers()
        .get(LOCATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| InstallError::Transport {
            url: current.to_string(),
            reason: format!("redirect {} without a Location header", response.status()),
        })?;

    let base = Url::parse(current).map_err(|e| InstallError::Transport {
        url: current.to_string(),
        reason: e.to_string(),
    })?;
    let next = base.join(location).map_err(|e| InstallError::Transport {
        url: current.to_string(),
        reason: format!("bad redirect target {:?}: {}", location, e),
    })?;
    Ok(next.to_string())
}

/// Last path segment of a URL, percent-decoded.
pub fn file_name_from_url(url: &str) -> InstallResult<String> {
    let parsed = Url::parse(url).map_err(|e| InstallError::Transport {
        url: url.to_string(),
        reason: e.to_string(),
    })?;
    let segment = parsed
        .path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
        .ok_or_else(|| InstallError::Transport {
            url: url.to_string(),
            reason: "URL has no file name".to_string(),
        })?;
    Ok(percent_decode_str(segment).decode_utf8_lossy().into_owned())
}

/// Sibling `<name>.part` that a file is written to before it is renamed.
pub(crate) fn part_path(dest: &Path) -> PathBuf {
    let mut name = dest.file_name().unwrap_or_default().to_os_string();
    name.push(".part");
    dest.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_downloader_new() {
        let downloader = HttpDownloader::new().unwrap();
        assert_eq!(downloader.timeout.as_secs(), DEFAULT_TIMEOUT_SECS);
        assert_eq!(downloader.max_redirects, DEFAULT_MAX_REDIRECTS);
    }

    #[test]
    fn test_from_config() {
        let config = InstallerConfig::default()
            .with_timeout(Duration::from_secs(60))
            .with_max_redirects(3);
        let downloader = HttpDownloader::from_config(&config).unwrap();
        assert_eq!(downloader.timeout.as_secs(), 60);
        assert_eq!(downloader.max_redirects, 3);
    }

    #[test]
    fn test_file_name_from_url_decodes() {
        assert_eq!(
            file_name_from_url("https://cdn.example.com/files/1/Some%20Pack-1.2.zip").unwrap(),
            "Some Pack-1.2.zip"
        );
        assert_eq!(
            file_name_from_url("https://cdn.example.com/a/b/mod.jar?x=1").unwrap(),
            "mod.jar"
        );
        assert!(file_name_from_url("https://cdn.example.com/").is_err());
    }

    #[test]
    fn test_part_path() {
        assert_eq!(
            part_path(Path::new("/data/libraries/a.jar")),
            PathBuf::from("/data/libraries/a.jar.part")
        );
    }
}
