//! Test fixtures shared by unit tests.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::io::{Cursor, Write};
use std::path::Path;

use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use crate::manager::download::{
    digest_bytes, file_name_from_url, is_reusable, verify_checksum, Checksum, HashAlgorithm,
};
use crate::manager::error::{InstallError, InstallResult};
use crate::manager::traits::{Downloader, FetchOutcome, ProgressCallback};

/// Build an in-memory zip with the given `(name, contents)` entries.
pub fn zip_bytes(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, data) in entries {
        writer
            .start_file(name.to_string(), SimpleFileOptions::default())
            .unwrap();
        writer.write_all(data).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

pub fn sha1_hex(data: &[u8]) -> String {
    digest_bytes(data, HashAlgorithm::Sha1)
}

#[derive(Debug, Clone)]
enum Route {
    Body(Vec<u8>),
    Redirect(String),
}

/// In-memory downloader serving a fixed URL table.
///
/// Unknown URLs answer 404. Every request is recorded so tests can assert
/// what was (and was not) fetched.
#[derive(Debug, Default)]
pub struct FakeDownloader {
    routes: HashMap<String, Route>,
    requests: RefCell<Vec<String>>,
}

impl FakeDownloader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn serve(mut self, url: &str, body: impl Into<Vec<u8>>) -> Self {
        self.routes.insert(url.to_string(), Route::Body(body.into()));
        self
    }

    pub fn serve_json(self, url: &str, value: &serde_json::Value) -> Self {
        self.serve(url, value.to_string())
    }

    pub fn redirect(mut self, from: &str, to: &str) -> Self {
        self.routes
            .insert(from.to_string(), Route::Redirect(to.to_string()));
        self
    }

    /// Number of requests made for `url`.
    pub fn hits(&self, url: &str) -> usize {
        self.requests.borrow().iter().filter(|u| *u == url).count()
    }

    fn follow(&self, url: &str) -> InstallResult<(String, Vec<u8>)> {
        let mut current = url.to_string();
        for _ in 0..=10 {
            self.requests.borrow_mut().push(current.clone());
            match self.routes.get(&current) {
                Some(Route::Body(body)) => return Ok((current, body.clone())),
                Some(Route::Redirect(next)) => current = next.clone(),
                None => return Err(InstallError::NotFound { url: current }),
            }
        }
        Err(InstallError::TooManyRedirects {
            url: url.to_string(),
            limit: 10,
        })
    }

    fn write(dest: &Path, body: &[u8], progress: Option<ProgressCallback<'_>>) {
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(dest, body).unwrap();
        if let Some(cb) = progress {
            cb(body.len() as u64, body.len() as u64);
        }
    }
}

impl Downloader for FakeDownloader {
    fn download(
        &self,
        url: &str,
        dest: &Path,
        expected: Option<&Checksum>,
        progress: Option<ProgressCallback<'_>>,
    ) -> InstallResult<FetchOutcome> {
        if is_reusable(dest, expected)? {
            return Ok(FetchOutcome::Reused);
        }
        let (_, body) = self.follow(url)?;
        Self::write(dest, &body, progress);
        if let Some(expected) = expected {
            if let Err(e) = verify_checksum(dest, expected) {
                fs::remove_file(dest).ok();
                return Err(e);
            }
        }
        Ok(FetchOutcome::Downloaded(body.len() as u64))
    }

    fn download_named(
        &self,
        url: &str,
        dir: &Path,
        progress: Option<ProgressCallback<'_>>,
    ) -> InstallResult<String> {
        let (final_url, body) = self.follow(url)?;
        let name = file_name_from_url(&final_url)?;
        let dest = dir.join(&name);
        if !dest.is_file() {
            Self::write(&dest, &body, progress);
        }
        Ok(name)
    }

    fn get_text(&self, url: &str) -> InstallResult<String> {
        let (_, body) = self.follow(url)?;
        Ok(String::from_utf8_lossy(&body).into_owned())
    }

    fn redirect_location(&self, url: &str) -> InstallResult<Option<String>> {
        self.requests.borrow_mut().push(url.to_string());
        match self.routes.get(url) {
            Some(Route::Redirect(next)) => Ok(Some(next.clone())),
            Some(Route::Body(_)) => Ok(None),
            None => Err(InstallError::NotFound {
                url: url.to_string(),
            }),
        }
    }
}
