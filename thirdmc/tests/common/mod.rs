//! Fixtures shared by the scheduler integration tests.
//!
//! Provides an in-memory downloader and a small remote world: one vanilla
//! version with an asset, a library and a native library, plus a loader
//! build on top of it.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::io::{Cursor, Write};
use std::path::Path;
use std::rc::Rc;

use serde_json::json;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use thirdmc::launch::{LaunchPlan, Launcher};
use thirdmc::loader::universal_jar_url;
use thirdmc::manager::download::{
    digest_bytes, file_name_from_url, is_reusable, verify_checksum, HashAlgorithm,
};
use thirdmc::manager::{
    Checksum, Downloader, Endpoints, FetchOutcome, InstallError, InstallResult, ProgressCallback,
};
use thirdmc::scheduler::{JobKind, ProgressSink};

pub const MINECRAFT: &str = "1.12.2";
pub const BUILD: &str = "14.23.5.2847";
pub const LOADER_ID: &str = "1.12.2-forge1.12.2-14.23.5.2847";

pub const DESCRIPTOR_URL: &str = "https://meta.test/v1/packages/1.12.2.json";
pub const INDEX_URL: &str = "https://meta.test/v1/indexes/1.12.json";
pub const CLIENT_URL: &str = "https://cdn.test/client.jar";
pub const PATCHY_PATH: &str = "com/mojang/patchy/1.1/patchy-1.1.jar";
pub const NATIVE_PATH: &str =
    "org/lwjgl/lwjgl/lwjgl-platform/2.9.4/lwjgl-platform-2.9.4-natives-linux.jar";
pub const ASSET_BODY: &[u8] = b"sound data";
pub const CLIENT_BODY: &[u8] = b"client jar";
pub const PATCHY_BODY: &[u8] = b"patchy jar";

// ============================================================================
// Archives and digests
// ============================================================================

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

// ============================================================================
// Downloader
// ============================================================================

#[derive(Debug, Clone)]
enum Route {
    Body(Vec<u8>),
    Redirect(String),
}

/// Downloader serving a fixed URL table; anything else answers 404.
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

    fn write(dest: &Path, body: &[u8]) {
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(dest, body).unwrap();
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
        Self::write(dest, &body);
        if let Some(cb) = progress {
            cb(body.len() as u64, body.len() as u64);
        }
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
        _progress: Option<ProgressCallback<'_>>,
    ) -> InstallResult<String> {
        let (final_url, body) = self.follow(url)?;
        let name = file_name_from_url(&final_url)?;
        let dest = dir.join(&name);
        if !dest.is_file() {
            Self::write(&dest, &body);
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

// ============================================================================
// Remote world
// ============================================================================

pub fn asset_url(endpoints: &Endpoints) -> String {
    let hash = sha1_hex(ASSET_BODY);
    format!("{}/{}/{}", endpoints.resources, &hash[..2], hash)
}

pub fn library_url(endpoints: &Endpoints, path: &str) -> String {
    format!("{}{}", endpoints.libraries, path)
}

pub fn native_jar() -> Vec<u8> {
    zip_bytes(&[
        ("liblwjgl.so", b"native code"),
        ("META-INF/MANIFEST.MF", b"Manifest-Version: 1.0"),
    ])
}

/// Serve the vanilla version: listing, descriptor, asset index, asset,
/// client jar and libraries.
pub fn serve_vanilla(fake: FakeDownloader, endpoints: &Endpoints) -> FakeDownloader {
    let index = json!({
        "objects": {
            "sounds/a.ogg": {"hash": sha1_hex(ASSET_BODY), "size": ASSET_BODY.len()},
            "sounds/b.ogg": {"hash": sha1_hex(ASSET_BODY), "size": ASSET_BODY.len()}
        }
    })
    .to_string();
    let native = native_jar();

    let descriptor = json!({
        "id": MINECRAFT,
        "type": "release",
        "mainClass": "net.minecraft.client.main.Main",
        "minecraftArguments": "--username ${auth_player_name} --version ${version_name} --gameDir ${game_directory} --assetIndex ${assets_index_name}",
        "assetIndex": {"id": "1.12", "url": INDEX_URL, "sha1": sha1_hex(index.as_bytes())},
        "downloads": {"client": {"url": CLIENT_URL, "sha1": sha1_hex(CLIENT_BODY)}},
        "libraries": [
            {"name": "com.mojang:patchy:1.1",
             "downloads": {"artifact": {
                "path": PATCHY_PATH,
                "url": library_url(endpoints, PATCHY_PATH),
                "sha1": sha1_hex(PATCHY_BODY)}}},
            {"name": "org.lwjgl.lwjgl:lwjgl-platform:2.9.4",
             "natives": {"linux": "natives-linux", "osx": "natives-osx"},
             "extract": {"exclude": ["META-INF/"]},
             "downloads": {"classifiers": {
                "natives-linux": {
                    "path": NATIVE_PATH,
                    "url": library_url(endpoints, NATIVE_PATH),
                    "sha1": sha1_hex(&native)}}}}
        ]
    });
    let listing = json!({
        "latest": {"release": MINECRAFT, "snapshot": MINECRAFT},
        "versions": [
            {"id": MINECRAFT, "type": "release", "url": DESCRIPTOR_URL}
        ]
    });

    fake.serve_json(&endpoints.version_manifest, &listing)
        .serve_json(DESCRIPTOR_URL, &descriptor)
        .serve(INDEX_URL, index)
        .serve(&asset_url(endpoints), ASSET_BODY)
        .serve(CLIENT_URL, CLIENT_BODY)
        .serve(&library_url(endpoints, PATCHY_PATH), PATCHY_BODY)
        .serve(&library_url(endpoints, NATIVE_PATH), native)
}

pub const FORGE_PATH: &str =
    "net/minecraftforge/forge/1.12.2-14.23.5.2847/forge-1.12.2-14.23.5.2847.jar";
pub const FORGE_UNIVERSAL_URL: &str = "https://maven.test/net/minecraftforge/forge/1.12.2-14.23.5.2847/forge-1.12.2-14.23.5.2847-universal.jar";
pub const LAUNCHWRAPPER_PATH: &str = "net/minecraft/launchwrapper/1.12/launchwrapper-1.12.jar";

/// Serve the loader build: its universal jar and its libraries.
pub fn serve_loader(fake: FakeDownloader, endpoints: &Endpoints) -> FakeDownloader {
    let profile = json!({
        "id": LOADER_ID,
        "jar": MINECRAFT,
        "mainClass": "net.minecraft.launchwrapper.Launch",
        "minecraftArguments": "--username ${auth_player_name} --version ${version_name} --tweakClass net.minecraftforge.fml.common.launcher.FMLTweaker",
        "libraries": [
            {"name": "net.minecraftforge:forge:1.12.2-14.23.5.2847", "url": "https://maven.test/"},
            {"name": "net.minecraft:launchwrapper:1.12", "serverreq": true},
            {"name": "org.example:server-only:1.0", "serverreq": true, "clientreq": false}
        ]
    })
    .to_string();
    let universal = zip_bytes(&[("version.json", profile.as_bytes())]);
    let universal_url = universal_jar_url(&endpoints.loader_maven, "1.12.2-14.23.5.2847");

    fake.serve(&universal_url, universal)
        .serve(FORGE_UNIVERSAL_URL, b"forge universal".to_vec())
        .serve(
            &library_url(endpoints, LAUNCHWRAPPER_PATH),
            b"launchwrapper".to_vec(),
        )
}

// ============================================================================
// Recorders
// ============================================================================

#[derive(Debug, Default)]
pub struct Events {
    pub finished: Vec<JobKind>,
    pub failed: Vec<(JobKind, String)>,
    pub skipped: Vec<(JobKind, usize)>,
    pub transfers: usize,
}

/// Sink recording what the scheduler reported.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink(pub Rc<RefCell<Events>>);

impl ProgressSink for RecordingSink {
    fn progress(&mut self, _kind: JobKind, _message: &str, percent: f64) {
        assert!((0.0..=100.0).contains(&percent), "percent {}", percent);
    }

    fn transfer(&mut self, _kind: JobKind, _file: &str, _written: u64, _total: u64) {
        self.0.borrow_mut().transfers += 1;
    }

    fn skipped(&mut self, kind: JobKind, count: usize) {
        self.0.borrow_mut().skipped.push((kind, count));
    }

    fn failed(&mut self, kind: JobKind, error: &InstallError) {
        self.0.borrow_mut().failed.push((kind, error.to_string()));
    }

    fn finished(&mut self, kind: JobKind, _message: &str) {
        self.0.borrow_mut().finished.push(kind);
    }
}

/// Launcher that keeps the plans it was handed.
#[derive(Debug, Clone, Default)]
pub struct RecordingLauncher(pub Rc<RefCell<Vec<LaunchPlan>>>);

impl Launcher for RecordingLauncher {
    fn launch(&mut self, plan: &LaunchPlan) -> InstallResult<()> {
        self.0.borrow_mut().push(plan.clone());
        Ok(())
    }
}
