// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Generation-tagged static asset cache.
//!
//! The coordinator pre-populates a cache of static resources during install
//! and serves them cache-first, so a foreground context can still render
//! pages (notably the offline-confirmation view) while the server is
//! unreachable. Each cache generation is tagged with the coordinator
//! version; activation discards every generation that does not match the
//! running one.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Path of the offline-confirmation page, the navigation fallback.
pub const OFFLINE_PAGE_PATH: &str = "/offline-confirmation";

/// Assets fetched into the cache during install.
pub const DEFAULT_PRECACHE: &[&str] =
    &["/", "/static/css/style.css", "/static/js/app.js", OFFLINE_PAGE_PATH];

/// Built-in body for the offline-confirmation page, used when the server
/// cannot be reached during install.
const FALLBACK_OFFLINE_PAGE: &str = "<!doctype html>\n<title>Saved offline</title>\n\
<h1>You are offline</h1>\n\
<p>Your submission was saved locally and will be synced when the connection is restored.</p>\n";

/// Fetches assets from the server origin.
///
/// Abstracted so tests can serve from a static map instead of the network.
pub trait AssetOrigin {
    /// Fetch the asset at `path`. An error means the origin is unreachable
    /// or returned a non-success status.
    fn fetch(&self, path: &str) -> std::io::Result<Vec<u8>>;
}

/// Origin backed by the real server over HTTP.
pub struct HttpOrigin {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl HttpOrigin {
    /// Creates an origin for the given server base URL.
    pub fn new(base_url: impl Into<String>) -> std::io::Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| std::io::Error::other(format!("failed to build http client: {}", e)))?;
        Ok(HttpOrigin { client, base_url: base_url.into() })
    }
}

impl AssetOrigin for HttpOrigin {
    fn fetch(&self, path: &str) -> std::io::Result<Vec<u8>> {
        let url = format!("{}{}", self.base_url.trim_end_matches('/'), path);
        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|e| std::io::Error::other(format!("fetch {} failed: {}", url, e)))?;
        if !response.status().is_success() {
            return Err(std::io::Error::other(format!(
                "fetch {} failed: status {}",
                url,
                response.status()
            )));
        }
        response
            .bytes()
            .map(|b| b.to_vec())
            .map_err(|e| std::io::Error::other(format!("fetch {} failed: {}", url, e)))
    }
}

/// Cache lifecycle, mirroring the coordinator's startup phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    /// Pre-populating the new generation.
    Installing,
    /// Discarding stale generations.
    Activating,
    /// Serving requests.
    Active,
}

impl Lifecycle {
    pub fn as_str(&self) -> &'static str {
        match self {
            Lifecycle::Installing => "installing",
            Lifecycle::Activating => "activating",
            Lifecycle::Active => "active",
        }
    }
}

/// The static asset cache.
pub struct AssetCache<O: AssetOrigin> {
    origin: O,
    root: PathBuf,
    generation: String,
    precache: Vec<String>,
    lifecycle: Lifecycle,
}

impl<O: AssetOrigin> AssetCache<O> {
    /// Creates a cache rooted at `root` for the given generation tag.
    pub fn new(origin: O, root: PathBuf, generation: impl Into<String>) -> Self {
        AssetCache {
            origin,
            root,
            generation: generation.into(),
            precache: DEFAULT_PRECACHE.iter().map(|s| s.to_string()).collect(),
            lifecycle: Lifecycle::Installing,
        }
    }

    /// Replaces the default precache list.
    pub fn with_precache(mut self, precache: Vec<String>) -> Self {
        self.precache = precache;
        self
    }

    /// The active generation tag.
    pub fn generation(&self) -> &str {
        &self.generation
    }

    /// Current lifecycle phase.
    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    /// Number of assets present in the active generation.
    pub fn asset_count(&self) -> usize {
        fs::read_dir(self.generation_dir())
            .map(|entries| entries.filter_map(|e| e.ok()).count())
            .unwrap_or(0)
    }

    /// Install: fetch every precache asset from the origin into the new
    /// generation directory.
    ///
    /// Unreachable assets are logged and skipped, except the
    /// offline-confirmation page, which always gets its built-in fallback
    /// body so navigation fallback works from the first offline session.
    pub fn install(&mut self) -> std::io::Result<usize> {
        let dir = self.generation_dir();
        fs::create_dir_all(&dir)?;

        let mut cached = 0;
        for path in self.precache.clone() {
            match self.origin.fetch(&path) {
                Ok(body) => {
                    fs::write(dir.join(cache_file_name(&path)), body)?;
                    cached += 1;
                }
                Err(e) => {
                    tracing::warn!("precache of {} failed: {}", path, e);
                    if path == OFFLINE_PAGE_PATH {
                        fs::write(
                            dir.join(cache_file_name(&path)),
                            FALLBACK_OFFLINE_PAGE.as_bytes(),
                        )?;
                        cached += 1;
                    }
                }
            }
        }

        self.lifecycle = Lifecycle::Activating;
        Ok(cached)
    }

    /// Activate: delete every cached generation whose tag does not match the
    /// running one.
    pub fn activate(&mut self) -> std::io::Result<usize> {
        let current = self.generation_dir();
        let mut removed = 0;

        if let Ok(entries) = fs::read_dir(&self.root) {
            for entry in entries.filter_map(|e| e.ok()) {
                let path = entry.path();
                if path.is_dir() && path != current {
                    tracing::info!("discarding stale cache generation {}", path.display());
                    fs::remove_dir_all(&path)?;
                    removed += 1;
                }
            }
        }

        self.lifecycle = Lifecycle::Active;
        Ok(removed)
    }

    /// Serve an asset, cache-first.
    ///
    /// Falls back to the network for uncached paths. Navigation requests
    /// that fail both ways get the offline-confirmation page; other requests
    /// get `None`.
    pub fn fetch(&self, path: &str, navigation: bool) -> Option<Vec<u8>> {
        let cached = self.generation_dir().join(cache_file_name(path));
        if let Ok(body) = fs::read(&cached) {
            return Some(body);
        }

        match self.origin.fetch(path) {
            Ok(body) => Some(body),
            Err(e) => {
                tracing::debug!("fetch of {} failed: {}", path, e);
                if navigation {
                    self.offline_page()
                } else {
                    None
                }
            }
        }
    }

    /// The offline-confirmation page body, cached or built-in.
    pub fn offline_page(&self) -> Option<Vec<u8>> {
        let cached = self.generation_dir().join(cache_file_name(OFFLINE_PAGE_PATH));
        match fs::read(&cached) {
            Ok(body) => Some(body),
            Err(_) => Some(FALLBACK_OFFLINE_PAGE.as_bytes().to_vec()),
        }
    }

    fn generation_dir(&self) -> PathBuf {
        self.root.join(format!("gen-{}", self.generation))
    }
}

/// Map a URL path onto a flat cache file name.
fn cache_file_name(path: &str) -> String {
    let trimmed = path.trim_matches('/');
    if trimmed.is_empty() {
        "index".to_string()
    } else {
        trimmed.replace('/', "__")
    }
}

/// Resolve the cache root within a state directory.
pub fn cache_root(state_dir: &Path) -> PathBuf {
    state_dir.join("asset-cache")
}

#[cfg(test)]
#[path = "cache_tests.rs"]
mod tests;
