// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use std::collections::HashMap;
use tempfile::tempdir;

/// Origin serving from a fixed map; anything else is unreachable.
#[derive(Default)]
struct StaticOrigin {
    assets: HashMap<String, Vec<u8>>,
}

impl StaticOrigin {
    fn with(mut self, path: &str, body: &str) -> Self {
        self.assets.insert(path.to_string(), body.as_bytes().to_vec());
        self
    }
}

impl AssetOrigin for StaticOrigin {
    fn fetch(&self, path: &str) -> std::io::Result<Vec<u8>> {
        self.assets
            .get(path)
            .cloned()
            .ok_or_else(|| std::io::Error::other(format!("unreachable: {}", path)))
    }
}

fn full_origin() -> StaticOrigin {
    StaticOrigin::default()
        .with("/", "<html>home</html>")
        .with("/static/css/style.css", "body {}")
        .with("/static/js/app.js", "void 0;")
        .with(OFFLINE_PAGE_PATH, "<html>offline</html>")
}

#[test]
fn install_populates_generation_and_advances_lifecycle() {
    let dir = tempdir().unwrap();
    let mut cache = AssetCache::new(full_origin(), dir.path().to_path_buf(), "1.0");

    assert_eq!(cache.lifecycle(), Lifecycle::Installing);
    let cached = cache.install().unwrap();

    assert_eq!(cached, DEFAULT_PRECACHE.len());
    assert_eq!(cache.asset_count(), DEFAULT_PRECACHE.len());
    assert_eq!(cache.lifecycle(), Lifecycle::Activating);
}

#[test]
fn install_with_unreachable_origin_still_caches_offline_page() {
    let dir = tempdir().unwrap();
    let mut cache = AssetCache::new(StaticOrigin::default(), dir.path().to_path_buf(), "1.0");

    let cached = cache.install().unwrap();

    // Only the built-in offline page made it in
    assert_eq!(cached, 1);
    let body = cache.offline_page().unwrap();
    assert!(String::from_utf8(body).unwrap().contains("saved locally"));
}

#[test]
fn activate_discards_stale_generations_only() {
    let dir = tempdir().unwrap();

    // Leave an old generation behind
    let mut old = AssetCache::new(full_origin(), dir.path().to_path_buf(), "0.9");
    old.install().unwrap();

    let mut cache = AssetCache::new(full_origin(), dir.path().to_path_buf(), "1.0");
    cache.install().unwrap();
    let removed = cache.activate().unwrap();

    assert_eq!(removed, 1);
    assert_eq!(cache.lifecycle(), Lifecycle::Active);
    assert_eq!(cache.asset_count(), DEFAULT_PRECACHE.len());
}

#[test]
fn fetch_prefers_cache_over_origin() {
    let dir = tempdir().unwrap();
    let mut cache = AssetCache::new(full_origin(), dir.path().to_path_buf(), "1.0");
    cache.install().unwrap();

    // Swap the origin content by rebuilding the cache object over the same
    // directory; the cached body must win.
    let cache = AssetCache::new(
        StaticOrigin::default().with("/", "<html>changed</html>"),
        dir.path().to_path_buf(),
        "1.0",
    );
    let body = cache.fetch("/", false).unwrap();
    assert_eq!(body, b"<html>home</html>");
}

#[test]
fn fetch_falls_through_to_origin_on_cache_miss() {
    let dir = tempdir().unwrap();
    let cache = AssetCache::new(
        StaticOrigin::default().with("/uncached.js", "fresh"),
        dir.path().to_path_buf(),
        "1.0",
    );

    assert_eq!(cache.fetch("/uncached.js", false).unwrap(), b"fresh");
}

#[test]
fn failed_navigation_gets_offline_page() {
    let dir = tempdir().unwrap();
    let mut cache = AssetCache::new(full_origin(), dir.path().to_path_buf(), "1.0");
    cache.install().unwrap();

    // Unknown path, origin now unreachable
    let cache = AssetCache::new(StaticOrigin::default(), dir.path().to_path_buf(), "1.0");
    let body = cache.fetch("/plan/monday", true).unwrap();
    assert_eq!(body, b"<html>offline</html>");
}

#[test]
fn failed_non_navigation_gets_nothing() {
    let dir = tempdir().unwrap();
    let cache = AssetCache::new(StaticOrigin::default(), dir.path().to_path_buf(), "1.0");
    assert!(cache.fetch("/static/missing.css", false).is_none());
}

#[test]
fn cache_file_name_flattens_paths() {
    assert_eq!(cache_file_name("/"), "index");
    assert_eq!(cache_file_name("/static/css/style.css"), "static__css__style.css");
    assert_eq!(cache_file_name("/offline-confirmation"), "offline-confirmation");
}
