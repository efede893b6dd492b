// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Client configuration management.
//!
//! Configuration is stored in `config.toml` inside the state directory and
//! covers the server endpoint, the known submission targets, and the sync
//! cadence. Every field has a default, so a missing config file means
//! defaults, not an error.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use sq_core::RouteTable;

use crate::error::{Error, Result};

const CONFIG_FILE_NAME: &str = "config.toml";

/// Environment variable: override the sendq state directory.
pub const STATE_DIR_ENV: &str = "SENDQ_STATE_DIR";

/// Client configuration stored in `{state_dir}/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the submission server.
    #[serde(default = "default_server_url")]
    pub server_url: String,
    /// Known submission targets (day plans the server exposes).
    #[serde(default = "default_targets")]
    pub targets: Vec<String>,
    /// Fallback target for unrecognized `target_ref`s.
    #[serde(default = "default_target")]
    pub default_target: String,
    /// Periodic sync cadence in seconds.
    #[serde(default = "default_sync_interval_secs")]
    pub sync_interval_secs: u64,
    /// Connectivity probe timeout in milliseconds.
    #[serde(default = "default_probe_timeout_ms")]
    pub probe_timeout_ms: u64,
}

fn default_server_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_targets() -> Vec<String> {
    ["sunday", "monday", "tuesday", "wednesday", "thursday"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_target() -> String {
    "today".to_string()
}

fn default_sync_interval_secs() -> u64 {
    300
}

fn default_probe_timeout_ms() -> u64 {
    1500
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server_url: default_server_url(),
            targets: default_targets(),
            default_target: default_target(),
            sync_interval_secs: default_sync_interval_secs(),
            probe_timeout_ms: default_probe_timeout_ms(),
        }
    }
}

impl Config {
    /// Loads configuration from the given state directory, falling back to
    /// defaults when no config file exists yet.
    pub fn load(state_dir: &Path) -> Result<Self> {
        let config_path = state_dir.join(CONFIG_FILE_NAME);
        if !config_path.exists() {
            return Ok(Config::default());
        }
        let content = fs::read_to_string(&config_path)
            .map_err(|e| Error::Config(format!("failed to read config: {}", e)))?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;
        Ok(config)
    }

    /// Saves configuration to the given state directory.
    pub fn save(&self, state_dir: &Path) -> Result<()> {
        fs::create_dir_all(state_dir)?;
        let config_path = state_dir.join(CONFIG_FILE_NAME);
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("failed to serialize config: {}", e)))?;
        fs::write(&config_path, content)?;
        Ok(())
    }

    /// Route table derived from the configured targets.
    pub fn route_table(&self) -> RouteTable {
        RouteTable::new(self.targets.clone(), self.default_target.clone())
    }

    /// Periodic sync cadence.
    pub fn sync_interval(&self) -> Duration {
        Duration::from_secs(self.sync_interval_secs)
    }

    /// Connectivity probe timeout.
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    /// `host:port` of the server, for the reachability probe.
    pub fn probe_addr(&self) -> String {
        let stripped = self
            .server_url
            .trim_start_matches("http://")
            .trim_start_matches("https://");
        let host = stripped.split('/').next().unwrap_or(stripped);
        if host.contains(':') {
            host.to_string()
        } else if self.server_url.starts_with("https://") {
            format!("{}:443", host)
        } else {
            format!("{}:80", host)
        }
    }
}

/// Resolve the state directory: `SENDQ_STATE_DIR` override, then the XDG
/// state home.
pub fn state_dir() -> PathBuf {
    if let Ok(dir) = std::env::var(STATE_DIR_ENV) {
        return PathBuf::from(dir);
    }
    dirs::state_dir()
        .map(|d| d.join("sendq"))
        .or_else(|| dirs::home_dir().map(|h| h.join(".local/state/sendq")))
        .unwrap_or_else(|| PathBuf::from(".local/state/sendq"))
}

/// Path of the queue database within the state directory.
pub fn queue_db_path(state_dir: &Path) -> PathBuf {
    state_dir.join(sq_core::store::QUEUE_DB_NAME)
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
