// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Node configuration file

use std::path::{Path, PathBuf};
use std::time::Duration;

use rk_core::RoleKind;
use serde::Deserialize;
use thiserror::Error;

fn default_listen() -> String {
    "127.0.0.1:7400".to_string()
}

fn default_replication_interval() -> Duration {
    Duration::from_millis(200)
}

/// Node configuration, loaded from TOML
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Node name, reported in status
    pub name: String,
    pub role: RoleKind,
    /// TCP address to listen on; port 0 picks a free port
    #[serde(default = "default_listen")]
    pub listen: String,
    /// Holds the WAL, pid file and log
    pub data_dir: PathBuf,
    /// Follower addresses (leader only)
    #[serde(default)]
    pub followers: Vec<String>,
    /// Leader address reported to clients that write to a follower
    #[serde(default)]
    pub leader: Option<String>,
    #[serde(with = "humantime_serde", default = "default_replication_interval")]
    pub replication_interval: Duration,
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {0}: {1}")]
    Read(PathBuf, std::io::Error),

    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

impl Config {
    /// Read, parse and validate a config file, applying `RK_DATA_DIR`
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Read(path.to_path_buf(), e))?;
        let mut config = Self::parse(&text)?;
        if let Ok(dir) = std::env::var("RK_DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }
        Ok(config)
    }

    /// Parse and validate config text
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::Invalid("name must not be empty".to_string()));
        }
        if self.replication_interval.is_zero() {
            return Err(ConfigError::Invalid(
                "replication_interval must be positive".to_string(),
            ));
        }
        if self.role == RoleKind::Follower && !self.followers.is_empty() {
            return Err(ConfigError::Invalid(
                "followers only apply to a leader".to_string(),
            ));
        }
        Ok(())
    }

    pub fn wal_path(&self) -> PathBuf {
        self.data_dir.join("rk.wal")
    }

    pub fn lock_path(&self) -> PathBuf {
        self.data_dir.join("rkd.pid")
    }

    pub fn log_path(&self) -> PathBuf {
        self.data_dir.join("rkd.log")
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
