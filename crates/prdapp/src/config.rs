//! # Configuration
//!
//! Operator settings for the local store, loaded with [`confique`].
//!
//! ## Storage Hierarchy
//!
//! Values are resolved in priority order:
//! 1. **Environment variables**: `PRD_DATA_DIR`, `PRD_QUOTA_BYTES`, `PRD_WARN_THRESHOLD`.
//! 2. **Config file**: `prd.toml` in the OS config directory (via `directories`).
//! 3. **Compiled defaults**: `#[config(default = ...)]`.
//!
//! ## Available Settings
//!
//! | Key | Default | Description |
//! |-----|---------|-------------|
//! | `data_dir` | OS data dir | Where the file backend keeps its entries |
//! | `quota_bytes` | `10485760` | Assumed capacity of the medium |
//! | `warn_threshold` | `80` | Usage percentage that raises an alert |
//! | `poll_interval_secs` | `5` | Storage monitor sampling period |
//!
//! Editor preferences (autosave, theme, toolbar) are not configuration: they
//! live in the store under `prd-preferences`.

use crate::error::{PrdError, Result};
use crate::monitor::StorageMonitor;
use confique::Config;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_FILENAME: &str = "prd.toml";

#[derive(Config, Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PrdConfig {
    /// Data directory for the file backend.
    #[config(env = "PRD_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Assumed capacity of the backing medium, in bytes.
    #[config(env = "PRD_QUOTA_BYTES", default = 10485760)]
    pub quota_bytes: u64,

    /// Percentage above which usage raises an alert.
    #[config(env = "PRD_WARN_THRESHOLD", default = 80.0)]
    pub warn_threshold: f64,

    #[config(default = 5)]
    pub poll_interval_secs: u64,
}

impl Default for PrdConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            quota_bytes: crate::store::DEFAULT_CAPACITY,
            warn_threshold: crate::monitor::DEFAULT_WARN_THRESHOLD,
            poll_interval_secs: crate::monitor::DEFAULT_POLL_INTERVAL.as_secs(),
        }
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "prd")
}

/// `prd.toml` inside the OS config directory, if one can be determined.
pub fn default_config_file() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILENAME))
}

impl PrdConfig {
    /// Environment, then the default config file, then defaults.
    pub fn load() -> Result<Self> {
        let mut builder = Self::builder().env();
        if let Some(path) = default_config_file() {
            builder = builder.file(path);
        }
        builder
            .load()
            .map_err(|e| PrdError::Config(e.to_string()))?
            .checked()
    }

    /// Loads from one file only. A missing file yields the defaults.
    pub fn load_file(path: &Path) -> Result<Self> {
        Self::builder()
            .file(path)
            .load()
            .map_err(|e| PrdError::Config(e.to_string()))?
            .checked()
    }

    fn checked(self) -> Result<Self> {
        if !(0.0..=100.0).contains(&self.warn_threshold) {
            return Err(PrdError::Config(format!(
                "warn_threshold must be between 0 and 100, got {}",
                self.warn_threshold
            )));
        }
        if self.poll_interval_secs == 0 {
            return Err(PrdError::Config(
                "poll_interval_secs must be at least 1".to_string(),
            ));
        }
        Ok(self)
    }

    /// The configured data directory, or the OS data directory.
    pub fn data_dir(&self) -> Result<PathBuf> {
        self.data_dir
            .clone()
            .or_else(|| project_dirs().map(|dirs| dirs.data_dir().to_path_buf()))
            .ok_or_else(|| PrdError::Config("Could not determine a data directory".to_string()))
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn monitor(&self) -> StorageMonitor {
        StorageMonitor::new(self.quota_bytes, self.warn_threshold, self.poll_interval())
    }
}
