//! TOML configuration and backend selection.
//!
//! ```toml
//! [storage]
//! backend = "file"           # "file" | "memory"
//! path = "./chainlog-data"   # required for "file"
//!
//! [retention]
//! max_age_days = 90          # optional; absent keeps records forever
//! ```

use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use chainlog_audit::{AuditChain, MemoryStorage};
use chainlog_contracts::error::ConfigError;
use chainlog_core::traits::AuditStorage;

use crate::file::FileStorage;

/// Default data directory of the file backend.
pub const DEFAULT_DATA_DIR: &str = "chainlog-data";

/// Which storage backend to open.
///
/// Expressed as a lowercase string in TOML:
/// ```toml
/// backend = "file"
/// backend = "memory"
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    #[default]
    File,
    /// Nothing survives the process.  Useful for tests and dry runs.
    Memory,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: BackendKind,

    /// Root directory of the file backend.  Ignored by `memory`.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::File,
            path: Some(PathBuf::from(DEFAULT_DATA_DIR)),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetentionConfig {
    /// Records older than this many days may be pruned.  The head is always
    /// kept.
    #[serde(default)]
    pub max_age_days: Option<u32>,
}

/// Top-level configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainlogConfig {
    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub retention: RetentionConfig,
}

impl ChainlogConfig {
    /// Parse `s` as TOML and validate it.
    ///
    /// Returns `ConfigError::Parse` if the TOML is malformed or does not
    /// match the schema, `ConfigError::Invalid` if it fails validation.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: ChainlogConfig =
            toml::from_str(s).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read the file at `path` and parse it as TOML configuration.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.storage.backend == BackendKind::File && self.storage.path.is_none() {
            return Err(ConfigError::Invalid {
                reason: "storage.path is required for the file backend".to_string(),
            });
        }
        if self.retention.max_age_days == Some(0) {
            return Err(ConfigError::Invalid {
                reason: "retention.max_age_days must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// The instant before which records may be pruned, if retention is set.
    pub fn retention_cutoff(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.retention
            .max_age_days
            .map(|days| now - Duration::days(i64::from(days)))
    }
}

/// Open the backend described by `config`.
pub fn open_storage(config: &StorageConfig) -> Result<Box<dyn AuditStorage>, ConfigError> {
    match config.backend {
        BackendKind::Memory => {
            info!("using in-memory audit storage");
            Ok(Box::new(MemoryStorage::new()))
        }
        BackendKind::File => {
            let path = config.path.as_ref().ok_or_else(|| ConfigError::Invalid {
                reason: "storage.path is required for the file backend".to_string(),
            })?;
            info!(path = %path.display(), "using file audit storage");
            Ok(Box::new(FileStorage::open(path)?))
        }
    }
}

/// Open the configured backend and wrap it in a chain engine.
pub fn open_chain(
    config: &ChainlogConfig,
) -> Result<AuditChain<Box<dyn AuditStorage>>, ConfigError> {
    config.validate()?;
    Ok(AuditChain::new(open_storage(&config.storage)?))
}
