//! # chainlog-store
//!
//! Durable storage and configuration for chainlog.
//!
//! ## Overview
//!
//! [`FileStorage`] implements [`AuditStorage`](chainlog_core::traits::AuditStorage)
//! with one JSON file per record and a `LAST_ID` head file.
//! [`ChainlogConfig`] is read from TOML and selects the backend;
//! [`open_chain`] turns a configuration into a ready-to-use engine.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use std::path::Path;
//! use chainlog_store::{open_chain, ChainlogConfig};
//!
//! let config = ChainlogConfig::from_file(Path::new("chainlog.toml"))?;
//! let chain = open_chain(&config)?;
//! ```

pub mod config;
pub mod file;

pub use config::{
    open_chain, open_storage, BackendKind, ChainlogConfig, RetentionConfig, StorageConfig,
    DEFAULT_DATA_DIR,
};
pub use file::FileStorage;

// ── Tests ─────────────────────────────────────────────────────────────────────
