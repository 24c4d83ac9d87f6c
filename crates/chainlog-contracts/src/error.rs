//! Error types for the chainlog workspace.
//!
//! Storage backends return `StoreError`; the chain engine returns
//! `AuditError`, which carries storage failures through untouched so a
//! caller can always tell an I/O fault from a trust violation.

use thiserror::Error;

/// Failures raised by a storage backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backend could not read or write its medium.
    #[error("storage io error: {0}")]
    Io(#[from] std::io::Error),

    /// A stored record or pointer could not be encoded or decoded.
    #[error("storage serialization error: {0}")]
    Serialization(String),

    /// Any other backend-specific failure.
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Convenience alias for storage operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Failures raised by the chain engine.
#[derive(Debug, Error)]
pub enum AuditError {
    /// A record referenced by the chain is absent, or the chain reached
    /// genesis before the declared oldest boundary.
    #[error("missing audit record {id} ({n_valid} valid records before it)")]
    MissingRecord { id: String, n_valid: u64 },

    /// A record's recomputed hash differs from its id.
    #[error("altered audit record {id} ({n_valid} valid records before it)")]
    AlteredRecord { id: String, n_valid: u64 },

    /// Refused to prune the current chain head.
    #[error("refusing to prune chain head {id}")]
    HeadPrune { id: String },

    /// Propagated as-is from the storage backend.
    #[error(transparent)]
    Storage(#[from] StoreError),
}

impl AuditError {
    /// The offending record id of an integrity failure.
    pub fn record_id(&self) -> Option<&str> {
        match self {
            Self::MissingRecord { id, .. } | Self::AlteredRecord { id, .. } => Some(id),
            _ => None,
        }
    }

    /// How many records were validated before an integrity failure.
    pub fn n_valid(&self) -> Option<u64> {
        match self {
            Self::MissingRecord { n_valid, .. } | Self::AlteredRecord { n_valid, .. } => {
                Some(*n_valid)
            }
            _ => None,
        }
    }

    /// True for the two trust-violation kinds (missing or altered record).
    pub fn is_integrity_failure(&self) -> bool {
        matches!(
            self,
            Self::MissingRecord { .. } | Self::AlteredRecord { .. }
        )
    }
}

/// Convenience alias used throughout the chainlog crates.
pub type AuditResult<T> = Result<T, AuditError>;

/// A checkpoint string was not of the form `oldest|newest`.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid checkpoint '{input}': expected 'oldest|newest'")]
pub struct CheckpointParseError {
    pub input: String,
}

/// Configuration could not be loaded or is invalid.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config TOML: {0}")]
    Parse(String),

    #[error("invalid configuration: {reason}")]
    Invalid { reason: String },

    /// The configured backend could not be opened.
    #[error("failed to open storage: {0}")]
    Storage(#[from] StoreError),
}
