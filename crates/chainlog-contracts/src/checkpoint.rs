//! Operator-facing checkpoint pairs.
//!
//! A checkpoint is an `(oldest, newest)` pair of record ids rendered as
//! `oldest|newest`.  Operators copy it somewhere outside the system after a
//! successful integrity check and paste it back later to re-verify only the
//! segment between the two ids.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CheckpointParseError;
use crate::record::NULL_ID;

/// Separator between the two ids of a checkpoint.
pub const CHECKPOINT_SEPARATOR: char = '|';

/// An `(oldest, newest)` boundary pair for integrity checks.
///
/// `oldest` is exclusive and only ever compared, never fetched, so it may
/// name a record that has since been pruned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkpoint {
    /// Stop marker of the verified segment (exclusive).
    pub oldest: String,
    /// Newest record of the verified segment (inclusive).
    pub newest: String,
}

impl Checkpoint {
    pub fn new(oldest: impl Into<String>, newest: impl Into<String>) -> Self {
        Self {
            oldest: oldest.into(),
            newest: newest.into(),
        }
    }

    /// A checkpoint anchored at a record that failed verification.
    ///
    /// Used after an incident has been investigated: future checks then
    /// cover only what was appended after `failed_id`.
    pub fn rebased(failed_id: impl Into<String>, head: impl Into<String>) -> Self {
        Self::new(failed_id, head)
    }

    /// True if the checkpoint starts at genesis.
    pub fn from_genesis(&self) -> bool {
        self.oldest == NULL_ID
    }
}

impl Default for Checkpoint {
    fn default() -> Self {
        Self::new(NULL_ID, NULL_ID)
    }
}

impl fmt::Display for Checkpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.oldest, CHECKPOINT_SEPARATOR, self.newest)
    }
}

impl FromStr for Checkpoint {
    type Err = CheckpointParseError;

    /// Parse `oldest|newest`.  Blank input yields the default
    /// `nullId|nullId`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Ok(Self::default());
        }

        let mut parts = s.split(CHECKPOINT_SEPARATOR);
        match (parts.next(), parts.next(), parts.next()) {
            (Some(oldest), Some(newest), None) if !oldest.is_empty() && !newest.is_empty() => {
                Ok(Self::new(oldest, newest))
            }
            _ => Err(CheckpointParseError {
                input: s.to_string(),
            }),
        }
    }
}
