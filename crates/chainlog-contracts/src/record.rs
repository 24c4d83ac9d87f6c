//! The audit record and the genesis sentinel.
//!
//! `AuditRecord` is one link of the chain.  Its `id` is the content hash of
//! every other field, so a record is immutable by construction: changing any
//! field without recomputing the id (and every successor's `previous_id`)
//! is detectable.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// The `previous_id` of the first record ever appended.
///
/// Not a hex digest, so it can never collide with a real record id.
pub const NULL_ID: &str = "nullId";

/// A single entry in the audit chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditRecord {
    /// Lowercase hex SHA-256 of the canonical form of all other fields.
    pub id: String,

    /// Id of the chain predecessor, or `NULL_ID` for the first record.
    pub previous_id: String,

    /// Who or what triggered the event.  Opaque to the chain.
    pub subject: serde_json::Value,

    /// Tag naming the action.
    pub event: String,

    /// Payload associated with the event.  Opaque to the chain.
    pub data: serde_json::Value,

    /// Creation time in milliseconds since the Unix epoch (UTC).
    pub time: i64,
}

impl AuditRecord {
    /// The creation time as a UTC datetime.
    ///
    /// Returns `None` if `time` is outside chrono's representable range,
    /// which only happens for records that were forged or corrupted.
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.time).single()
    }

    /// True if this is the first record of its chain.
    pub fn is_genesis(&self) -> bool {
        self.previous_id == NULL_ID
    }
}
