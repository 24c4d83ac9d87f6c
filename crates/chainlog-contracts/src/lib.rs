//! # chainlog-contracts
//!
//! Shared types and contracts for the chainlog audit trail.
//!
//! All crates in the workspace import from here. No business logic lives in
//! this crate: only data definitions, the checkpoint encoding and error
//! types.

pub mod checkpoint;
pub mod error;
pub mod record;

pub use checkpoint::Checkpoint;
pub use error::{AuditError, AuditResult, ConfigError, StoreError, StoreResult};
pub use record::{AuditRecord, NULL_ID};

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use error::CheckpointParseError;

    fn sample_record() -> AuditRecord {
        AuditRecord {
            id: "ab".repeat(32),
            previous_id: NULL_ID.to_string(),
            subject: json!({ "userName": "admin", "userIp": "10.0.0.1" }),
            event: "apiCall".to_string(),
            data: json!({ "method": "vm.start" }),
            time: 1_600_000_000_000,
        }
    }

    // ── AuditRecord ──────────────────────────────────────────────────────────

    #[test]
    fn record_serializes_with_camel_case_keys() {
        let value = serde_json::to_value(sample_record()).unwrap();
        assert!(value.get("previousId").is_some());
        assert!(value.get("previous_id").is_none());
    }

    #[test]
    fn record_timestamp_converts_millis() {
        let ts = sample_record().timestamp().unwrap();
        assert_eq!(ts.timestamp_millis(), 1_600_000_000_000);
    }

    #[test]
    fn record_genesis_detection() {
        let mut record = sample_record();
        assert!(record.is_genesis());
        record.previous_id = "cd".repeat(32);
        assert!(!record.is_genesis());
    }

    // ── Checkpoint ───────────────────────────────────────────────────────────

    #[test]
    fn checkpoint_display_joins_with_pipe() {
        let cp = Checkpoint::new("aaa", "bbb");
        assert_eq!(cp.to_string(), "aaa|bbb");
    }

    #[test]
    fn checkpoint_parses_pair() {
        let cp: Checkpoint = "  aaa|bbb \n".parse().unwrap();
        assert_eq!(cp, Checkpoint::new("aaa", "bbb"));
    }

    #[test]
    fn checkpoint_blank_input_is_default() {
        let cp: Checkpoint = "   ".parse().unwrap();
        assert_eq!(cp, Checkpoint::default());
        assert_eq!(cp.to_string(), "nullId|nullId");
        assert!(cp.from_genesis());
    }

    #[test]
    fn checkpoint_rejects_malformed_input() {
        for bad in ["aaa", "aaa|", "|bbb", "a|b|c", "|"] {
            let err = bad.parse::<Checkpoint>().unwrap_err();
            assert_eq!(
                err,
                CheckpointParseError {
                    input: bad.to_string()
                },
                "input {bad:?} must be rejected"
            );
        }
    }

    #[test]
    fn checkpoint_rebased_starts_at_failed_record() {
        let cp = Checkpoint::rebased("deadbeef", "cafebabe");
        assert_eq!(cp.oldest, "deadbeef");
        assert_eq!(cp.newest, "cafebabe");
        assert!(!cp.from_genesis());
    }

    // ── AuditError ───────────────────────────────────────────────────────────

    #[test]
    fn error_missing_record_display_and_accessors() {
        let err = AuditError::MissingRecord {
            id: "abc".to_string(),
            n_valid: 2,
        };
        let msg = err.to_string();
        assert!(msg.contains("missing audit record"));
        assert!(msg.contains("abc"));
        assert_eq!(err.record_id(), Some("abc"));
        assert_eq!(err.n_valid(), Some(2));
        assert!(err.is_integrity_failure());
    }

    #[test]
    fn error_altered_record_display_and_accessors() {
        let err = AuditError::AlteredRecord {
            id: "def".to_string(),
            n_valid: 0,
        };
        assert!(err.to_string().contains("altered audit record def"));
        assert_eq!(err.record_id(), Some("def"));
        assert_eq!(err.n_valid(), Some(0));
    }

    #[test]
    fn error_storage_is_transparent() {
        let err = AuditError::from(StoreError::Backend("disk full".to_string()));
        assert_eq!(err.to_string(), "storage backend error: disk full");
        assert_eq!(err.record_id(), None);
        assert!(!err.is_integrity_failure());
    }
}
