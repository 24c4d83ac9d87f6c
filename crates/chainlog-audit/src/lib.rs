//! # chainlog-audit
//!
//! Append-only, SHA-256 hash-chained audit trail.
//!
//! ## Overview
//!
//! Every record's id is the hash of its content, and that content includes
//! the id of the record before it.  Deleting, reordering or editing any past
//! record therefore breaks the chain, and `AuditChain::check_integrity`
//! reports where.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use chainlog_audit::{AuditChain, MemoryStorage, NULL_ID};
//! use serde_json::json;
//!
//! let chain = AuditChain::new(MemoryStorage::new());
//! let record = chain.add(json!({ "userName": "admin" }), "apiCall", json!({}))?;
//!
//! assert_eq!(chain.check_integrity(NULL_ID, &record.id)?, 1);
//! ```

pub mod chain;
pub mod engine;
pub mod memory;
pub mod walk;

pub use chain::{canonical_json, compute_id, hash_record, verify_record, CANONICAL_VERSION};
pub use chainlog_contracts::record::NULL_ID;
pub use engine::{AuditChain, Fingerprint};
pub use memory::MemoryStorage;
pub use walk::ChainWalk;

// ── Tests ─────────────────────────────────────────────────────────────────────
