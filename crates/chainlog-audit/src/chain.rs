//! Hash-chain primitives: canonical serialization and record hashing.
//!
//! Hash input layout (bytes, in order):
//!   1. the domain tag `chainlog/record/v1\n`
//!   2. canonical JSON of `{data, event, previousId, subject, time}`
//!
//! Canonical JSON sorts object keys by byte order at every depth and emits
//! no whitespace.  Strings are escaped exactly as serde_json escapes them and
//! numbers use serde_json's `Number` rendering; `time` is an integer count
//! of milliseconds, so no float formatting is involved in the fixed fields.
//! The output does not depend on serde_json's `preserve_order` feature.
//!
//! Any change to this layout must bump `CANONICAL_VERSION` and the domain
//! tag, otherwise existing chains stop verifying.

use serde_json::Value;
use sha2::{Digest, Sha256};

use chainlog_contracts::record::AuditRecord;

/// Version of the canonical hash input layout.
pub const CANONICAL_VERSION: u32 = 1;

const DOMAIN_TAG: &[u8] = b"chainlog/record/v1\n";

/// Compute the id a record with these fields must carry.
///
/// Returns a lowercase 64-character hex string.
pub fn compute_id(
    previous_id: &str,
    subject: &Value,
    event: &str,
    data: &Value,
    time: i64,
) -> String {
    let mut body = String::new();
    body.push('{');
    push_key(&mut body, "data");
    write_canonical(data, &mut body);
    body.push(',');
    push_key(&mut body, "event");
    push_string(&mut body, event);
    body.push(',');
    push_key(&mut body, "previousId");
    push_string(&mut body, previous_id);
    body.push(',');
    push_key(&mut body, "subject");
    write_canonical(subject, &mut body);
    body.push(',');
    push_key(&mut body, "time");
    body.push_str(&time.to_string());
    body.push('}');

    let mut hasher = Sha256::new();
    hasher.update(DOMAIN_TAG);
    hasher.update(body.as_bytes());

    hex::encode(hasher.finalize())
}

/// Recompute the hash of a stored record from its content, ignoring `id`.
pub fn hash_record(record: &AuditRecord) -> String {
    compute_id(
        &record.previous_id,
        &record.subject,
        &record.event,
        &record.data,
        record.time,
    )
}

/// True if the record's id matches its content.
pub fn verify_record(record: &AuditRecord) -> bool {
    hash_record(record) == record.id
}

/// Render `value` as canonical JSON.
pub fn canonical_json(value: &Value) -> String {
    let mut out = String::new();
    write_canonical(value, &mut out);
    out
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Number(n) => out.push_str(&n.to_string()),
        Value::String(s) => push_string(out, s),
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.as_bytes().cmp(b.0.as_bytes()));

            out.push('{');
            for (i, (key, item)) in entries.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                push_key(out, key);
                write_canonical(item, out);
            }
            out.push('}');
        }
    }
}

fn push_key(out: &mut String, key: &str) {
    push_string(out, key);
    out.push(':');
}

fn push_string(out: &mut String, s: &str) {
    // Display for Value::String applies serde_json's escaping rules.
    out.push_str(&Value::String(s.to_owned()).to_string());
}
