//! The chain engine.
//!
//! `AuditChain` builds, reads, verifies and prunes the chain on top of any
//! `AuditStorage`.  Appends are serialized by a lock owned by the engine
//! instance: reading the head, hashing the new record and advancing the head
//! happen as one unit relative to other appends, so two writers can never
//! produce records with the same `previous_id`.
//!
//! Reads, verification and pruning take no lock.  A prune racing an
//! integrity check shows up as a `MissingRecord` failure.

use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{debug, info, warn};

use chainlog_contracts::{
    checkpoint::Checkpoint,
    error::{AuditError, AuditResult},
    record::{AuditRecord, NULL_ID},
};
use chainlog_core::traits::AuditStorage;

use crate::{
    chain::{compute_id, hash_record},
    walk::ChainWalk,
};

/// Outcome of `AuditChain::fingerprint`: a freshly verified checkpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fingerprint {
    /// The verified segment, `oldest|head`.
    pub checkpoint: Checkpoint,
    /// Records verified inside the segment.
    pub n_valid: u64,
}

/// A tamper-evident audit chain over a storage backend.
pub struct AuditChain<S> {
    storage: S,
    append_lock: Mutex<()>,
}

impl<S: AuditStorage> AuditChain<S> {
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            append_lock: Mutex::new(()),
        }
    }

    /// The underlying storage backend.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Id of the most recently appended record, `None` for an empty chain.
    pub fn head(&self) -> AuditResult<Option<String>> {
        Ok(self.storage.get_last_id()?)
    }

    /// Fetch one record without verifying it.
    pub fn get(&self, id: &str) -> AuditResult<Option<AuditRecord>> {
        Ok(self.storage.get(id)?)
    }

    /// Append a record to the head of the chain and return it.
    ///
    /// If the record was stored but the head could not be advanced, the
    /// record is removed again (best effort) and the storage error is
    /// returned.  The head is untouched in that case, so the next append
    /// still links to the previous head.
    pub fn add(
        &self,
        subject: Value,
        event: impl Into<String>,
        data: Value,
    ) -> AuditResult<AuditRecord> {
        // The guarded state lives in storage; a panic in another append
        // cannot leave anything half-written behind this lock.
        let _guard = self
            .append_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let previous_id = self
            .storage
            .get_last_id()?
            .unwrap_or_else(|| NULL_ID.to_string());
        let event = event.into();
        let time = Utc::now().timestamp_millis();
        let id = compute_id(&previous_id, &subject, &event, &data, time);

        let record = AuditRecord {
            id,
            previous_id,
            subject,
            event,
            data,
            time,
        };

        self.storage.put(&record)?;

        if let Err(e) = self.storage.set_last_id(&record.id) {
            warn!(id = %record.id, error = %e, "failed to advance chain head; removing orphan record");
            if let Err(cleanup) = self.storage.del(&record.id) {
                warn!(id = %record.id, error = %cleanup, "failed to remove orphan record");
            }
            return Err(e.into());
        }

        debug!(
            id = %record.id,
            previous_id = %record.previous_id,
            event = %record.event,
            "appended audit record"
        );

        Ok(record)
    }

    /// Walk the chain from `start` (default: the current head) back towards
    /// genesis, newest first.
    ///
    /// Best-effort listing: an absent record ends the walk and nothing is
    /// re-hashed.  Use `check_integrity` to verify.
    pub fn get_from(&self, start: Option<&str>) -> ChainWalk<'_, S> {
        ChainWalk::new(&self.storage, start)
    }

    /// Verify every record from `newest` (inclusive) back to `oldest`
    /// (exclusive) and return how many were verified.
    ///
    /// `oldest` is only compared, never fetched, so it may name a pruned
    /// record.  `NULL_ID` as `oldest` verifies the whole chain.
    ///
    /// # Errors
    ///
    /// - `MissingRecord` if a record on the path is absent, or genesis is
    ///   reached before `oldest` (the error then names `oldest`).
    /// - `AlteredRecord` if a record's content no longer hashes to its id.
    /// - `Storage` if the backend fails.
    pub fn check_integrity(&self, oldest: &str, newest: &str) -> AuditResult<u64> {
        let mut n_valid: u64 = 0;
        let mut current = newest.to_string();

        while current != oldest {
            if current == NULL_ID {
                warn!(oldest = %oldest, n_valid, "reached genesis before oldest boundary");
                return Err(AuditError::MissingRecord {
                    id: oldest.to_string(),
                    n_valid,
                });
            }

            let record = match self.storage.get(&current)? {
                Some(record) => record,
                None => {
                    warn!(id = %current, n_valid, "audit record missing");
                    return Err(AuditError::MissingRecord {
                        id: current,
                        n_valid,
                    });
                }
            };

            if hash_record(&record) != current {
                warn!(id = %current, n_valid, "audit record altered");
                return Err(AuditError::AlteredRecord {
                    id: current,
                    n_valid,
                });
            }

            n_valid += 1;
            current = record.previous_id;
        }

        info!(oldest = %oldest, newest = %newest, n_valid, "audit chain integrity verified");
        Ok(n_valid)
    }

    /// Delete `id` and every ancestor reachable from it.
    ///
    /// Stops quietly at the first absent ancestor, so re-running a prune is
    /// harmless.  Records newer than `id` are untouched.
    ///
    /// # Errors
    ///
    /// `HeadPrune` if `id` is the current head: the next append would link
    /// to a record that no longer exists.
    pub fn delete_from(&self, id: &str) -> AuditResult<()> {
        if id == NULL_ID {
            return Ok(());
        }
        if self.storage.get_last_id()?.as_deref() == Some(id) {
            return Err(AuditError::HeadPrune { id: id.to_string() });
        }

        let mut deleted: u64 = 0;
        let mut current = id.to_string();
        while current != NULL_ID {
            let Some(record) = self.storage.get(&current)? else {
                break;
            };
            self.storage.del(&current)?;
            deleted += 1;
            current = record.previous_id;
        }

        info!(from = %id, deleted, "pruned audit records");
        Ok(())
    }

    /// Verify `oldest` up to the current head and return the new checkpoint.
    ///
    /// On an empty chain the checkpoint's newest id is `NULL_ID`.
    pub fn fingerprint(&self, oldest: &str) -> AuditResult<Fingerprint> {
        let newest = self.head()?.unwrap_or_else(|| NULL_ID.to_string());
        let n_valid = self.check_integrity(oldest, &newest)?;

        Ok(Fingerprint {
            checkpoint: Checkpoint::new(oldest, newest),
            n_valid,
        })
    }

    /// Prune every record created before `cutoff`, except the head.
    ///
    /// Finds the newest non-head record older than `cutoff` and deletes it
    /// together with its ancestors.  Returns the id it pruned from, which is
    /// a valid `oldest` boundary for later checks, or `None` if nothing
    /// qualified.
    pub fn prune_older_than(&self, cutoff: DateTime<Utc>) -> AuditResult<Option<String>> {
        let cutoff_ms = cutoff.timestamp_millis();
        let mut walk = self.get_from(None);

        match walk.next() {
            None => return Ok(None),
            Some(head) => {
                head?;
            }
        }

        for record in walk {
            let record = record?;
            if record.time < cutoff_ms {
                self.delete_from(&record.id)?;
                return Ok(Some(record.id));
            }
        }

        Ok(None)
    }
}

impl<S> std::fmt::Debug for AuditChain<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuditChain").finish_non_exhaustive()
    }
}
