//! In-memory implementation of `AuditStorage`.
//!
//! `MemoryStorage` is the reference backend.  Records live in a `HashMap`
//! and the head in a separate slot, each behind its own `RwLock`.  Nothing
//! survives the process, so "durable before returning" is trivially met.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use tracing::trace;

use chainlog_contracts::{
    error::{StoreError, StoreResult},
    record::AuditRecord,
};
use chainlog_core::traits::AuditStorage;

/// An in-memory audit store.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    records: RwLock<HashMap<String, AuditRecord>>,
    last_id: RwLock<Option<String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records currently stored.
    pub fn len(&self) -> usize {
        self.records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every record and reset the head.
    pub fn clear(&self) {
        self.records
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        *self.last_id.write().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

fn poisoned<T>(err: PoisonError<T>) -> StoreError {
    StoreError::Backend(format!("memory storage lock poisoned: {}", err))
}

impl AuditStorage for MemoryStorage {
    fn get(&self, id: &str) -> StoreResult<Option<AuditRecord>> {
        let records = self.records.read().map_err(poisoned)?;
        Ok(records.get(id).cloned())
    }

    fn put(&self, record: &AuditRecord) -> StoreResult<()> {
        let mut records = self.records.write().map_err(poisoned)?;
        trace!(id = %record.id, "storing audit record in memory");
        records.insert(record.id.clone(), record.clone());
        Ok(())
    }

    fn del(&self, id: &str) -> StoreResult<()> {
        let mut records = self.records.write().map_err(poisoned)?;
        records.remove(id);
        Ok(())
    }

    fn get_last_id(&self) -> StoreResult<Option<String>> {
        let last_id = self.last_id.read().map_err(poisoned)?;
        Ok(last_id.clone())
    }

    fn set_last_id(&self, id: &str) -> StoreResult<()> {
        let mut last_id = self.last_id.write().map_err(poisoned)?;
        *last_id = Some(id.to_string());
        Ok(())
    }
}
