//! The storage boundary consumed by the chain engine.
//!
//! `AuditStorage` is a dumb key-value store plus one pointer slot.  It knows
//! nothing about hashing or linkage; the engine imposes every ordering
//! guarantee (in particular, it serializes appends itself, so a backend
//! shared between several engines need not provide its own locking).

use chainlog_contracts::{error::StoreResult, record::AuditRecord};

/// Persistence contract for audit records and the chain head.
///
/// All methods may block on I/O.  Implementations must be shareable across
/// threads; mutation goes through `&self`.
pub trait AuditStorage: Send + Sync {
    /// Fetch a record by id.  `Ok(None)` means "no such record", not an error.
    fn get(&self, id: &str) -> StoreResult<Option<AuditRecord>>;

    /// Persist a record under its own id.
    ///
    /// The record must be durable before this returns `Ok`.
    fn put(&self, record: &AuditRecord) -> StoreResult<()>;

    /// Delete a record by id.  Deleting an absent id is not an error.
    fn del(&self, id: &str) -> StoreResult<()>;

    /// The current chain head, or `None` if nothing was ever appended.
    fn get_last_id(&self) -> StoreResult<Option<String>>;

    /// Advance the chain head.
    fn set_last_id(&self, id: &str) -> StoreResult<()>;
}

impl<T: AuditStorage + ?Sized> AuditStorage for &T {
    fn get(&self, id: &str) -> StoreResult<Option<AuditRecord>> {
        (**self).get(id)
    }

    fn put(&self, record: &AuditRecord) -> StoreResult<()> {
        (**self).put(record)
    }

    fn del(&self, id: &str) -> StoreResult<()> {
        (**self).del(id)
    }

    fn get_last_id(&self) -> StoreResult<Option<String>> {
        (**self).get_last_id()
    }

    fn set_last_id(&self, id: &str) -> StoreResult<()> {
        (**self).set_last_id(id)
    }
}

impl<T: AuditStorage + ?Sized> AuditStorage for Box<T> {
    fn get(&self, id: &str) -> StoreResult<Option<AuditRecord>> {
        (**self).get(id)
    }

    fn put(&self, record: &AuditRecord) -> StoreResult<()> {
        (**self).put(record)
    }

    fn del(&self, id: &str) -> StoreResult<()> {
        (**self).del(id)
    }

    fn get_last_id(&self) -> StoreResult<Option<String>> {
        (**self).get_last_id()
    }

    fn set_last_id(&self, id: &str) -> StoreResult<()> {
        (**self).set_last_id(id)
    }
}

impl<T: AuditStorage + ?Sized> AuditStorage for std::sync::Arc<T> {
    fn get(&self, id: &str) -> StoreResult<Option<AuditRecord>> {
        (**self).get(id)
    }

    fn put(&self, record: &AuditRecord) -> StoreResult<()> {
        (**self).put(record)
    }

    fn del(&self, id: &str) -> StoreResult<()> {
        (**self).del(id)
    }

    fn get_last_id(&self) -> StoreResult<Option<String>> {
        (**self).get_last_id()
    }

    fn set_last_id(&self, id: &str) -> StoreResult<()> {
        (**self).set_last_id(id)
    }
}
