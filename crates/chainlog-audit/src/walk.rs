//! Lazy backward walk over the chain.

use std::collections::HashSet;
use std::iter::FusedIterator;

use tracing::debug;

use chainlog_contracts::{error::AuditResult, record::AuditRecord, record::NULL_ID};
use chainlog_core::traits::AuditStorage;

enum Cursor {
    /// Not started; `None` means "resolve the head on first use".
    Start(Option<String>),
    At(String),
    Done,
}

/// Iterator over records from a start id back towards genesis.
///
/// Produced by `AuditChain::get_from`.  Each step is one storage lookup; no
/// hash is recomputed.  The walk ends at `NULL_ID` or at the first record
/// that is absent from storage.  A storage error is yielded once and then
/// the walk is over.  A `previous_id` pointing back at a record already
/// yielded (only possible on a tampered store) also ends the walk.
pub struct ChainWalk<'a, S: ?Sized> {
    storage: &'a S,
    cursor: Cursor,
    seen: HashSet<String>,
}

impl<'a, S: AuditStorage + ?Sized> ChainWalk<'a, S> {
    pub(crate) fn new(storage: &'a S, start: Option<&str>) -> Self {
        Self {
            storage,
            cursor: Cursor::Start(start.map(str::to_string)),
            seen: HashSet::new(),
        }
    }
}

impl<S: AuditStorage + ?Sized> Iterator for ChainWalk<'_, S> {
    type Item = AuditResult<AuditRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        let id = match std::mem::replace(&mut self.cursor, Cursor::Done) {
            Cursor::Done => return None,
            Cursor::At(id) | Cursor::Start(Some(id)) => id,
            Cursor::Start(None) => match self.storage.get_last_id() {
                Ok(Some(id)) => id,
                Ok(None) => return None,
                Err(e) => return Some(Err(e.into())),
            },
        };

        if id == NULL_ID {
            return None;
        }
        if !self.seen.insert(id.clone()) {
            debug!(id = %id, "chain walk stopped at repeated record");
            return None;
        }

        match self.storage.get(&id) {
            Ok(Some(record)) => {
                self.cursor = Cursor::At(record.previous_id.clone());
                Some(Ok(record))
            }
            Ok(None) => {
                debug!(id = %id, "chain walk stopped at absent record");
                None
            }
            Err(e) => Some(Err(e.into())),
        }
    }
}

impl<S: AuditStorage + ?Sized> FusedIterator for ChainWalk<'_, S> {}
