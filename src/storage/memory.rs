//! In-process audit store

use std::sync::{PoisonError, RwLock};

use crate::audit::{AuditRecord, NewAuditRecord};
use crate::error::AuditResult;
use crate::models::AuditRecordId;

use super::AuditStore;

/// Keeps audit records in memory, in append order
///
/// A push either lands whole or not at all, so a lock poisoned by a panicking
/// reader or writer still guards a consistent log and is recovered.
#[derive(Default)]
pub struct MemoryStore {
    records: RwLock<Vec<AuditRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of every record appended so far
    pub fn records(&self) -> AuditResult<Vec<AuditRecord>> {
        let records = self.records.read().unwrap_or_else(PoisonError::into_inner);
        Ok(records.clone())
    }

    pub fn len(&self) -> usize {
        self.records.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AuditStore for MemoryStore {
    fn append(&self, record: NewAuditRecord) -> AuditResult<AuditRecord> {
        let mut records = self.records.write().unwrap_or_else(PoisonError::into_inner);

        let record = record.into_record(AuditRecordId::new());
        records.push(record.clone());
        Ok(record)
    }
}
