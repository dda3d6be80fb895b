//! Durable stores for audit records
//!
//! A store only ever appends. It assigns the record id and must tolerate
//! concurrent appends from handlers running on different threads.

pub mod jsonl;
pub mod memory;

pub use jsonl::JsonlStore;
pub use memory::MemoryStore;

use crate::audit::{AuditRecord, NewAuditRecord};
use crate::error::AuditResult;

/// Append-only sink for audit records
pub trait AuditStore: Send + Sync {
    /// Persist one record and return it with its assigned id
    ///
    /// Failures are reported as `AuditError::WriteFailure`.
    fn append(&self, record: NewAuditRecord) -> AuditResult<AuditRecord>;
}
