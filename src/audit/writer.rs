//! Audit record writer
//!
//! Builds a timestamped record for one captured event and appends it to the
//! configured store. There is no retry: a store failure goes straight back to
//! the caller.

use std::sync::Arc;

use super::action::Action;
use super::diff::Diff;
use super::record::{AuditRecord, NewAuditRecord};
use crate::error::{AuditError, AuditResult};
use crate::models::ActorId;
use crate::storage::AuditStore;

/// Appends one immutable record per captured event
#[derive(Clone)]
pub struct AuditWriter {
    store: Arc<dyn AuditStore>,
}

impl AuditWriter {
    pub fn new(store: Arc<dyn AuditStore>) -> Self {
        Self { store }
    }

    /// Write a single record
    pub fn write(
        &self,
        actor: Option<ActorId>,
        entity_type: &str,
        entity_id: &str,
        action: Action,
        diff: &Diff,
    ) -> AuditResult<AuditRecord> {
        let record = NewAuditRecord::new(actor, entity_type, entity_id, action, diff)
            .map_err(|e| AuditError::WriteFailure(format!("Failed to encode diff: {}", e)))?;

        self.store.append(record)
    }
}
