//! Audit record data structures
//!
//! Defines the persisted audit record. Field names on the wire follow the
//! `audit_logs` layout: `user_id`, `model_name`, `model_id`, `action`, `record`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::action::Action;
use super::diff::Diff;
use crate::error::AuditResult;
use crate::models::{ActorId, AuditRecordId};

/// An audit record that has not been assigned an id yet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewAuditRecord {
    /// Acting principal; `None` means anonymous or system-triggered
    pub user_id: Option<ActorId>,

    /// Tracked entity type
    pub model_name: String,

    /// Primary key of the affected entity at the time of the event
    pub model_id: String,

    pub action: Action,

    /// JSON-encoded diff
    pub record: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl NewAuditRecord {
    /// Stamp a new record with the current time
    pub fn new(
        user_id: Option<ActorId>,
        model_name: impl Into<String>,
        model_id: impl Into<String>,
        action: Action,
        diff: &Diff,
    ) -> AuditResult<Self> {
        let now = Utc::now();
        Ok(Self {
            user_id,
            model_name: model_name.into(),
            model_id: model_id.into(),
            action,
            record: diff.to_json()?,
            created_at: now,
            updated_at: now,
        })
    }

    /// Attach the store-assigned id
    pub fn into_record(self, id: AuditRecordId) -> AuditRecord {
        AuditRecord { id, inner: self }
    }
}

/// A single persisted audit record
///
/// Immutable once written: fields are only reachable through accessors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    id: AuditRecordId,

    #[serde(flatten)]
    inner: NewAuditRecord,
}

impl AuditRecord {
    pub fn id(&self) -> AuditRecordId {
        self.id
    }

    pub fn actor_id(&self) -> Option<&ActorId> {
        self.inner.user_id.as_ref()
    }

    pub fn entity_type(&self) -> &str {
        &self.inner.model_name
    }

    pub fn entity_id(&self) -> &str {
        &self.inner.model_id
    }

    pub fn action(&self) -> Action {
        self.inner.action
    }

    /// The stored diff payload, exactly as written
    pub fn payload(&self) -> &str {
        &self.inner.record
    }

    /// Decode the stored diff
    pub fn diff(&self) -> AuditResult<Diff> {
        Diff::from_json(&self.inner.record)
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.inner.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.inner.updated_at
    }

    /// Format the record for human-readable output
    pub fn format_human_readable(&self) -> String {
        let actor = self
            .actor_id()
            .map(ActorId::to_string)
            .unwrap_or_else(|| "anonymous".to_string());

        format!(
            "[{}] {} {} {} by {}\n  Changes: {}",
            self.created_at().format("%Y-%m-%d %H:%M:%S UTC"),
            self.action().as_str().to_uppercase(),
            self.entity_type(),
            self.entity_id(),
            actor,
            self.payload()
        )
    }
}
