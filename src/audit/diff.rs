//! Diff generation for audit records
//!
//! Turns the redacted before/after snapshots of one lifecycle event into a
//! field-by-field `{old, new}` mapping. Each action has its own rule; restores
//! arrive through the update path with an empty `new` snapshot.

use std::collections::btree_map::{self, BTreeMap};

use serde::{Deserialize, Serialize};

use super::action::Action;
use crate::config::{AuditSettings, Watchers};
use crate::error::{AuditError, AuditResult};
use crate::models::{FieldValue, Snapshot};

/// One field's transition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiffEntry {
    pub old: FieldValue,
    pub new: FieldValue,
}

impl DiffEntry {
    pub fn new(old: impl Into<FieldValue>, new: impl Into<FieldValue>) -> Self {
        Self {
            old: old.into(),
            new: new.into(),
        }
    }
}

/// Field name -> transition, as stored in the `record` column
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Diff(BTreeMap<String, DiffEntry>);

impl Diff {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: impl Into<String>, entry: DiffEntry) {
        self.0.insert(field.into(), entry);
    }

    pub fn get(&self, field: &str) -> Option<&DiffEntry> {
        self.0.get(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, DiffEntry> {
        self.0.iter()
    }

    /// Encode as the JSON text payload stored with the record
    ///
    /// JSON has no NaN or infinity, so a non-finite float is refused rather
    /// than silently written as `null`.
    pub fn to_json(&self) -> AuditResult<String> {
        for (field, entry) in &self.0 {
            if !entry.old.is_finite() || !entry.new.is_finite() {
                return Err(AuditError::Json(format!(
                    "Field `{}` holds a non-finite float",
                    field
                )));
            }
        }

        Ok(serde_json::to_string(self)?)
    }

    /// Decode a stored payload back into a diff
    pub fn from_json(payload: &str) -> AuditResult<Self> {
        Ok(serde_json::from_str(payload)?)
    }
}

impl FromIterator<(String, DiffEntry)> for Diff {
    fn from_iter<I: IntoIterator<Item = (String, DiffEntry)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Builds diffs according to the per-action capture rules
#[derive(Debug, Clone)]
pub struct DiffGenerator {
    watchers: Watchers,
    restore_message: String,
}

impl DiffGenerator {
    pub fn new(settings: &AuditSettings) -> Self {
        Self {
            watchers: settings.watchers,
            restore_message: settings.messages.restore_softdeleted.clone(),
        }
    }

    /// Generate the diff for one event
    ///
    /// A disabled watcher yields an empty diff without looking at the data.
    /// For updates the restore check runs first: an empty `new` means the row
    /// came back from a soft delete, not that data is missing.
    pub fn generate(&self, action: Action, old: &Snapshot, new: &Snapshot) -> AuditResult<Diff> {
        match action {
            Action::Create => self.create(new),
            Action::Update if new.is_empty() => Ok(self.restore(old)),
            Action::Update => self.update(old, new),
            Action::Restore => Ok(self.restore(old)),
            Action::Delete => self.delete(old),
        }
    }

    /// Which capture an event falls under once its snapshots are known
    pub fn effective_action(action: Action, new: &Snapshot) -> Action {
        match action {
            Action::Update if new.is_empty() => Action::Restore,
            other => other,
        }
    }

    fn create(&self, new: &Snapshot) -> AuditResult<Diff> {
        if !self.watchers.create {
            return Ok(Diff::new());
        }
        if new.is_empty() {
            return Err(AuditError::missing_data(
                Action::Create,
                "expects new data",
            ));
        }

        Ok(new
            .iter()
            .map(|(field, value)| (field.clone(), DiffEntry::new(FieldValue::Null, value.clone())))
            .collect())
    }

    fn update(&self, old: &Snapshot, new: &Snapshot) -> AuditResult<Diff> {
        if !self.watchers.update {
            return Ok(Diff::new());
        }
        if old.is_empty() || new.is_empty() {
            return Err(AuditError::missing_data(
                Action::Update,
                "expects both old and new data",
            ));
        }

        // Fields absent from the original (e.g. newly added columns) record a null old value
        Ok(new
            .iter()
            .map(|(field, value)| {
                let previous = old.get(field).cloned().unwrap_or_default();
                (field.clone(), DiffEntry::new(previous, value.clone()))
            })
            .collect())
    }

    fn restore(&self, old: &Snapshot) -> Diff {
        if !self.watchers.restore {
            return Diff::new();
        }

        old.iter()
            .map(|(field, value)| {
                (
                    field.clone(),
                    DiffEntry::new(value.clone(), self.restore_message.as_str()),
                )
            })
            .collect()
    }

    fn delete(&self, old: &Snapshot) -> AuditResult<Diff> {
        if !self.watchers.delete {
            return Ok(Diff::new());
        }
        if old.is_empty() {
            return Err(AuditError::missing_data(
                Action::Delete,
                "expects old data",
            ));
        }

        Ok(old
            .iter()
            .map(|(field, value)| (field.clone(), DiffEntry::new(value.clone(), FieldValue::Null)))
            .collect())
    }
}
