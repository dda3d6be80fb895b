//! The capability a host entity must expose to be audited

use std::collections::BTreeSet;

use super::snapshot::Snapshot;

/// An entity whose lifecycle events can be captured
///
/// Implemented by the host's model types. The pipeline never touches the
/// entity beyond these accessors.
pub trait Auditable {
    /// Type identifier, matched against the configured model list
    fn entity_type(&self) -> &str;

    /// Primary-key value at the time of the event
    fn entity_key(&self) -> String;

    /// Full current attribute state
    fn attributes(&self) -> Snapshot;

    /// Attribute state before the pending change was applied
    fn original(&self) -> Snapshot {
        self.attributes()
    }

    /// Only the fields the last save actually changed
    fn changes(&self) -> Snapshot {
        Snapshot::new()
    }
}

/// Host-declared description of an entity type
///
/// Registration only tracks types the host declares, so a configured model
/// name without a descriptor is skipped.
#[derive(Debug, Clone, Default)]
pub struct EntityDescriptor {
    pub name: String,
    /// Fields this type never wants recorded
    pub discards: BTreeSet<String>,
}

impl EntityDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            discards: BTreeSet::new(),
        }
    }

    pub fn with_discards<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.discards.extend(fields.into_iter().map(Into::into));
        self
    }
}
