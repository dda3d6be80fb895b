//! Registration table of tracked entity types
//!
//! Built once from settings and the host's declared entity types, then shared
//! read-only by every handler.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::config::AuditSettings;
use crate::models::EntityDescriptor;

/// One tracked entity type and its own exclusion list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedEntityType {
    pub name: String,
    pub discards: BTreeSet<String>,
}

impl TrackedEntityType {
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

/// Static table of tracked entity types, in configuration order
#[derive(Debug, Clone, Default)]
pub struct Registry {
    entries: Vec<Arc<TrackedEntityType>>,
}

impl Registry {
    /// Match configured model names against the types the host declares
    ///
    /// A configured name with no matching descriptor is skipped, as is a
    /// repeated name.
    pub fn build(settings: &AuditSettings, known: &[EntityDescriptor]) -> Self {
        let mut entries: Vec<Arc<TrackedEntityType>> = Vec::new();

        for model in &settings.models {
            if entries.iter().any(|e| &e.name == model) {
                continue;
            }

            let Some(descriptor) = known.iter().find(|d| &d.name == model) else {
                tracing::warn!(model = %model, "configured model is not a known entity type, skipping");
                continue;
            };

            let mut tracked = TrackedEntityType::new(model.clone())
                .with_discards(descriptor.discards.iter().cloned());
            if let Some(extra) = settings.discards_for(model) {
                tracked.discards.extend(extra.iter().cloned());
            }

            entries.push(Arc::new(tracked));
        }

        Self { entries }
    }

    pub fn get(&self, name: &str) -> Option<&Arc<TrackedEntityType>> {
        self.entries.iter().find(|e| e.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<TrackedEntityType>> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
