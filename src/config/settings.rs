//! Static audit settings
//!
//! Loaded once at process start and shared read-only with every pipeline
//! component afterwards.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::audit::Action;
use crate::error::{AuditError, AuditResult};

/// Per-action capture switches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Watchers {
    #[serde(default = "enabled")]
    pub create: bool,
    #[serde(default = "enabled")]
    pub update: bool,
    #[serde(default = "enabled")]
    pub delete: bool,
    #[serde(default = "enabled")]
    pub restore: bool,
}

impl Default for Watchers {
    fn default() -> Self {
        Self {
            create: true,
            update: true,
            delete: true,
            restore: true,
        }
    }
}

impl Watchers {
    /// Whether capture is switched on for the given action
    pub fn is_enabled(&self, action: Action) -> bool {
        match action {
            Action::Create => self.create,
            Action::Update => self.update,
            Action::Delete => self.delete,
            Action::Restore => self.restore,
        }
    }
}

/// Text substituted into diffs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Messages {
    /// New value recorded for every field when a soft-deleted row comes back
    #[serde(default = "default_restore_message")]
    pub restore_softdeleted: String,
}

impl Default for Messages {
    fn default() -> Self {
        Self {
            restore_softdeleted: default_restore_message(),
        }
    }
}

/// What a lifecycle handler does when capture fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Return the error to the host, which may abort the triggering mutation
    #[default]
    Propagate,
    /// Log missing-data and write failures, let the mutation proceed
    LogAndContinue,
}

/// Audit settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuditSettings {
    /// Tracked entity type identifiers, in registration order
    #[serde(default)]
    pub models: Vec<String>,

    #[serde(default)]
    pub watchers: Watchers,

    /// Fields stripped from every snapshot
    #[serde(default)]
    pub discards: BTreeSet<String>,

    #[serde(default)]
    pub messages: Messages,

    /// Extra exclusions for individual entity types, on top of what the type declares
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub model_discards: BTreeMap<String, BTreeSet<String>>,

    #[serde(default)]
    pub on_failure: FailurePolicy,
}

fn enabled() -> bool {
    true
}

fn default_restore_message() -> String {
    "Data restored.".to_string()
}

impl AuditSettings {
    /// Parse settings from a JSON document
    pub fn from_json_str(contents: &str) -> AuditResult<Self> {
        serde_json::from_str(contents)
            .map_err(|e| AuditError::Configuration(format!("Failed to parse settings: {}", e)))
    }

    /// Parse settings from a YAML document
    pub fn from_yaml_str(contents: &str) -> AuditResult<Self> {
        serde_yaml::from_str(contents)
            .map_err(|e| AuditError::Configuration(format!("Failed to parse settings: {}", e)))
    }

    /// Load settings from disk
    ///
    /// `.yaml` and `.yml` files are read as YAML, anything else as JSON.
    pub fn load(path: impl AsRef<Path>) -> AuditResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AuditError::Configuration(format!(
                "Failed to read settings file {}: {}",
                path.display(),
                e
            ))
        })?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml_str(&contents),
            _ => Self::from_json_str(&contents),
        }
    }

    /// Configured extra exclusions for one entity type
    pub fn discards_for(&self, model: &str) -> Option<&BTreeSet<String>> {
        self.model_discards.get(model)
    }
}
