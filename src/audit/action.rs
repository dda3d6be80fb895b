//! Lifecycle actions that can be audited

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AuditError;

/// Types of lifecycle actions that can be audited
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// Entity was created
    Create,
    /// Entity was updated
    Update,
    /// Entity was deleted
    Delete,
    /// Soft-deleted entity was brought back
    Restore,
}

impl Action {
    pub const ALL: [Action; 4] = [Action::Create, Action::Update, Action::Delete, Action::Restore];

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Create => "create",
            Action::Update => "update",
            Action::Delete => "delete",
            Action::Restore => "restore",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = AuditError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "create" => Ok(Action::Create),
            "update" => Ok(Action::Update),
            "delete" => Ok(Action::Delete),
            "restore" => Ok(Action::Restore),
            other => Err(AuditError::Configuration(format!(
                "Unknown action `{}`.",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_and_parse() {
        for action in Action::ALL {
            assert_eq!(action.to_string().parse::<Action>().unwrap(), action);
        }
        assert_eq!(Action::Update.to_string(), "update");
    }

    #[test]
    fn test_unknown_action_is_configuration_error() {
        let err = "archive".parse::<Action>().unwrap_err();
        assert!(err.is_configuration());
        assert_eq!(err.to_string(), "Configuration error: Unknown action `archive`.");
    }

    #[test]
    fn test_serde_lowercase() {
        assert_eq!(serde_json::to_string(&Action::Restore).unwrap(), "\"restore\"");
        assert!(serde_json::from_str::<Action>("\"Create\"").is_err());
    }
}
