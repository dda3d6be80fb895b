//! Configuration module
//!
//! Static settings for the capture pipeline: which models are tracked, which
//! actions are captured, which fields are redacted, and the failure policy.

pub mod settings;

pub use settings::{AuditSettings, FailurePolicy, Messages, Watchers};
