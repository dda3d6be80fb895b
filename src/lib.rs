//! entity-audit - automatic audit trail for entity lifecycle changes
//!
//! Hooks into a host's lifecycle notifications and records one immutable
//! audit record per create, update, delete, or restore of a tracked entity,
//! with a redacted before/after diff and the acting principal.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Static settings (tracked models, watchers, discards, messages)
//! - `error`: Error taxonomy
//! - `models`: Field values, snapshots, identifiers, the `Auditable` capability
//! - `audit`: Redaction, diff generation, audit records and the writer
//! - `actor`: Resolution of the acting principal
//! - `storage`: Append-only audit stores
//! - `dispatch`: Registration table, capture handlers and subscription
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use entity_audit::{
//!     actor::SessionActor, config::AuditSettings, dispatch::*, models::EntityDescriptor,
//!     storage::JsonlStore,
//! };
//!
//! let settings = AuditSettings::load("audit.yaml")?;
//! let registry = Registry::build(&settings, &[EntityDescriptor::new("User").with_discards(["password"])]);
//! let pipeline = Arc::new(Pipeline::new(
//!     &settings,
//!     Arc::new(SessionActor::new()),
//!     Arc::new(JsonlStore::new("audit_logs.jsonl")),
//! ));
//!
//! let mut hooks = HookTable::new();
//! subscribe(&pipeline, &registry, &mut hooks);
//!
//! // after the host saves an entity
//! hooks.fire(Action::Update, &user)?;
//! ```

pub mod actor;
pub mod audit;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod models;
pub mod storage;

pub use error::{AuditError, AuditResult};
