//! Change capture for audited entities
//!
//! Turns one lifecycle event into one persisted audit record.
//!
//! # Architecture
//!
//! - `Action`: the lifecycle action being captured.
//! - `Redactor`: strips excluded fields from snapshots.
//! - `DiffGenerator`: builds the per-field `{old, new}` diff for an action.
//! - `AuditRecord`: the immutable persisted unit.
//! - `AuditWriter`: stamps and appends records through an `AuditStore`.
//!
//! # Example
//!
//! ```rust,ignore
//! use entity_audit::audit::{Action, DiffGenerator, Redactor, AuditWriter};
//!
//! let old = redactor.filter(&tracked, entity.original());
//! let new = redactor.filter(&tracked, entity.changes());
//! let diff = generator.generate(Action::Update, &old, &new)?;
//! writer.write(actor.current_actor(), "User", &entity.entity_key(), Action::Update, &diff)?;
//! ```

mod action;
mod diff;
mod record;
mod redact;
mod writer;

pub use action::Action;
pub use diff::{Diff, DiffEntry, DiffGenerator};
pub use record::{AuditRecord, NewAuditRecord};
pub use redact::Redactor;
pub use writer::AuditWriter;
