//! Core data models for audit capture
//!
//! Scalar values, attribute snapshots, identifiers, and the `Auditable`
//! capability host entities implement.

pub mod entity;
pub mod ids;
pub mod snapshot;
pub mod value;

pub use entity::{Auditable, EntityDescriptor};
pub use ids::{ActorId, AuditRecordId};
pub use snapshot::Snapshot;
pub use value::FieldValue;
