//! Event subscription and dispatch
//!
//! Bridges the host's lifecycle notifications to the capture pipeline. The
//! registration table and the pipeline are built once and never mutated, so
//! handlers can run concurrently on whatever threads the host uses.

mod handler;
mod hooks;
mod registry;

pub use handler::{subscribe, CaptureHandler, LifecycleHandler, LifecycleSource, Pipeline};
pub use hooks::HookTable;
pub use registry::{Registry, TrackedEntityType};
