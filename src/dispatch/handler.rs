//! Capture pipeline and lifecycle handlers
//!
//! A `CaptureHandler` is attached to the host's notification mechanism for one
//! tracked type and one action. When the host fires it, the handler runs the
//! whole pipeline inline: extract snapshots, redact, diff, resolve the actor,
//! write.

use std::sync::Arc;

use crate::actor::ActorResolver;
use crate::audit::{Action, AuditRecord, AuditWriter, DiffGenerator, Redactor};
use crate::config::{AuditSettings, FailurePolicy, Watchers};
use crate::error::{AuditError, AuditResult};
use crate::models::{Auditable, Snapshot};
use crate::storage::AuditStore;

use super::registry::{Registry, TrackedEntityType};

/// Reacts to one lifecycle notification for one entity
pub trait LifecycleHandler: Send + Sync {
    fn handle(&self, entity: &dyn Auditable) -> AuditResult<()>;
}

/// The host's lifecycle-notification mechanism
///
/// Handlers must be invoked synchronously, in the context that fired the
/// notification.
pub trait LifecycleSource {
    fn attach(&mut self, entity_type: &str, action: Action, handler: Arc<dyn LifecycleHandler>);
}

/// Shared, read-only pipeline components
pub struct Pipeline {
    watchers: Watchers,
    on_failure: FailurePolicy,
    redactor: Redactor,
    generator: DiffGenerator,
    actor: Arc<dyn ActorResolver>,
    writer: AuditWriter,
}

impl Pipeline {
    pub fn new(
        settings: &AuditSettings,
        actor: Arc<dyn ActorResolver>,
        store: Arc<dyn AuditStore>,
    ) -> Self {
        Self {
            watchers: settings.watchers,
            on_failure: settings.on_failure,
            redactor: Redactor::new(settings.discards.clone()),
            generator: DiffGenerator::new(settings),
            actor,
            writer: AuditWriter::new(store),
        }
    }

    /// Capture one event
    ///
    /// Returns `None` when capture for the event's action is switched off, in
    /// which case nothing is written.
    pub fn capture(
        &self,
        action: Action,
        tracked: &TrackedEntityType,
        entity: &dyn Auditable,
    ) -> AuditResult<Option<AuditRecord>> {
        if entity.entity_type() != tracked.name {
            return Err(AuditError::Configuration(format!(
                "Handler for `{}` received a `{}` entity",
                tracked.name,
                entity.entity_type()
            )));
        }

        // Update may still turn into a restore, so it is only gated once the delta is known
        if action != Action::Update && !self.watchers.is_enabled(action) {
            return Ok(None);
        }

        let (old, new) = match action {
            Action::Create => (Snapshot::new(), entity.attributes()),
            Action::Update => (entity.original(), entity.changes()),
            Action::Delete => (entity.attributes(), Snapshot::new()),
            Action::Restore => (entity.original(), Snapshot::new()),
        };
        let old = self.redactor.filter(tracked, old);
        let new = self.redactor.filter(tracked, new);

        let effective = DiffGenerator::effective_action(action, &new);
        if !self.watchers.is_enabled(effective) {
            tracing::debug!(model = %tracked.name, action = %effective, "capture disabled, skipping");
            return Ok(None);
        }

        let diff = self.generator.generate(action, &old, &new)?;
        let entity_id = entity.entity_key();

        let record = self.writer.write(
            self.actor.current_actor(),
            &tracked.name,
            &entity_id,
            action,
            &diff,
        )?;

        tracing::debug!(
            model = %tracked.name,
            model_id = %entity_id,
            action = %effective,
            record_id = %record.id(),
            fields = diff.len(),
            "captured audit record"
        );

        Ok(Some(record))
    }

    /// Apply the failure policy to a capture error
    fn settle(&self, tracked: &TrackedEntityType, action: Action, err: AuditError) -> AuditResult<()> {
        match self.on_failure {
            FailurePolicy::LogAndContinue if !err.is_configuration() => {
                tracing::error!(
                    model = %tracked.name,
                    action = %action,
                    error = %err,
                    "audit capture failed, continuing"
                );
                Ok(())
            }
            _ => Err(err),
        }
    }
}

/// Handler bound to one tracked type and one action
pub struct CaptureHandler {
    action: Action,
    tracked: Arc<TrackedEntityType>,
    pipeline: Arc<Pipeline>,
}

impl CaptureHandler {
    pub fn new(action: Action, tracked: Arc<TrackedEntityType>, pipeline: Arc<Pipeline>) -> Self {
        Self {
            action,
            tracked,
            pipeline,
        }
    }

    pub fn action(&self) -> Action {
        self.action
    }

    pub fn tracked(&self) -> &TrackedEntityType {
        &self.tracked
    }
}

impl LifecycleHandler for CaptureHandler {
    fn handle(&self, entity: &dyn Auditable) -> AuditResult<()> {
        match self.pipeline.capture(self.action, &self.tracked, entity) {
            Ok(_) => Ok(()),
            Err(err) => self.pipeline.settle(&self.tracked, self.action, err),
        }
    }
}

/// Attach capture handlers for every tracked type and enabled action
///
/// Each of create, update and delete is gated by its own watcher flag.
/// Restores have no subscription of their own: they ride on the update
/// handler and are gated again inside the pipeline. Returns the number of
/// handlers attached.
pub fn subscribe(
    pipeline: &Arc<Pipeline>,
    registry: &Registry,
    source: &mut dyn LifecycleSource,
) -> usize {
    let watchers = pipeline.watchers;
    let mut attached = 0;

    for tracked in registry.iter() {
        for action in [Action::Create, Action::Update, Action::Delete] {
            if !watchers.is_enabled(action) {
                continue;
            }

            let handler = CaptureHandler::new(action, Arc::clone(tracked), Arc::clone(pipeline));
            source.attach(&tracked.name, action, Arc::new(handler));
            attached += 1;
        }
    }

    tracing::debug!(models = registry.len(), handlers = attached, "audit handlers attached");
    attached
}
