//! Synchronous in-process lifecycle source
//!
//! For hosts that do not bring their own notification mechanism: the host
//! calls `fire` right after it mutates an entity, and the matching handlers run
//! on the same thread before `fire` returns.

use std::collections::HashMap;
use std::sync::Arc;

use crate::audit::Action;
use crate::error::AuditResult;
use crate::models::Auditable;

use super::handler::{LifecycleHandler, LifecycleSource};

/// Handlers keyed by entity type and action
#[derive(Default)]
pub struct HookTable {
    handlers: HashMap<(String, Action), Vec<Arc<dyn LifecycleHandler>>>,
}

impl HookTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run every handler attached for this entity's type and the action
    ///
    /// Handlers run in attach order. The first error stops the chain and is
    /// returned to the caller.
    pub fn fire(&self, action: Action, entity: &dyn Auditable) -> AuditResult<()> {
        let key = (entity.entity_type().to_string(), action);
        let Some(handlers) = self.handlers.get(&key) else {
            return Ok(());
        };

        for handler in handlers {
            handler.handle(entity)?;
        }

        Ok(())
    }

    /// Number of handlers attached for a type and action
    pub fn handler_count(&self, entity_type: &str, action: Action) -> usize {
        self.handlers
            .get(&(entity_type.to_string(), action))
            .map_or(0, Vec::len)
    }
}

impl LifecycleSource for HookTable {
    fn attach(&mut self, entity_type: &str, action: Action, handler: Arc<dyn LifecycleHandler>) {
        self.handlers
            .entry((entity_type.to_string(), action))
            .or_default()
            .push(handler);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::{Anonymous, SessionActor};
    use crate::audit::{AuditRecord, DiffEntry, NewAuditRecord};
    use crate::config::{AuditSettings, FailurePolicy, Watchers};
    use crate::dispatch::{subscribe, Pipeline, Registry};
    use crate::error::AuditError;
    use crate::models::{EntityDescriptor, FieldValue, Snapshot};
    use crate::storage::{AuditStore, MemoryStore};

    struct User {
        id: u64,
        attributes: Snapshot,
        original: Snapshot,
        changes: Snapshot,
    }

    impl User {
        fn new(id: u64, attributes: Snapshot) -> Self {
            Self {
                id,
                original: attributes.clone(),
                attributes,
                changes: Snapshot::new(),
            }
        }

        /// Apply a change the way an ORM save would
        fn save(&mut self, changes: Snapshot) {
            self.original = self.attributes.clone();
            for (field, value) in &changes {
                self.attributes.insert(field.clone(), value.clone());
            }
            self.changes = changes;
        }
    }

    impl Auditable for User {
        fn entity_type(&self) -> &str {
            "User"
        }

        fn entity_key(&self) -> String {
            self.id.to_string()
        }

        fn attributes(&self) -> Snapshot {
            self.attributes.clone()
        }

        fn original(&self) -> Snapshot {
            self.original.clone()
        }

        fn changes(&self) -> Snapshot {
            self.changes.clone()
        }
    }

    struct RejectingStore;

    impl AuditStore for RejectingStore {
        fn append(&self, _record: NewAuditRecord) -> AuditResult<AuditRecord> {
            Err(AuditError::WriteFailure("store unavailable".into()))
        }
    }

    fn settings() -> AuditSettings {
        AuditSettings {
            models: vec!["User".into()],
            discards: ["ssn".to_string()].into_iter().collect(),
            ..AuditSettings::default()
        }
    }

    fn wire(settings: AuditSettings, store: Arc<dyn AuditStore>) -> HookTable {
        let known = [EntityDescriptor::new("User").with_discards(["password"])];
        let registry = Registry::build(&settings, &known);
        let pipeline = Arc::new(Pipeline::new(&settings, Arc::new(Anonymous), store));

        let mut hooks = HookTable::new();
        subscribe(&pipeline, &registry, &mut hooks);
        hooks
    }

    fn alice() -> User {
        User::new(
            1,
            Snapshot::from_pairs([
                ("name", FieldValue::from("Alice")),
                ("ssn", "123".into()),
                ("status", "active".into()),
            ]),
        )
    }

    #[test]
    fn test_create_is_redacted() {
        let store = Arc::new(MemoryStore::new());
        let hooks = wire(settings(), store.clone());

        hooks.fire(Action::Create, &alice()).unwrap();

        let records = store.records().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].action(), Action::Create);
        assert_eq!(records[0].entity_type(), "User");
        assert_eq!(records[0].entity_id(), "1");
        assert!(records[0].actor_id().is_none());

        let diff = records[0].diff().unwrap();
        assert_eq!(diff.get("name"), Some(&DiffEntry::new(FieldValue::Null, "Alice")));
        assert!(diff.get("ssn").is_none());
    }

    #[test]
    fn test_update_records_only_changes() {
        let store = Arc::new(MemoryStore::new());
        let hooks = wire(settings(), store.clone());

        let mut user = alice();
        user.save(Snapshot::from_pairs([("status", "inactive")]));
        hooks.fire(Action::Update, &user).unwrap();

        let records = store.records().unwrap();
        assert_eq!(records[0].action(), Action::Update);
        assert_eq!(
            records[0].payload(),
            r#"{"status":{"old":"active","new":"inactive"}}"#
        );
    }

    #[test]
    fn test_restore_through_update_path() {
        let store = Arc::new(MemoryStore::new());
        let hooks = wire(settings(), store.clone());

        let mut user = User::new(1, Snapshot::from_pairs([("status", "deleted")]));
        user.save(Snapshot::new());
        hooks.fire(Action::Update, &user).unwrap();

        let records = store.records().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].action(), Action::Update);
        assert_eq!(
            records[0].diff().unwrap().get("status"),
            Some(&DiffEntry::new("deleted", "Data restored."))
        );
    }

    #[test]
    fn test_update_of_only_redacted_fields_is_captured_as_restore() {
        let store = Arc::new(MemoryStore::new());
        let hooks = wire(settings(), store.clone());

        let mut user = alice();
        user.save(Snapshot::from_pairs([("password", "new-hash")]));
        hooks.fire(Action::Update, &user).unwrap();

        let diff = store.records().unwrap()[0].diff().unwrap();
        assert_eq!(diff.get("status").unwrap().new, FieldValue::from("Data restored."));
    }

    #[test]
    fn test_delete() {
        let store = Arc::new(MemoryStore::new());
        let hooks = wire(settings(), store.clone());

        hooks.fire(Action::Delete, &alice()).unwrap();

        let diff = store.records().unwrap()[0].diff().unwrap();
        assert_eq!(diff.len(), 2);
        assert_eq!(diff.get("name"), Some(&DiffEntry::new("Alice", FieldValue::Null)));
    }

    #[test]
    fn test_disabled_watchers_write_nothing() {
        let store = Arc::new(MemoryStore::new());
        let mut settings = settings();
        settings.watchers = Watchers {
            create: false,
            update: true,
            delete: false,
            restore: false,
        };
        let hooks = wire(settings, store.clone());

        assert_eq!(hooks.handler_count("User", Action::Create), 0);
        assert_eq!(hooks.handler_count("User", Action::Update), 1);
        assert_eq!(hooks.handler_count("User", Action::Delete), 0);

        hooks.fire(Action::Create, &alice()).unwrap();
        hooks.fire(Action::Delete, &alice()).unwrap();

        let mut restored = alice();
        restored.save(Snapshot::new());
        hooks.fire(Action::Update, &restored).unwrap();

        assert!(store.is_empty());
    }

    #[test]
    fn test_update_disabled_ignores_restores() {
        let store = Arc::new(MemoryStore::new());
        let mut settings = settings();
        settings.watchers.update = false;
        settings.watchers.restore = true;
        let hooks = wire(settings, store.clone());

        assert_eq!(hooks.handler_count("User", Action::Update), 0);

        let mut user = alice();
        user.save(Snapshot::from_pairs([("status", "inactive")]));
        hooks.fire(Action::Update, &user).unwrap();

        user.save(Snapshot::new());
        hooks.fire(Action::Update, &user).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_explicit_restore_diffs_original_state() {
        let store = Arc::new(MemoryStore::new());
        let settings = settings();
        let registry = Registry::build(&settings, &[EntityDescriptor::new("User")]);
        let pipeline = Pipeline::new(&settings, Arc::new(Anonymous), store.clone());

        let mut user = User::new(1, Snapshot::from_pairs([("status", "deleted")]));
        user.save(Snapshot::from_pairs([("status", "active")]));

        let record = pipeline
            .capture(Action::Restore, registry.get("User").unwrap(), &user)
            .unwrap()
            .unwrap();
        assert_eq!(record.action(), Action::Restore);
        assert_eq!(
            record.diff().unwrap().get("status"),
            Some(&DiffEntry::new("deleted", "Data restored."))
        );
    }

    #[test]
    fn test_untracked_type_is_ignored() {
        let store = Arc::new(MemoryStore::new());
        let mut settings = settings();
        settings.models = vec!["Order".into()];
        let hooks = wire(settings, store.clone());

        hooks.fire(Action::Create, &alice()).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_missing_data_propagates_without_write() {
        let store = Arc::new(MemoryStore::new());
        let hooks = wire(settings(), store.clone());

        let mut user = alice();
        user.save(Snapshot::from_pairs([("status", "inactive")]));
        user.original = Snapshot::new();

        let err = hooks.fire(Action::Update, &user).unwrap_err();
        assert!(err.is_missing_data());
        assert!(store.is_empty());
    }

    #[test]
    fn test_write_failure_propagates() {
        let hooks = wire(settings(), Arc::new(RejectingStore));

        let err = hooks.fire(Action::Create, &alice()).unwrap_err();
        assert!(err.is_write_failure());
    }

    #[test]
    fn test_log_and_continue_swallows_write_failure() {
        let mut settings = settings();
        settings.on_failure = FailurePolicy::LogAndContinue;
        let hooks = wire(settings, Arc::new(RejectingStore));

        assert!(hooks.fire(Action::Create, &alice()).is_ok());
    }

    #[test]
    fn test_log_and_continue_still_propagates_configuration_errors() {
        let mut settings = settings();
        settings.on_failure = FailurePolicy::LogAndContinue;
        let registry = Registry::build(&settings, &[EntityDescriptor::new("User")]);
        let pipeline = Arc::new(Pipeline::new(
            &settings,
            Arc::new(Anonymous),
            Arc::new(MemoryStore::new()),
        ));

        // A handler bound to one type receiving another is a wiring defect
        let mut hooks = HookTable::new();
        let tracked = Arc::clone(registry.get("User").unwrap());
        hooks.attach(
            "Order",
            Action::Create,
            Arc::new(crate::dispatch::CaptureHandler::new(Action::Create, tracked, pipeline)),
        );

        struct Order;
        impl Auditable for Order {
            fn entity_type(&self) -> &str {
                "Order"
            }
            fn entity_key(&self) -> String {
                "o-1".into()
            }
            fn attributes(&self) -> Snapshot {
                Snapshot::from_pairs([("total", 10)])
            }
        }

        let err = hooks.fire(Action::Create, &Order).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_actor_resolved_at_write_time() {
        let store = Arc::new(MemoryStore::new());
        let session = Arc::new(SessionActor::new());
        let settings = settings();
        let registry = Registry::build(&settings, &[EntityDescriptor::new("User")]);
        let pipeline = Arc::new(Pipeline::new(&settings, session.clone(), store.clone()));
        let mut hooks = HookTable::new();
        subscribe(&pipeline, &registry, &mut hooks);

        hooks.fire(Action::Create, &alice()).unwrap();
        session.sign_in("admin");
        hooks.fire(Action::Delete, &alice()).unwrap();

        let records = store.records().unwrap();
        assert!(records[0].actor_id().is_none());
        assert_eq!(records[1].actor_id().map(|a| a.as_str()), Some("admin"));
    }

    #[test]
    fn test_concurrent_events_share_pipeline() {
        let store = Arc::new(MemoryStore::new());
        let hooks = Arc::new(wire(settings(), store.clone()));

        let handles: Vec<_> = (0..4)
            .map(|i| {
                let hooks = Arc::clone(&hooks);
                std::thread::spawn(move || {
                    let user = User::new(i, Snapshot::from_pairs([("name", format!("user-{}", i))]));
                    hooks.fire(Action::Create, &user).unwrap();
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(store.len(), 4);
    }
}
