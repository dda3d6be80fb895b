//! Actor resolution
//!
//! The pipeline asks for the acting principal only when a record is about to
//! be written, so the recorded actor is whoever is signed in while the event
//! is being handled.

use std::sync::{PoisonError, RwLock};

use crate::models::ActorId;

/// Supplies the identity of the current acting principal
pub trait ActorResolver: Send + Sync {
    /// `None` when no authenticated principal exists
    fn current_actor(&self) -> Option<ActorId>;
}

impl<F> ActorResolver for F
where
    F: Fn() -> Option<ActorId> + Send + Sync,
{
    fn current_actor(&self) -> Option<ActorId> {
        self()
    }
}

/// Resolver for hosts without authentication
#[derive(Debug, Clone, Copy, Default)]
pub struct Anonymous;

impl ActorResolver for Anonymous {
    fn current_actor(&self) -> Option<ActorId> {
        None
    }
}

/// Principal slot set by the authentication layer
///
/// The slot is a single value, so a lock poisoned by a panicking thread is
/// recovered rather than reported as "nobody signed in".
#[derive(Debug, Default)]
pub struct SessionActor {
    current: RwLock<Option<ActorId>>,
}

impl SessionActor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sign_in(&self, actor: impl Into<ActorId>) {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Some(actor.into());
    }

    pub fn sign_out(&self) {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

impl ActorResolver for SessionActor {
    fn current_actor(&self) -> Option<ActorId> {
        self.current.read().unwrap_or_else(PoisonError::into_inner).clone()
    }
}
