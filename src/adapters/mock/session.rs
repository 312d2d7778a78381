use crate::domain::Actor;
use crate::ports::session::SessionContext as SessionContextTrait;
use async_trait::async_trait;
use std::sync::{Mutex, PoisonError};

/// Mock implementation of SessionContext
///
/// Holds the current actor and lets tests switch it between calls.
pub struct Session {
    actor: Mutex<Actor>,
}

impl Session {
    pub fn new() -> Self {
        Self::with_actor(Actor::Unauthenticated)
    }

    pub fn with_actor(actor: Actor) -> Self {
        Self {
            actor: Mutex::new(actor),
        }
    }

    /// Switch the signed-in actor for testing purposes
    pub fn set_actor(&self, actor: Actor) {
        *self.actor.lock().unwrap_or_else(PoisonError::into_inner) = actor;
    }

    pub fn sign_out(&self) {
        self.set_actor(Actor::Unauthenticated);
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionContextTrait for Session {
    async fn current_actor(&self) -> Actor {
        self.actor
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    async fn sign_in(&self, actor: Actor) {
        self.set_actor(actor);
    }
}
