//! Listener and validator registration.

use crate::ContentStore;
use std::sync::{Arc, PoisonError, RwLock};
use syncpub_types::{ContentItem, ItemStatus, StatusTransition};
use tracing::debug;

/// Receives store notifications.
///
/// Both callbacks run on the writer's thread after the write is committed.
/// `store` is the store that emitted the notification; listeners that act on
/// it re-enter that store and may trigger further notifications.
pub trait ContentListener: Send + Sync {
    fn on_status_transition(&self, store: &dyn ContentStore, transition: &StatusTransition) {
        let _ = (store, transition);
    }

    /// Called after a hard delete with the item as it was before removal.
    fn on_item_deleted(&self, store: &dyn ContentStore, item: &ContentItem) {
        let _ = (store, item);
    }
}

/// Vetoes status changes before they are written.
///
/// Return `Err(reason)` to reject the change.
pub trait TransitionValidator: Send + Sync {
    fn validate(&self, item: &ContentItem, new_status: &ItemStatus) -> Result<(), String>;
}

/// Registered listeners and validators for one store.
#[derive(Default)]
pub struct Hooks {
    listeners: RwLock<Vec<Arc<dyn ContentListener>>>,
    validators: RwLock<Vec<Arc<dyn TransitionValidator>>>,
}

impl Hooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, listener: Arc<dyn ContentListener>) {
        self.listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(listener);
    }

    pub fn add_validator(&self, validator: Arc<dyn TransitionValidator>) {
        self.validators
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(validator);
    }

    /// Runs every validator; the first rejection wins.
    pub fn validate(&self, item: &ContentItem, new_status: &ItemStatus) -> Result<(), String> {
        for validator in self.validators_snapshot() {
            validator.validate(item, new_status)?;
        }
        Ok(())
    }

    pub fn notify_transition(&self, store: &dyn ContentStore, transition: &StatusTransition) {
        let listeners = self.listeners_snapshot();
        debug!(
            "Notifying {} listener(s): {} {} -> {}",
            listeners.len(),
            transition.item.id,
            transition.old_status,
            transition.new_status
        );
        for listener in listeners {
            listener.on_status_transition(store, transition);
        }
    }

    pub fn notify_deleted(&self, store: &dyn ContentStore, item: &ContentItem) {
        for listener in self.listeners_snapshot() {
            listener.on_item_deleted(store, item);
        }
    }

    // Snapshots keep the registry unlocked while callbacks run, so a listener
    // may subscribe or trigger nested notifications.
    fn listeners_snapshot(&self) -> Vec<Arc<dyn ContentListener>> {
        self.listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn validators_snapshot(&self) -> Vec<Arc<dyn TransitionValidator>> {
        self.validators
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
