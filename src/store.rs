//! In-memory session store with per-identity mutual exclusion
//!
//! Each identity owns a slot guarded by its own async mutex. A turn holds the
//! slot's guard from load to save, so two messages from the same user are
//! processed one after the other while other users proceed in parallel. The
//! map lock is only taken to find or create a slot, never across a turn.

use crate::state_machine::{DialogueState, Session};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};

type Slot = Arc<Mutex<Option<Session>>>;

/// Exclusive access to one identity's session for the duration of a turn.
/// `None` until the first save.
pub type SessionGuard = OwnedMutexGuard<Option<Session>>;

/// Every identity that writes keeps a slot until [`SessionStore::prune_idle`]
/// drops it, so memory grows with the number of distinct senders.
#[derive(Default)]
pub struct SessionStore {
    slots: RwLock<HashMap<String, Slot>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    async fn slot(&self, identity: &str) -> Slot {
        {
            let slots = self.slots.read().await;
            if let Some(slot) = slots.get(identity) {
                return Arc::clone(slot);
            }
        }
        let mut slots = self.slots.write().await;
        Arc::clone(slots.entry(identity.to_string()).or_default())
    }

    async fn existing_slot(&self, identity: &str) -> Option<Slot> {
        self.slots.read().await.get(identity).cloned()
    }

    /// Lock an identity's slot, creating it if needed. Waits for any turn
    /// already in progress for the same identity.
    pub async fn lock(&self, identity: &str) -> SessionGuard {
        self.slot(identity).await.lock_owned().await
    }

    /// Snapshot of the last saved session. Does not create a slot.
    pub async fn get(&self, identity: &str) -> Option<Session> {
        let slot = self.existing_slot(identity).await?;
        let guard = slot.lock().await;
        guard.clone()
    }

    /// Insert or replace the session stored under `session.identity`
    #[allow(dead_code)] // API completeness
    pub async fn upsert(&self, session: Session) {
        let mut guard = self.lock(&session.identity).await;
        *guard = Some(session);
    }

    /// Restart an identity's dialogue, keeping its language and credential.
    /// Returns false if there is nothing to reset.
    pub async fn reset(&self, identity: &str) -> bool {
        let Some(slot) = self.existing_slot(identity).await else {
            return false;
        };
        let mut guard = slot.lock().await;
        match guard.as_mut() {
            Some(session) => {
                session.reset();
                session.touch();
                true
            }
            None => false,
        }
    }

    /// Drop slots that hold nothing worth keeping: never saved, or still at
    /// `Entry` with no credentials and untouched for `max_idle`. Slots that
    /// anyone else holds (a running or pending turn) are kept. Returns the
    /// number of slots removed.
    pub async fn prune_idle(&self, max_idle: Duration) -> usize {
        let Some(cutoff) = chrono::Duration::from_std(max_idle)
            .ok()
            .and_then(|idle| Utc::now().checked_sub_signed(idle))
        else {
            return 0;
        };

        let mut slots = self.slots.write().await;
        let before = slots.len();
        slots.retain(|_, slot| {
            if Arc::strong_count(slot) > 1 {
                return true;
            }
            let Ok(guard) = slot.try_lock() else {
                return true;
            };
            guard.as_ref().is_some_and(|session| {
                session.state != DialogueState::Entry
                    || session.registered
                    || session.is_authenticated()
                    || session.updated_at >= cutoff
            })
        });
        before - slots.len()
    }

    /// Number of identities with a slot
    pub async fn count(&self) -> usize {
        self.slots.read().await.len()
    }
}
