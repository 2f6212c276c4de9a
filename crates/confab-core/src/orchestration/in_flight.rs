//! Per-conversation in-flight tracking.
//!
//! At most one response may be pending per conversation; independent
//! conversations never block each other.

use std::sync::Arc;

use dashmap::DashMap;
use uuid::Uuid;

/// Set of conversations with a response in progress.
#[derive(Debug, Clone, Default)]
pub struct InFlightRegistry {
    active: Arc<DashMap<Uuid, ()>>,
}

impl InFlightRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `conversation_id` busy. Returns `None` if it already is.
    ///
    /// The slot is released when the returned guard drops.
    pub fn try_acquire(&self, conversation_id: Uuid) -> Option<InFlightGuard> {
        use dashmap::mapref::entry::Entry;
        match self.active.entry(conversation_id) {
            Entry::Occupied(_) => None,
            Entry::Vacant(slot) => {
                slot.insert(());
                Some(InFlightGuard {
                    active: self.active.clone(),
                    conversation_id,
                })
            }
        }
    }

    pub fn is_in_flight(&self, conversation_id: &Uuid) -> bool {
        self.active.contains_key(conversation_id)
    }

}

/// Releases the in-flight slot on drop.
#[derive(Debug)]
pub struct InFlightGuard {
    active: Arc<DashMap<Uuid, ()>>,
    conversation_id: Uuid,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.active.remove(&self.conversation_id);
    }
}
