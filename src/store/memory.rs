use std::collections::{BTreeSet, HashMap};
use std::sync::RwLock;

use uuid::Uuid;

use crate::models::Session;

use super::{SessionStore, StoreError};

/// One appended event, kept for inspection in tests and debugging.
#[derive(Debug, Clone)]
pub struct StoredEvent {
    pub session_id: Uuid,
    pub turn_index: u32,
    pub event_type: String,
    pub payload: serde_json::Value,
}

/// In-memory store: sessions by id plus an append-only event log.
#[derive(Debug, Default)]
pub struct MemoryStore {
    sessions: RwLock<HashMap<Uuid, Session>>,
    events: RwLock<Vec<StoredEvent>>,
    seen_events: RwLock<BTreeSet<(Uuid, u32, String)>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// All events for a session, in append order.
    pub fn events_for(&self, session_id: Uuid) -> Vec<StoredEvent> {
        self.events
            .read()
            .map(|events| {
                events
                    .iter()
                    .filter(|e| e.session_id == session_id)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl SessionStore for MemoryStore {
    fn load(&self, session_id: Uuid) -> Result<Option<Session>, StoreError> {
        let sessions = self.sessions.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(sessions.get(&session_id).cloned())
    }

    fn save(&self, session: &Session) -> Result<(), StoreError> {
        let mut sessions = self.sessions.write().map_err(|_| StoreError::LockPoisoned)?;
        sessions.insert(session.session_id, session.clone());
        Ok(())
    }

    fn append_event(
        &self,
        session_id: Uuid,
        turn_index: u32,
        event_type: &str,
        payload: &serde_json::Value,
    ) -> Result<(), StoreError> {
        let key = (session_id, turn_index, event_type.to_string());
        let mut seen = self.seen_events.write().map_err(|_| StoreError::LockPoisoned)?;
        if !seen.insert(key) {
            return Ok(()); // idempotent retry
        }
        let mut events = self.events.write().map_err(|_| StoreError::LockPoisoned)?;
        events.push(StoredEvent {
            session_id,
            turn_index,
            event_type: event_type.to_string(),
            payload: payload.clone(),
        });
        Ok(())
    }

    fn create_id(&self) -> Uuid {
        Uuid::new_v4()
    }
}
