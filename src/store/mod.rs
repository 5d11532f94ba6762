pub mod memory;
pub mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use thiserror::Error;
use uuid::Uuid;

use crate::models::Session;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Session state could not be (de)serialized: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid enum value for {field}: {value}")]
    InvalidEnum { field: String, value: String },

    #[error("Store lock poisoned")]
    LockPoisoned,
}

/// The only persistence contract the core imposes.
///
/// Guarantees required from implementations:
/// - read-your-writes for a single session,
/// - events of one session are totally ordered,
/// - event append is idempotent by `(session_id, turn_index, event_type)`.
pub trait SessionStore: Send + Sync {
    fn load(&self, session_id: Uuid) -> Result<Option<Session>, StoreError>;

    fn save(&self, session: &Session) -> Result<(), StoreError>;

    fn append_event(
        &self,
        session_id: Uuid,
        turn_index: u32,
        event_type: &str,
        payload: &serde_json::Value,
    ) -> Result<(), StoreError>;

    fn create_id(&self) -> Uuid;
}
