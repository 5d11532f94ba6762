use std::path::Path;
use std::sync::Mutex;

use chrono::Utc;
use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::models::Session;

use super::{SessionStore, StoreError};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS triage_sessions (
    id          TEXT PRIMARY KEY,
    locale      TEXT NOT NULL,
    turn_index  INTEGER NOT NULL,
    envelope_type TEXT,
    stop_reason   TEXT,
    state       TEXT NOT NULL,
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS triage_events (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    session_id  TEXT NOT NULL,
    turn_index  INTEGER NOT NULL,
    event_type  TEXT NOT NULL,
    payload     TEXT NOT NULL,
    created_at  TEXT NOT NULL,
    UNIQUE(session_id, turn_index, event_type)
);
CREATE INDEX IF NOT EXISTS idx_events_session ON triage_events(session_id, id);
";

/// SQLite-backed session store. The full session state is kept as a JSON
/// column; a few fields are denormalized for ad-hoc queries.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        Self::from_connection(conn)
    }

    /// In-memory database, for tests.
    pub fn open_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch("PRAGMA journal_mode=DELETE; PRAGMA foreign_keys=ON;")?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Event `(turn_index, event_type)` pairs for a session, append order.
    pub fn event_types_for(&self, session_id: Uuid) -> Result<Vec<(u32, String)>, StoreError> {
        let conn = self.conn.lock().map_err(|_| StoreError::LockPoisoned)?;
        let mut stmt = conn.prepare(
            "SELECT turn_index, event_type FROM triage_events WHERE session_id = ?1 ORDER BY id ASC",
        )?;
        let rows = stmt.query_map(params![session_id.to_string()], |row| {
            Ok((row.get::<_, u32>(0)?, row.get::<_, String>(1)?))
        })?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }
}

impl SessionStore for SqliteStore {
    fn load(&self, session_id: Uuid) -> Result<Option<Session>, StoreError> {
        let conn = self.conn.lock().map_err(|_| StoreError::LockPoisoned)?;
        let result = conn.query_row(
            "SELECT state FROM triage_sessions WHERE id = ?1",
            params![session_id.to_string()],
            |row| row.get::<_, String>(0),
        );
        match result {
            Ok(state) => Ok(Some(serde_json::from_str(&state)?)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, session: &Session) -> Result<(), StoreError> {
        let state = serde_json::to_string(session)?;
        let conn = self.conn.lock().map_err(|_| StoreError::LockPoisoned)?;
        conn.execute(
            "INSERT INTO triage_sessions
                 (id, locale, turn_index, envelope_type, stop_reason, state, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             ON CONFLICT(id) DO UPDATE SET
                 turn_index = excluded.turn_index,
                 envelope_type = excluded.envelope_type,
                 stop_reason = excluded.stop_reason,
                 state = excluded.state,
                 updated_at = excluded.updated_at",
            params![
                session.session_id.to_string(),
                session.locale,
                session.turn_index,
                session.envelope_type.map(|t| t.as_str()),
                session.stop_reason.map(|r| r.as_str()),
                state,
                session.created_at.to_rfc3339(),
                session.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    fn append_event(
        &self,
        session_id: Uuid,
        turn_index: u32,
        event_type: &str,
        payload: &serde_json::Value,
    ) -> Result<(), StoreError> {
        let conn = self.conn.lock().map_err(|_| StoreError::LockPoisoned)?;
        conn.execute(
            "INSERT OR IGNORE INTO triage_events
                 (session_id, turn_index, event_type, payload, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                session_id.to_string(),
                turn_index,
                event_type,
                payload.to_string(),
                Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    fn create_id(&self) -> Uuid {
        Uuid::new_v4()
    }
}
