#![forbid(unsafe_code)]

use super::{CreateSessionRequest, SessionRow, SqliteStore, StoreError, map_session, now_ms};
use rusqlite::{Connection, OptionalExtension, params};
use sm_core::model::{SessionStatus, ThoughtStatus};

impl SqliteStore {
    pub fn create_session(
        &mut self,
        request: CreateSessionRequest,
    ) -> Result<SessionRow, StoreError> {
        let CreateSessionRequest {
            session_id,
            title,
            description,
        } = request;

        let now_ms = now_ms();
        let tx = self.conn.transaction()?;

        if session_by_id(&tx, session_id.as_str())?.is_some() {
            return Err(StoreError::AlreadyExists("session"));
        }

        tx.execute(
            r#"
            INSERT INTO sessions(id, title, description, status, created_at_ms, updated_at_ms)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                session_id.as_str(),
                title,
                description,
                SessionStatus::Active.as_str(),
                now_ms,
                now_ms
            ],
        )?;

        let Some(row) = session_by_id(&tx, session_id.as_str())? else {
            return Err(StoreError::NotFound("session"));
        };
        tx.commit()?;
        Ok(row)
    }

    pub fn get_session(&self, session_id: &str) -> Result<SessionRow, StoreError> {
        session_by_id(&self.conn, session_id)?.ok_or(StoreError::NotFound("session"))
    }

    /// Marks the session completed and cascades `active → completed` to its
    /// thoughts. Paused and abandoned thoughts are left untouched; completing
    /// an already-completed session is a no-op.
    pub fn complete_session(&mut self, session_id: &str) -> Result<SessionRow, StoreError> {
        let now_ms = now_ms();
        let tx = self.conn.transaction()?;

        let Some(session) = session_by_id(&tx, session_id)? else {
            return Err(StoreError::NotFound("session"));
        };
        if session.status == SessionStatus::Completed {
            tx.commit()?;
            return Ok(session);
        }

        tx.execute(
            "UPDATE sessions SET status = ?2, updated_at_ms = ?3 WHERE id = ?1",
            params![session_id, SessionStatus::Completed.as_str(), now_ms],
        )?;
        // One-directional cascade, guarded on the source status.
        tx.execute(
            r#"
            UPDATE thoughts SET status = ?2, updated_at_ms = ?3
            WHERE session_id = ?1 AND status = ?4
            "#,
            params![
                session_id,
                ThoughtStatus::Completed.as_str(),
                now_ms,
                ThoughtStatus::Active.as_str()
            ],
        )?;

        let Some(row) = session_by_id(&tx, session_id)? else {
            return Err(StoreError::NotFound("session"));
        };
        tx.commit()?;
        Ok(row)
    }
}

pub(in crate::store) fn session_by_id(
    conn: &Connection,
    session_id: &str,
) -> Result<Option<SessionRow>, StoreError> {
    Ok(conn
        .query_row(
            r#"
            SELECT id, title, description, status, created_at_ms, updated_at_ms
            FROM sessions
            WHERE id = ?1
            "#,
            params![session_id],
            map_session,
        )
        .optional()?)
}

pub(in crate::store) fn touch_session(
    conn: &Connection,
    session_id: &str,
    now_ms: i64,
) -> Result<(), StoreError> {
    conn.execute(
        "UPDATE sessions SET updated_at_ms = ?2 WHERE id = ?1",
        params![session_id, now_ms],
    )?;
    Ok(())
}
