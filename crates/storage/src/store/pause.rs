#![forbid(unsafe_code)]

use super::thoughts::thought_by_id;
use super::{SqliteStore, StoreError, ThoughtRow, now_ms};
use rusqlite::params;
use sm_core::model::ThoughtStatus;

impl SqliteStore {
    /// Suspends a thought, capturing the caller's opaque execution snapshot
    /// verbatim. Last write wins: the previous snapshot is replaced, also
    /// when the new one is absent. Only active or paused thoughts may be
    /// paused; completed and abandoned thoughts are settled history.
    pub fn pause_thought(
        &mut self,
        thought_id: i64,
        execution_state_json: Option<String>,
    ) -> Result<ThoughtRow, StoreError> {
        let now_ms = now_ms();
        let tx = self.conn.transaction()?;

        let Some(thought) = thought_by_id(&tx, thought_id)? else {
            return Err(StoreError::NotFound("thought"));
        };
        if !thought.status.is_suspendable() {
            return Err(StoreError::ConstraintViolation(
                "only active or paused thoughts can be paused",
            ));
        }

        tx.execute(
            r#"
            UPDATE thoughts
            SET status = ?2, user_paused = 1, execution_state_json = ?3, updated_at_ms = ?4
            WHERE id = ?1
            "#,
            params![
                thought_id,
                ThoughtStatus::Paused.as_str(),
                execution_state_json,
                now_ms
            ],
        )?;

        let Some(row) = thought_by_id(&tx, thought_id)? else {
            return Err(StoreError::NotFound("thought"));
        };
        tx.commit()?;
        Ok(row)
    }

    /// Reactivates a thought and returns it with the stored snapshot so the
    /// caller can reconstruct where it left off. The snapshot is not cleared;
    /// a second resume returns the same state until the next pause.
    pub fn resume_thought(&mut self, thought_id: i64) -> Result<ThoughtRow, StoreError> {
        let now_ms = now_ms();
        let tx = self.conn.transaction()?;

        let Some(thought) = thought_by_id(&tx, thought_id)? else {
            return Err(StoreError::NotFound("thought"));
        };
        if !thought.status.is_suspendable() {
            return Err(StoreError::ConstraintViolation(
                "only active or paused thoughts can be resumed",
            ));
        }

        tx.execute(
            r#"
            UPDATE thoughts
            SET status = ?2, user_paused = 0, updated_at_ms = ?3
            WHERE id = ?1
            "#,
            params![thought_id, ThoughtStatus::Active.as_str(), now_ms],
        )?;

        let Some(row) = thought_by_id(&tx, thought_id)? else {
            return Err(StoreError::NotFound("thought"));
        };
        tx.commit()?;
        Ok(row)
    }
}
