#![forbid(unsafe_code)]

use super::sessions::{session_by_id, touch_session};
use super::{
    AddThoughtRequest, BranchActivity, BranchRow, SqliteStore, StoreError, ThoughtAppended,
    ThoughtRow, map_branch, map_thought, now_ms,
};
use rusqlite::{Connection, OptionalExtension, params};
use sm_core::model::ThoughtStatus;

impl SqliteStore {
    /// Appends a thought to a session. A fresh `branch_id` provisions its
    /// branch row in the same transaction and surfaces it in the result.
    pub fn add_thought(&mut self, request: AddThoughtRequest) -> Result<ThoughtAppended, StoreError> {
        let AddThoughtRequest {
            session_id,
            thought_number,
            total_thoughts,
            content,
            next_thought_needed,
            is_revision,
            revises_thought_id,
            branch_from_thought_id,
            branch_id,
            branch_label,
            needs_more_thoughts,
        } = request;

        if content.trim().is_empty() {
            return Err(StoreError::ConstraintViolation("content must not be empty"));
        }
        if thought_number < 1 {
            return Err(StoreError::ConstraintViolation("thought_number must be >= 1"));
        }
        if total_thoughts < 1 {
            return Err(StoreError::ConstraintViolation("total_thoughts must be >= 1"));
        }

        let now_ms = now_ms();
        let tx = self.conn.transaction()?;

        if session_by_id(&tx, session_id.as_str())?.is_none() {
            return Err(StoreError::NotFound("session"));
        }

        if let Some(revises_id) = revises_thought_id {
            check_same_session_thought(
                &tx,
                session_id.as_str(),
                revises_id,
                "revises_thought_id references an unknown thought",
                "revises_thought_id references a thought in another session",
            )?;
        }
        if let Some(branch_from_id) = branch_from_thought_id {
            check_same_session_thought(
                &tx,
                session_id.as_str(),
                branch_from_id,
                "branch_from_thought_id references an unknown thought",
                "branch_from_thought_id references a thought in another session",
            )?;
        }

        let new_branch = match branch_id.as_ref() {
            Some(branch_id) => {
                provision_branch(&tx, session_id.as_str(), branch_id.as_str(), branch_label, now_ms)?
            }
            None => None,
        };

        tx.execute(
            r#"
            INSERT INTO thoughts(
              session_id, thought_number, total_thoughts, content,
              next_thought_needed, is_revision, revises_thought_id,
              branch_from_thought_id, branch_id, needs_more_thoughts,
              status, user_paused, execution_state_json, created_at_ms, updated_at_ms
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, 0, NULL, ?12, ?12)
            "#,
            params![
                session_id.as_str(),
                thought_number,
                total_thoughts,
                content,
                next_thought_needed,
                is_revision,
                revises_thought_id,
                branch_from_thought_id,
                branch_id.as_ref().map(|b| b.as_str()),
                needs_more_thoughts,
                ThoughtStatus::Active.as_str(),
                now_ms
            ],
        )?;
        let thought_id = tx.last_insert_rowid();

        touch_session(&tx, session_id.as_str(), now_ms)?;

        let Some(thought) = thought_by_id(&tx, thought_id)? else {
            return Err(StoreError::NotFound("thought"));
        };
        tx.commit()?;
        Ok(ThoughtAppended { thought, new_branch })
    }

    /// All thoughts of a session in insertion order. `thought_number` is a
    /// display hint and never used for ordering.
    pub fn session_thoughts(&self, session_id: &str) -> Result<Vec<ThoughtRow>, StoreError> {
        if session_by_id(&self.conn, session_id)?.is_none() {
            return Err(StoreError::NotFound("session"));
        }
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, session_id, thought_number, total_thoughts, content,
                   next_thought_needed, is_revision, revises_thought_id,
                   branch_from_thought_id, branch_id, needs_more_thoughts,
                   status, user_paused, execution_state_json, created_at_ms, updated_at_ms
            FROM thoughts
            WHERE session_id = ?1
            ORDER BY id ASC
            "#,
        )?;
        let rows = stmt.query_map(params![session_id], map_thought)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// The resumption anchor: where reasoning was left off. Active thoughts
    /// win over paused ones; ties go to the most recently updated.
    pub fn active_thought(&self, session_id: &str) -> Result<ThoughtRow, StoreError> {
        if session_by_id(&self.conn, session_id)?.is_none() {
            return Err(StoreError::NotFound("session"));
        }
        self.conn
            .query_row(
                r#"
                SELECT id, session_id, thought_number, total_thoughts, content,
                       next_thought_needed, is_revision, revises_thought_id,
                       branch_from_thought_id, branch_id, needs_more_thoughts,
                       status, user_paused, execution_state_json, created_at_ms, updated_at_ms
                FROM thoughts
                WHERE session_id = ?1 AND status IN (?2, ?3)
                ORDER BY CASE status WHEN ?2 THEN 0 ELSE 1 END,
                         updated_at_ms DESC, id DESC
                LIMIT 1
                "#,
                params![
                    session_id,
                    ThoughtStatus::Active.as_str(),
                    ThoughtStatus::Paused.as_str()
                ],
                map_thought,
            )
            .optional()?
            .ok_or(StoreError::NotFound("thought"))
    }

    /// True iff some thought still demands continuation and was not paused by
    /// the user. User intent wins: a user-paused thought never auto-resumes.
    pub fn needs_continued_thinking(&self, session_id: &str) -> Result<bool, StoreError> {
        if session_by_id(&self.conn, session_id)?.is_none() {
            return Err(StoreError::NotFound("session"));
        }
        let found: Option<i64> = self
            .conn
            .query_row(
                r#"
                SELECT 1 FROM thoughts
                WHERE session_id = ?1
                  AND next_thought_needed = 1
                  AND status IN (?2, ?3)
                  AND user_paused = 0
                LIMIT 1
                "#,
                params![
                    session_id,
                    ThoughtStatus::Active.as_str(),
                    ThoughtStatus::Paused.as_str()
                ],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    /// Branches of a session with derived thought counts, oldest first.
    pub fn session_branches(&self, session_id: &str) -> Result<Vec<BranchActivity>, StoreError> {
        if session_by_id(&self.conn, session_id)?.is_none() {
            return Err(StoreError::NotFound("session"));
        }
        let mut stmt = self.conn.prepare(
            r#"
            SELECT b.id, b.session_id, b.parent_branch_id, b.label, b.created_at_ms,
                   (SELECT COUNT(*) FROM thoughts t
                    WHERE t.session_id = b.session_id AND t.branch_id = b.id)
            FROM branches b
            WHERE b.session_id = ?1
            ORDER BY b.created_at_ms ASC, b.id ASC
            "#,
        )?;
        let rows = stmt.query_map(params![session_id], |row| {
            let branch = map_branch(row)?;
            let thought_count: i64 = row.get(5)?;
            Ok(BranchActivity {
                branch,
                thought_count,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }
}

pub(in crate::store) fn thought_by_id(
    conn: &Connection,
    thought_id: i64,
) -> Result<Option<ThoughtRow>, StoreError> {
    Ok(conn
        .query_row(
            r#"
            SELECT id, session_id, thought_number, total_thoughts, content,
                   next_thought_needed, is_revision, revises_thought_id,
                   branch_from_thought_id, branch_id, needs_more_thoughts,
                   status, user_paused, execution_state_json, created_at_ms, updated_at_ms
            FROM thoughts
            WHERE id = ?1
            "#,
            params![thought_id],
            map_thought,
        )
        .optional()?)
}

fn check_same_session_thought(
    conn: &Connection,
    session_id: &str,
    thought_id: i64,
    missing: &'static str,
    cross_session: &'static str,
) -> Result<(), StoreError> {
    let Some(referenced) = thought_by_id(conn, thought_id)? else {
        return Err(StoreError::InvalidReference(missing));
    };
    if referenced.session_id != session_id {
        return Err(StoreError::InvalidReference(cross_session));
    }
    Ok(())
}

fn provision_branch(
    conn: &Connection,
    session_id: &str,
    branch_id: &str,
    label: Option<String>,
    now_ms: i64,
) -> Result<Option<BranchRow>, StoreError> {
    let existing = conn
        .query_row(
            r#"
            SELECT id, session_id, parent_branch_id, label, created_at_ms
            FROM branches
            WHERE session_id = ?1 AND id = ?2
            "#,
            params![session_id, branch_id],
            map_branch,
        )
        .optional()?;
    if existing.is_some() {
        return Ok(None);
    }

    conn.execute(
        r#"
        INSERT INTO branches(id, session_id, parent_branch_id, label, created_at_ms)
        VALUES (?1, ?2, NULL, ?3, ?4)
        "#,
        params![branch_id, session_id, label.as_deref(), now_ms],
    )?;

    Ok(Some(BranchRow {
        id: branch_id.to_string(),
        session_id: session_id.to_string(),
        parent_branch_id: None,
        label,
        created_at_ms: now_ms,
    }))
}
