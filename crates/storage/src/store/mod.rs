#![forbid(unsafe_code)]

mod error;
mod pause;
mod plans;
mod requests;
mod schema;
mod sessions;
mod thoughts;
mod types;

pub use error::StoreError;
pub use requests::*;
pub use types::*;

use rusqlite::types::Type;
use rusqlite::{Connection, Row};
use sm_core::model::{PlanStatus, SessionStatus, ThoughtStatus};
use std::path::{Path, PathBuf};
use std::time::Duration;

const DB_FILE: &str = "stepmind.db";

#[derive(Debug)]
pub struct SqliteStore {
    conn: Connection,
    storage_dir: PathBuf,
}

impl SqliteStore {
    pub fn open(storage_dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let storage_dir = storage_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&storage_dir)?;

        let db_path = storage_dir.join(DB_FILE);
        let conn = Connection::open(db_path)?;
        conn.busy_timeout(Duration::from_secs(5))?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL; PRAGMA foreign_keys=ON;")?;

        schema::install_schema(&conn)?;

        Ok(Self { conn, storage_dir })
    }

    pub fn storage_dir(&self) -> &Path {
        &self.storage_dir
    }
}

fn now_ms() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}

fn corrupt_column(index: usize, name: &str) -> rusqlite::Error {
    rusqlite::Error::InvalidColumnType(index, name.to_string(), Type::Text)
}

// Column order: id, title, description, status, created_at_ms, updated_at_ms
fn map_session(row: &Row<'_>) -> rusqlite::Result<SessionRow> {
    let status_raw: String = row.get(3)?;
    Ok(SessionRow {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        status: SessionStatus::parse(&status_raw).ok_or_else(|| corrupt_column(3, "status"))?,
        created_at_ms: row.get(4)?,
        updated_at_ms: row.get(5)?,
    })
}

// Column order: id, session_id, thought_number, total_thoughts, content,
// next_thought_needed, is_revision, revises_thought_id,
// branch_from_thought_id, branch_id, needs_more_thoughts, status,
// user_paused, execution_state_json, created_at_ms, updated_at_ms
fn map_thought(row: &Row<'_>) -> rusqlite::Result<ThoughtRow> {
    let status_raw: String = row.get(11)?;
    Ok(ThoughtRow {
        id: row.get(0)?,
        session_id: row.get(1)?,
        thought_number: row.get(2)?,
        total_thoughts: row.get(3)?,
        content: row.get(4)?,
        next_thought_needed: row.get(5)?,
        is_revision: row.get(6)?,
        revises_thought_id: row.get(7)?,
        branch_from_thought_id: row.get(8)?,
        branch_id: row.get(9)?,
        needs_more_thoughts: row.get(10)?,
        status: ThoughtStatus::parse(&status_raw).ok_or_else(|| corrupt_column(11, "status"))?,
        user_paused: row.get(12)?,
        execution_state_json: row.get(13)?,
        created_at_ms: row.get(14)?,
        updated_at_ms: row.get(15)?,
    })
}

// Column order: id, session_id, parent_branch_id, label, created_at_ms
fn map_branch(row: &Row<'_>) -> rusqlite::Result<BranchRow> {
    Ok(BranchRow {
        id: row.get(0)?,
        session_id: row.get(1)?,
        parent_branch_id: row.get(2)?,
        label: row.get(3)?,
        created_at_ms: row.get(4)?,
    })
}

// Column order: id, session_id, thought_id, title, description, status,
// user_notified, created_at_ms, updated_at_ms
fn map_plan(row: &Row<'_>) -> rusqlite::Result<PlanRow> {
    let status_raw: String = row.get(5)?;
    Ok(PlanRow {
        id: row.get(0)?,
        session_id: row.get(1)?,
        thought_id: row.get(2)?,
        title: row.get(3)?,
        description: row.get(4)?,
        status: PlanStatus::parse(&status_raw).ok_or_else(|| corrupt_column(5, "status"))?,
        user_notified: row.get(6)?,
        created_at_ms: row.get(7)?,
        updated_at_ms: row.get(8)?,
    })
}

// Column order: id, plan_id, step_number, title, description,
// estimated_time, depends_on_json, assigned_to, priority, metadata_json,
// completed, created_at_ms, updated_at_ms
fn map_step(row: &Row<'_>) -> rusqlite::Result<StepRow> {
    let depends_on_raw: String = row.get(6)?;
    let depends_on_step_ids = serde_json::from_str::<Vec<i64>>(&depends_on_raw)
        .map_err(|_| corrupt_column(6, "depends_on_json"))?;
    Ok(StepRow {
        id: row.get(0)?,
        plan_id: row.get(1)?,
        step_number: row.get(2)?,
        title: row.get(3)?,
        description: row.get(4)?,
        estimated_time: row.get(5)?,
        depends_on_step_ids,
        assigned_to: row.get(7)?,
        priority: row.get(8)?,
        metadata_json: row.get(9)?,
        completed: row.get(10)?,
        created_at_ms: row.get(11)?,
        updated_at_ms: row.get(12)?,
    })
}
