#![forbid(unsafe_code)]

use super::StoreError;
use rusqlite::{Connection, params};

pub(in crate::store) fn install_schema(conn: &Connection) -> Result<(), StoreError> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS meta (
          key TEXT PRIMARY KEY,
          value TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS sessions (
          id TEXT PRIMARY KEY,
          title TEXT,
          description TEXT,
          status TEXT NOT NULL,
          created_at_ms INTEGER NOT NULL,
          updated_at_ms INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS thoughts (
          id INTEGER PRIMARY KEY AUTOINCREMENT,
          session_id TEXT NOT NULL REFERENCES sessions(id) ON DELETE CASCADE,
          thought_number INTEGER NOT NULL,
          total_thoughts INTEGER NOT NULL,
          content TEXT NOT NULL,
          next_thought_needed INTEGER NOT NULL,
          is_revision INTEGER NOT NULL,
          revises_thought_id INTEGER,
          branch_from_thought_id INTEGER,
          branch_id TEXT,
          needs_more_thoughts INTEGER NOT NULL,
          status TEXT NOT NULL,
          user_paused INTEGER NOT NULL,
          execution_state_json TEXT,
          created_at_ms INTEGER NOT NULL,
          updated_at_ms INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS branches (
          id TEXT NOT NULL,
          session_id TEXT NOT NULL REFERENCES sessions(id) ON DELETE CASCADE,
          parent_branch_id TEXT,
          label TEXT,
          created_at_ms INTEGER NOT NULL,
          PRIMARY KEY (session_id, id)
        );

        CREATE TABLE IF NOT EXISTS plans (
          id INTEGER PRIMARY KEY AUTOINCREMENT,
          session_id TEXT NOT NULL REFERENCES sessions(id) ON DELETE CASCADE,
          thought_id INTEGER NOT NULL,
          title TEXT NOT NULL,
          description TEXT,
          status TEXT NOT NULL,
          user_notified INTEGER NOT NULL,
          created_at_ms INTEGER NOT NULL,
          updated_at_ms INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS steps (
          id INTEGER PRIMARY KEY AUTOINCREMENT,
          plan_id INTEGER NOT NULL REFERENCES plans(id) ON DELETE CASCADE,
          step_number INTEGER NOT NULL,
          title TEXT NOT NULL,
          description TEXT,
          estimated_time TEXT,
          depends_on_json TEXT NOT NULL,
          assigned_to TEXT,
          priority TEXT,
          metadata_json TEXT,
          completed INTEGER NOT NULL,
          created_at_ms INTEGER NOT NULL,
          updated_at_ms INTEGER NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_thoughts_session ON thoughts(session_id, id);
        CREATE INDEX IF NOT EXISTS idx_thoughts_session_status ON thoughts(session_id, status);
        CREATE INDEX IF NOT EXISTS idx_plans_session_status ON plans(session_id, status);
        CREATE INDEX IF NOT EXISTS idx_steps_plan ON steps(plan_id, id);
        "#,
    )?;

    conn.execute(
        "INSERT OR IGNORE INTO meta(key, value) VALUES (?1, ?2)",
        params!["schema_version", "v1"],
    )?;

    Ok(())
}
