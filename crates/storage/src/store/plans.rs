#![forbid(unsafe_code)]

use super::sessions::session_by_id;
use super::thoughts::thought_by_id;
use super::{
    AddStepRequest, CreatePlanRequest, PlanRow, SqliteStore, StepCompletionOutcome, StepRow,
    StoreError, map_plan, map_step, now_ms,
};
use rusqlite::{Connection, OptionalExtension, params};
use sm_core::model::PlanStatus;

impl SqliteStore {
    pub fn create_execution_plan(
        &mut self,
        request: CreatePlanRequest,
    ) -> Result<PlanRow, StoreError> {
        let CreatePlanRequest {
            session_id,
            thought_id,
            title,
            description,
        } = request;

        if title.trim().is_empty() {
            return Err(StoreError::ConstraintViolation("title must not be empty"));
        }

        let now_ms = now_ms();
        let tx = self.conn.transaction()?;

        if session_by_id(&tx, session_id.as_str())?.is_none() {
            return Err(StoreError::NotFound("session"));
        }
        let Some(thought) = thought_by_id(&tx, thought_id)? else {
            return Err(StoreError::NotFound("thought"));
        };
        if thought.session_id != session_id.as_str() {
            return Err(StoreError::InvalidReference(
                "thought belongs to another session",
            ));
        }

        tx.execute(
            r#"
            INSERT INTO plans(session_id, thought_id, title, description, status, user_notified,
                              created_at_ms, updated_at_ms)
            VALUES (?1, ?2, ?3, ?4, ?5, 0, ?6, ?6)
            "#,
            params![
                session_id.as_str(),
                thought_id,
                title,
                description,
                PlanStatus::Draft.as_str(),
                now_ms
            ],
        )?;
        let plan_id = tx.last_insert_rowid();

        let Some(plan) = plan_by_id(&tx, plan_id)? else {
            return Err(StoreError::NotFound("plan"));
        };
        tx.commit()?;
        Ok(plan)
    }

    /// Inserts a step. Dependencies must name steps already created under the
    /// same plan, so callers add steps in dependency order.
    pub fn add_execution_step(&mut self, request: AddStepRequest) -> Result<StepRow, StoreError> {
        let AddStepRequest {
            plan_id,
            step_number,
            title,
            description,
            estimated_time,
            depends_on_step_ids,
            assigned_to,
            priority,
            metadata_json,
        } = request;

        if title.trim().is_empty() {
            return Err(StoreError::ConstraintViolation("title must not be empty"));
        }
        if step_number < 1 {
            return Err(StoreError::ConstraintViolation("step_number must be >= 1"));
        }

        let now_ms = now_ms();
        let tx = self.conn.transaction()?;

        if plan_by_id(&tx, plan_id)?.is_none() {
            return Err(StoreError::NotFound("plan"));
        }

        for dep_id in &depends_on_step_ids {
            let Some(dep) = step_by_id(&tx, *dep_id)? else {
                return Err(StoreError::InvalidReference(
                    "depends_on_step_ids references a step that does not exist yet",
                ));
            };
            if dep.plan_id != plan_id {
                return Err(StoreError::InvalidReference(
                    "depends_on_step_ids references a step of another plan",
                ));
            }
        }

        let depends_on_json = serde_json::to_string(&depends_on_step_ids)
            .map_err(|_| StoreError::ConstraintViolation("depends_on_step_ids is not encodable"))?;

        tx.execute(
            r#"
            INSERT INTO steps(plan_id, step_number, title, description, estimated_time,
                              depends_on_json, assigned_to, priority, metadata_json,
                              completed, created_at_ms, updated_at_ms)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, 0, ?10, ?10)
            "#,
            params![
                plan_id,
                step_number,
                title,
                description,
                estimated_time,
                depends_on_json,
                assigned_to,
                priority,
                metadata_json,
                now_ms
            ],
        )?;
        let step_id = tx.last_insert_rowid();

        let Some(step) = step_by_id(&tx, step_id)? else {
            return Err(StoreError::NotFound("step"));
        };
        tx.commit()?;
        Ok(step)
    }

    /// `draft → ready`, re-arming the notification flag. An empty plan is
    /// legal. Finalizing an already-ready plan is a no-op; plans that moved
    /// past `ready` cannot be re-armed.
    pub fn finalize_execution_plan(&mut self, plan_id: i64) -> Result<PlanRow, StoreError> {
        let now_ms = now_ms();
        let tx = self.conn.transaction()?;

        let Some(plan) = plan_by_id(&tx, plan_id)? else {
            return Err(StoreError::NotFound("plan"));
        };
        match plan.status {
            PlanStatus::Draft => {}
            PlanStatus::Ready => {
                tx.commit()?;
                return Ok(plan);
            }
            _ => {
                return Err(StoreError::ConstraintViolation(
                    "only draft plans can be finalized",
                ));
            }
        }

        tx.execute(
            r#"
            UPDATE plans SET status = ?2, user_notified = 0, updated_at_ms = ?3
            WHERE id = ?1
            "#,
            params![plan_id, PlanStatus::Ready.as_str(), now_ms],
        )?;

        let Some(plan) = plan_by_id(&tx, plan_id)? else {
            return Err(StoreError::NotFound("plan"));
        };
        tx.commit()?;
        Ok(plan)
    }

    /// The notification inbox: ready plans not yet delivered, newest first.
    pub fn ready_plans_for_notification(
        &self,
        session_id: &str,
    ) -> Result<Vec<PlanRow>, StoreError> {
        if session_by_id(&self.conn, session_id)?.is_none() {
            return Err(StoreError::NotFound("session"));
        }
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, session_id, thought_id, title, description, status, user_notified,
                   created_at_ms, updated_at_ms
            FROM plans
            WHERE session_id = ?1 AND status = ?2 AND user_notified = 0
            ORDER BY created_at_ms DESC, id DESC
            "#,
        )?;
        let rows = stmt.query_map(params![session_id, PlanStatus::Ready.as_str()], map_plan)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Steps of a plan in insertion order, which is also dependency order.
    pub fn plan_steps(&self, plan_id: i64) -> Result<Vec<StepRow>, StoreError> {
        if plan_by_id(&self.conn, plan_id)?.is_none() {
            return Err(StoreError::NotFound("plan"));
        }
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, plan_id, step_number, title, description, estimated_time,
                   depends_on_json, assigned_to, priority, metadata_json,
                   completed, created_at_ms, updated_at_ms
            FROM steps
            WHERE plan_id = ?1
            ORDER BY id ASC
            "#,
        )?;
        let rows = stmt.query_map(params![plan_id], map_step)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn mark_plan_notified(&mut self, plan_id: i64) -> Result<PlanRow, StoreError> {
        let now_ms = now_ms();
        let tx = self.conn.transaction()?;

        let Some(plan) = plan_by_id(&tx, plan_id)? else {
            return Err(StoreError::NotFound("plan"));
        };
        if plan.user_notified {
            tx.commit()?;
            return Ok(plan);
        }

        tx.execute(
            "UPDATE plans SET user_notified = 1, updated_at_ms = ?2 WHERE id = ?1",
            params![plan_id, now_ms],
        )?;

        let Some(plan) = plan_by_id(&tx, plan_id)? else {
            return Err(StoreError::NotFound("plan"));
        };
        tx.commit()?;
        Ok(plan)
    }

    /// Flips a step's completion flag and recomputes the parent plan on the
    /// completing path: all steps done makes the plan `completed`, otherwise
    /// a `ready` plan moves to `in_progress`. Un-completing never reverts
    /// plan status.
    pub fn update_step_completion(
        &mut self,
        step_id: i64,
        completed: bool,
    ) -> Result<StepCompletionOutcome, StoreError> {
        let now_ms = now_ms();
        let tx = self.conn.transaction()?;

        let Some(step) = step_by_id(&tx, step_id)? else {
            return Err(StoreError::NotFound("step"));
        };

        tx.execute(
            "UPDATE steps SET completed = ?2, updated_at_ms = ?3 WHERE id = ?1",
            params![step_id, completed, now_ms],
        )?;

        if completed {
            let remaining: i64 = tx.query_row(
                "SELECT COUNT(*) FROM steps WHERE plan_id = ?1 AND completed = 0",
                params![step.plan_id],
                |row| row.get(0),
            )?;
            let Some(plan) = plan_by_id(&tx, step.plan_id)? else {
                return Err(StoreError::NotFound("plan"));
            };
            let next_status = if remaining == 0 {
                Some(PlanStatus::Completed)
            } else if plan.status == PlanStatus::Ready {
                Some(PlanStatus::InProgress)
            } else {
                None
            };
            if let Some(next_status) = next_status {
                tx.execute(
                    "UPDATE plans SET status = ?2, updated_at_ms = ?3 WHERE id = ?1",
                    params![step.plan_id, next_status.as_str(), now_ms],
                )?;
            }
        }

        let Some(step) = step_by_id(&tx, step_id)? else {
            return Err(StoreError::NotFound("step"));
        };
        let Some(plan) = plan_by_id(&tx, step.plan_id)? else {
            return Err(StoreError::NotFound("plan"));
        };
        tx.commit()?;
        Ok(StepCompletionOutcome { step, plan })
    }
}

pub(in crate::store) fn plan_by_id(
    conn: &Connection,
    plan_id: i64,
) -> Result<Option<PlanRow>, StoreError> {
    Ok(conn
        .query_row(
            r#"
            SELECT id, session_id, thought_id, title, description, status, user_notified,
                   created_at_ms, updated_at_ms
            FROM plans
            WHERE id = ?1
            "#,
            params![plan_id],
            map_plan,
        )
        .optional()?)
}

pub(in crate::store) fn step_by_id(
    conn: &Connection,
    step_id: i64,
) -> Result<Option<StepRow>, StoreError> {
    Ok(conn
        .query_row(
            r#"
            SELECT id, plan_id, step_number, title, description, estimated_time,
                   depends_on_json, assigned_to, priority, metadata_json,
                   completed, created_at_ms, updated_at_ms
            FROM steps
            WHERE id = ?1
            "#,
            params![step_id],
            map_step,
        )
        .optional()?)
}
