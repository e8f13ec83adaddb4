#![forbid(unsafe_code)]

use super::time::ts_ms_to_rfc3339;
use serde_json::{Value, json};
use sm_storage::{BranchActivity, PlanRow, SessionRow, StepRow, ThoughtRow};

pub(crate) fn session_json(row: &SessionRow) -> Value {
    json!({
        "id": row.id,
        "title": row.title,
        "description": row.description,
        "status": row.status.as_str(),
        "created_at": ts_ms_to_rfc3339(row.created_at_ms),
        "updated_at": ts_ms_to_rfc3339(row.updated_at_ms),
    })
}

pub(crate) fn thought_json(row: &ThoughtRow) -> Value {
    json!({
        "id": row.id,
        "session_id": row.session_id,
        "thought_number": row.thought_number,
        "total_thoughts": row.total_thoughts,
        "content": row.content,
        "next_thought_needed": row.next_thought_needed,
        "is_revision": row.is_revision,
        "revises_thought_id": row.revises_thought_id,
        "branch_from_thought_id": row.branch_from_thought_id,
        "branch_id": row.branch_id,
        "needs_more_thoughts": row.needs_more_thoughts,
        "status": row.status.as_str(),
        "user_paused": row.user_paused,
        "execution_state": execution_state_json(row),
        "created_at": ts_ms_to_rfc3339(row.created_at_ms),
        "updated_at": ts_ms_to_rfc3339(row.updated_at_ms),
    })
}

// The snapshot was accepted as JSON, so it normally parses back; anything
// else is surfaced as the raw string rather than dropped.
fn execution_state_json(row: &ThoughtRow) -> Value {
    match row.execution_state_json.as_deref() {
        None => Value::Null,
        Some(text) => serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string())),
    }
}

pub(crate) fn branch_json(activity: &BranchActivity) -> Value {
    json!({
        "id": activity.branch.id,
        "session_id": activity.branch.session_id,
        "parent_branch_id": activity.branch.parent_branch_id,
        "label": activity.branch.label,
        "thought_count": activity.thought_count,
        "created_at": ts_ms_to_rfc3339(activity.branch.created_at_ms),
    })
}

pub(crate) fn plan_json(row: &PlanRow) -> Value {
    json!({
        "id": row.id,
        "session_id": row.session_id,
        "thought_id": row.thought_id,
        "title": row.title,
        "description": row.description,
        "status": row.status.as_str(),
        "user_notified": row.user_notified,
        "created_at": ts_ms_to_rfc3339(row.created_at_ms),
        "updated_at": ts_ms_to_rfc3339(row.updated_at_ms),
    })
}

pub(crate) fn step_json(row: &StepRow) -> Value {
    let metadata = match row.metadata_json.as_deref() {
        None => Value::Null,
        Some(text) => serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string())),
    };
    json!({
        "id": row.id,
        "plan_id": row.plan_id,
        "step_number": row.step_number,
        "title": row.title,
        "description": row.description,
        "estimated_time": row.estimated_time,
        "depends_on_step_ids": row.depends_on_step_ids,
        "assigned_to": row.assigned_to,
        "priority": row.priority,
        "metadata": metadata,
        "completed": row.completed,
        "status": row.status(),
        "created_at": ts_ms_to_rfc3339(row.created_at_ms),
        "updated_at": ts_ms_to_rfc3339(row.updated_at_ms),
    })
}
