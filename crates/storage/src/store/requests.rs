#![forbid(unsafe_code)]

use sm_core::ids::{BranchId, SessionId};

#[derive(Clone, Debug)]
pub struct CreateSessionRequest {
    pub session_id: SessionId,
    pub title: Option<String>,
    pub description: Option<String>,
}

#[derive(Clone, Debug)]
pub struct AddThoughtRequest {
    pub session_id: SessionId,
    pub thought_number: i64,
    pub total_thoughts: i64,
    pub content: String,
    pub next_thought_needed: bool,
    pub is_revision: bool,
    pub revises_thought_id: Option<i64>,
    pub branch_from_thought_id: Option<i64>,
    pub branch_id: Option<BranchId>,
    /// Optional human label attached when the branch is first provisioned.
    pub branch_label: Option<String>,
    pub needs_more_thoughts: bool,
}

#[derive(Clone, Debug)]
pub struct CreatePlanRequest {
    pub session_id: SessionId,
    pub thought_id: i64,
    pub title: String,
    pub description: Option<String>,
}

#[derive(Clone, Debug)]
pub struct AddStepRequest {
    pub plan_id: i64,
    pub step_number: i64,
    pub title: String,
    pub description: Option<String>,
    pub estimated_time: Option<String>,
    pub depends_on_step_ids: Vec<i64>,
    pub assigned_to: Option<String>,
    pub priority: Option<String>,
    pub metadata_json: Option<String>,
}
