#![forbid(unsafe_code)]

use sm_core::model::{PlanStatus, SessionStatus, ThoughtStatus};

#[derive(Clone, Debug)]
pub struct SessionRow {
    pub id: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: SessionStatus,
    pub created_at_ms: i64,
    pub updated_at_ms: i64,
}

#[derive(Clone, Debug)]
pub struct ThoughtRow {
    pub id: i64,
    pub session_id: String,
    /// Caller-declared display position. Not unique, not monotonic; all
    /// internal ordering uses the store-assigned `id`.
    pub thought_number: i64,
    pub total_thoughts: i64,
    pub content: String,
    pub next_thought_needed: bool,
    pub is_revision: bool,
    pub revises_thought_id: Option<i64>,
    pub branch_from_thought_id: Option<i64>,
    pub branch_id: Option<String>,
    pub needs_more_thoughts: bool,
    pub status: ThoughtStatus,
    pub user_paused: bool,
    /// Opaque caller-defined snapshot; stored and returned verbatim.
    pub execution_state_json: Option<String>,
    pub created_at_ms: i64,
    pub updated_at_ms: i64,
}

#[derive(Clone, Debug)]
pub struct BranchRow {
    pub id: String,
    pub session_id: String,
    pub parent_branch_id: Option<String>,
    pub label: Option<String>,
    pub created_at_ms: i64,
}

/// A branch plus the derived count of thoughts carrying its id.
#[derive(Clone, Debug)]
pub struct BranchActivity {
    pub branch: BranchRow,
    pub thought_count: i64,
}

/// Result of appending a thought. The implicit branch provision is part of
/// the result rather than a hidden side-table write.
#[derive(Clone, Debug)]
pub struct ThoughtAppended {
    pub thought: ThoughtRow,
    pub new_branch: Option<BranchRow>,
}

#[derive(Clone, Debug)]
pub struct PlanRow {
    pub id: i64,
    pub session_id: String,
    /// The thought this plan was derived from. Informational only.
    pub thought_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub status: PlanStatus,
    pub user_notified: bool,
    pub created_at_ms: i64,
    pub updated_at_ms: i64,
}

#[derive(Clone, Debug)]
pub struct StepRow {
    pub id: i64,
    pub plan_id: i64,
    pub step_number: i64,
    pub title: String,
    pub description: Option<String>,
    pub estimated_time: Option<String>,
    pub depends_on_step_ids: Vec<i64>,
    pub assigned_to: Option<String>,
    pub priority: Option<String>,
    pub metadata_json: Option<String>,
    pub completed: bool,
    pub created_at_ms: i64,
    pub updated_at_ms: i64,
}

impl StepRow {
    /// Denormalized status mirror of the `completed` flag.
    pub fn status(&self) -> &'static str {
        if self.completed { "completed" } else { "pending" }
    }
}

/// Step update plus the parent plan after rollup recomputation.
#[derive(Clone, Debug)]
pub struct StepCompletionOutcome {
    pub step: StepRow,
    pub plan: PlanRow,
}
