#![forbid(unsafe_code)]

use sm_core::ids::SessionId;
use sm_core::model::PlanStatus;
use sm_storage::{
    AddStepRequest, AddThoughtRequest, CreatePlanRequest, CreateSessionRequest, SqliteStore,
    StoreError,
};
use std::path::PathBuf;

fn temp_dir(test_name: &str) -> PathBuf {
    let base = std::env::temp_dir();
    let pid = std::process::id();
    let nonce = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis();
    let dir = base.join(format!("sm_storage_{test_name}_{pid}_{nonce}"));
    std::fs::create_dir_all(&dir).expect("create temp dir");
    dir
}

fn session_id(value: &str) -> SessionId {
    SessionId::try_new(value).expect("session id")
}

fn step(plan_id: i64, number: i64, depends_on: Vec<i64>) -> AddStepRequest {
    AddStepRequest {
        plan_id,
        step_number: number,
        title: format!("step {number}"),
        description: None,
        estimated_time: None,
        depends_on_step_ids: depends_on,
        assigned_to: None,
        priority: None,
        metadata_json: None,
    }
}

/// Store with one session ("s1") holding one concluded thought; returns the
/// thought id plans are derived from.
fn open_with_terminal_thought(dir: &PathBuf) -> (SqliteStore, i64) {
    let mut store = SqliteStore::open(dir).expect("open store");
    store
        .create_session(CreateSessionRequest {
            session_id: session_id("s1"),
            title: None,
            description: None,
        })
        .expect("create session");
    let appended = store
        .add_thought(AddThoughtRequest {
            session_id: session_id("s1"),
            thought_number: 1,
            total_thoughts: 1,
            content: "conclusion: ship the fix in two steps".to_string(),
            next_thought_needed: false,
            is_revision: false,
            revises_thought_id: None,
            branch_from_thought_id: None,
            branch_id: None,
            branch_label: None,
            needs_more_thoughts: false,
        })
        .expect("add thought");
    (store, appended.thought.id)
}

fn draft_plan(store: &mut SqliteStore, thought_id: i64) -> i64 {
    store
        .create_execution_plan(CreatePlanRequest {
            session_id: session_id("s1"),
            thought_id,
            title: "ship the fix".to_string(),
            description: Some("derived from the concluded session".to_string()),
        })
        .expect("create plan")
        .id
}

#[test]
fn dependency_ordered_plan_runs_to_completion() {
    let dir = temp_dir("dependency_ordered_plan_runs_to_completion");
    let (mut store, thought_id) = open_with_terminal_thought(&dir);
    let plan_id = draft_plan(&mut store, thought_id);

    // Forward reference: step 2 before step 1 names an id that does not
    // exist yet.
    let err = store
        .add_execution_step(step(plan_id, 2, vec![9999]))
        .expect_err("forward dependency");
    assert!(matches!(err, StoreError::InvalidReference(_)), "{err}");

    let first = store.add_execution_step(step(plan_id, 1, vec![])).expect("step 1");
    let second = store
        .add_execution_step(step(plan_id, 2, vec![first.id]))
        .expect("step 2");
    assert_eq!(second.depends_on_step_ids, vec![first.id]);

    let plan = store.finalize_execution_plan(plan_id).expect("finalize");
    assert_eq!(plan.status, PlanStatus::Ready);
    assert!(!plan.user_notified);

    let outcome = store.update_step_completion(first.id, true).expect("complete 1");
    assert!(outcome.step.completed);
    assert_eq!(outcome.step.status(), "completed");
    assert_eq!(outcome.plan.status, PlanStatus::InProgress);

    let outcome = store.update_step_completion(second.id, true).expect("complete 2");
    assert_eq!(outcome.plan.status, PlanStatus::Completed);
}

#[test]
fn rollup_needs_every_step_completed() {
    let dir = temp_dir("rollup_needs_every_step_completed");
    let (mut store, thought_id) = open_with_terminal_thought(&dir);
    let plan_id = draft_plan(&mut store, thought_id);

    let ids: Vec<i64> = (1..=3)
        .map(|n| {
            store
                .add_execution_step(step(plan_id, n, vec![]))
                .expect("add step")
                .id
        })
        .collect();
    store.finalize_execution_plan(plan_id).expect("finalize");

    store.update_step_completion(ids[0], true).expect("complete 1");
    let outcome = store.update_step_completion(ids[1], true).expect("complete 2");
    assert_eq!(outcome.plan.status, PlanStatus::InProgress);

    let outcome = store.update_step_completion(ids[2], true).expect("complete 3");
    assert_eq!(outcome.plan.status, PlanStatus::Completed);
}

// The rollup only moves forward. Un-completing a step leaves the plan where
// it was; consumers may already have been told about the old status.
#[test]
fn uncompleting_step_does_not_revert_plan() {
    let dir = temp_dir("uncompleting_step_does_not_revert_plan");
    let (mut store, thought_id) = open_with_terminal_thought(&dir);
    let plan_id = draft_plan(&mut store, thought_id);

    let a = store.add_execution_step(step(plan_id, 1, vec![])).expect("a").id;
    let b = store.add_execution_step(step(plan_id, 2, vec![])).expect("b").id;
    store.finalize_execution_plan(plan_id).expect("finalize");

    store.update_step_completion(a, true).expect("complete a");
    store.update_step_completion(b, true).expect("complete b");

    let outcome = store.update_step_completion(b, false).expect("uncomplete b");
    assert!(!outcome.step.completed);
    assert_eq!(outcome.step.status(), "pending");
    assert_eq!(outcome.plan.status, PlanStatus::Completed);

    // Completing it again is stable, not order-dependent.
    let outcome = store.update_step_completion(b, true).expect("recomplete b");
    assert_eq!(outcome.plan.status, PlanStatus::Completed);
}

#[test]
fn completing_the_same_step_twice_is_idempotent() {
    let dir = temp_dir("completing_the_same_step_twice_is_idempotent");
    let (mut store, thought_id) = open_with_terminal_thought(&dir);
    let plan_id = draft_plan(&mut store, thought_id);

    let a = store.add_execution_step(step(plan_id, 1, vec![])).expect("a").id;
    let b = store.add_execution_step(step(plan_id, 2, vec![])).expect("b").id;
    store.finalize_execution_plan(plan_id).expect("finalize");

    store.update_step_completion(a, true).expect("complete a");
    let first = store.update_step_completion(a, true).expect("complete a again");
    assert!(first.step.completed);
    assert_eq!(first.plan.status, PlanStatus::InProgress);

    store.update_step_completion(b, true).expect("complete b");
    let again = store.update_step_completion(b, true).expect("complete b again");
    assert_eq!(again.plan.status, PlanStatus::Completed);
}

#[test]
fn notification_inbox_delivers_each_plan_once() {
    let dir = temp_dir("notification_inbox_delivers_each_plan_once");
    let (mut store, thought_id) = open_with_terminal_thought(&dir);

    let draft_only = draft_plan(&mut store, thought_id);
    let finalized = draft_plan(&mut store, thought_id);
    store.finalize_execution_plan(finalized).expect("finalize");

    let inbox = store.ready_plans_for_notification("s1").expect("inbox");
    assert_eq!(inbox.len(), 1, "draft plans are not announced");
    assert_eq!(inbox[0].id, finalized);

    let plan = store.mark_plan_notified(finalized).expect("notify");
    assert!(plan.user_notified);
    // Idempotent: no error, no duplicate, flag stays set.
    let plan = store.mark_plan_notified(finalized).expect("notify again");
    assert!(plan.user_notified);

    assert!(store.ready_plans_for_notification("s1").expect("inbox").is_empty());

    // The still-draft plan never appeared and still does not.
    store.finalize_execution_plan(draft_only).expect("finalize second");
    let inbox = store.ready_plans_for_notification("s1").expect("inbox");
    assert_eq!(inbox.len(), 1);
    assert_eq!(inbox[0].id, draft_only);
}

#[test]
fn empty_plan_can_be_finalized() {
    let dir = temp_dir("empty_plan_can_be_finalized");
    let (mut store, thought_id) = open_with_terminal_thought(&dir);
    let plan_id = draft_plan(&mut store, thought_id);

    let plan = store.finalize_execution_plan(plan_id).expect("finalize empty");
    assert_eq!(plan.status, PlanStatus::Ready);
    assert!(store.plan_steps(plan_id).expect("steps").is_empty());

    // Finalizing a ready plan again is a no-op.
    let plan = store.finalize_execution_plan(plan_id).expect("finalize again");
    assert_eq!(plan.status, PlanStatus::Ready);
}

#[test]
fn finalize_rejects_plans_already_underway() {
    let dir = temp_dir("finalize_rejects_plans_already_underway");
    let (mut store, thought_id) = open_with_terminal_thought(&dir);
    let plan_id = draft_plan(&mut store, thought_id);

    let a = store.add_execution_step(step(plan_id, 1, vec![])).expect("a").id;
    store.add_execution_step(step(plan_id, 2, vec![])).expect("b");
    store.finalize_execution_plan(plan_id).expect("finalize");
    store.update_step_completion(a, true).expect("complete a");

    let err = store
        .finalize_execution_plan(plan_id)
        .expect_err("in-progress plan cannot be re-armed");
    assert!(matches!(err, StoreError::ConstraintViolation(_)), "{err}");
}

#[test]
fn plan_creation_validates_its_references() {
    let dir = temp_dir("plan_creation_validates_its_references");
    let (mut store, thought_id) = open_with_terminal_thought(&dir);
    store
        .create_session(CreateSessionRequest {
            session_id: session_id("s2"),
            title: None,
            description: None,
        })
        .expect("create s2");

    let err = store
        .create_execution_plan(CreatePlanRequest {
            session_id: session_id("missing"),
            thought_id,
            title: "plan".to_string(),
            description: None,
        })
        .expect_err("absent session");
    assert!(matches!(err, StoreError::NotFound("session")), "{err}");

    let err = store
        .create_execution_plan(CreatePlanRequest {
            session_id: session_id("s1"),
            thought_id: 9999,
            title: "plan".to_string(),
            description: None,
        })
        .expect_err("absent thought");
    assert!(matches!(err, StoreError::NotFound("thought")), "{err}");

    // The thought exists but belongs to s1, not s2.
    let err = store
        .create_execution_plan(CreatePlanRequest {
            session_id: session_id("s2"),
            thought_id,
            title: "plan".to_string(),
            description: None,
        })
        .expect_err("cross-session thought");
    assert!(matches!(err, StoreError::InvalidReference(_)), "{err}");
}

#[test]
fn steps_and_dependencies_stay_within_their_plan() {
    let dir = temp_dir("steps_and_dependencies_stay_within_their_plan");
    let (mut store, thought_id) = open_with_terminal_thought(&dir);
    let plan_a = draft_plan(&mut store, thought_id);
    let plan_b = draft_plan(&mut store, thought_id);

    let a1 = store.add_execution_step(step(plan_a, 1, vec![])).expect("a1").id;

    let err = store
        .add_execution_step(step(plan_b, 1, vec![a1]))
        .expect_err("dependency into another plan");
    assert!(matches!(err, StoreError::InvalidReference(_)), "{err}");

    let err = store
        .add_execution_step(step(9999, 1, vec![]))
        .expect_err("absent plan");
    assert!(matches!(err, StoreError::NotFound("plan")), "{err}");
}

#[test]
fn step_metadata_round_trips() {
    let dir = temp_dir("step_metadata_round_trips");
    let (mut store, thought_id) = open_with_terminal_thought(&dir);
    let plan_id = draft_plan(&mut store, thought_id);

    let created = store
        .add_execution_step(AddStepRequest {
            plan_id,
            step_number: 1,
            title: "write the migration".to_string(),
            description: Some("add the new column, backfill".to_string()),
            estimated_time: Some("2h".to_string()),
            depends_on_step_ids: vec![],
            assigned_to: Some("backend".to_string()),
            priority: Some("high".to_string()),
            metadata_json: Some(r#"{"ticket":"ENG-412"}"#.to_string()),
        })
        .expect("add step");

    let steps = store.plan_steps(plan_id).expect("steps");
    assert_eq!(steps.len(), 1);
    let stored = &steps[0];
    assert_eq!(stored.id, created.id);
    assert_eq!(stored.estimated_time.as_deref(), Some("2h"));
    assert_eq!(stored.assigned_to.as_deref(), Some("backend"));
    assert_eq!(stored.priority.as_deref(), Some("high"));
    assert_eq!(stored.metadata_json.as_deref(), Some(r#"{"ticket":"ENG-412"}"#));
    assert_eq!(stored.status(), "pending");
}
