#![forbid(unsafe_code)]

use sm_core::ids::SessionId;
use sm_core::model::ThoughtStatus;
use sm_storage::{AddThoughtRequest, CreateSessionRequest, SqliteStore, StoreError};
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

fn open_with_thought(dir: &PathBuf, next_needed: bool) -> (SqliteStore, i64) {
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
            content: "work in flight".to_string(),
            next_thought_needed: next_needed,
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

#[test]
fn pause_then_resume_round_trips_the_execution_state() {
    let dir = temp_dir("pause_then_resume_round_trips_the_execution_state");
    let (mut store, thought_id) = open_with_thought(&dir, true);

    let state = r#"{"stack":["parse","lower"],"cursor":42}"#;
    let paused = store
        .pause_thought(thought_id, Some(state.to_string()))
        .expect("pause");
    assert_eq!(paused.status, ThoughtStatus::Paused);
    assert!(paused.user_paused);
    assert_eq!(paused.execution_state_json.as_deref(), Some(state));

    let resumed = store.resume_thought(thought_id).expect("resume");
    assert_eq!(resumed.status, ThoughtStatus::Active);
    assert!(!resumed.user_paused);
    // The snapshot comes back verbatim so the caller can pick up mid-flight.
    assert_eq!(resumed.execution_state_json.as_deref(), Some(state));

    // Not cleared by resume: a second resume still sees the same snapshot.
    let resumed = store.resume_thought(thought_id).expect("resume again");
    assert_eq!(resumed.execution_state_json.as_deref(), Some(state));
}

#[test]
fn a_new_pause_overwrites_the_previous_snapshot() {
    let dir = temp_dir("a_new_pause_overwrites_the_previous_snapshot");
    let (mut store, thought_id) = open_with_thought(&dir, true);

    store
        .pause_thought(thought_id, Some(r#"{"cursor":1}"#.to_string()))
        .expect("first pause");
    // Pausing an already-paused thought is accepted; last write wins.
    let paused = store
        .pause_thought(thought_id, Some(r#"{"cursor":2}"#.to_string()))
        .expect("second pause");
    assert_eq!(paused.execution_state_json.as_deref(), Some(r#"{"cursor":2}"#));

    // An absent snapshot also wins: it replaces the stored one.
    let paused = store.pause_thought(thought_id, None).expect("third pause");
    assert_eq!(paused.execution_state_json, None);
}

#[test]
fn pause_and_resume_require_an_existing_thought() {
    let dir = temp_dir("pause_and_resume_require_an_existing_thought");
    let (mut store, _) = open_with_thought(&dir, true);

    let err = store.pause_thought(9999, None).expect_err("absent thought");
    assert!(matches!(err, StoreError::NotFound("thought")), "{err}");
    let err = store.resume_thought(9999).expect_err("absent thought");
    assert!(matches!(err, StoreError::NotFound("thought")), "{err}");
}

// The reference behavior let pause/resume succeed from any status, silently
// reviving completed thoughts. That was judged unintended; these two tests
// pin the stricter gate.
#[test]
fn pause_rejects_completed_thought() {
    let dir = temp_dir("pause_rejects_completed_thought");
    let (mut store, thought_id) = open_with_thought(&dir, false);
    store.complete_session("s1").expect("complete");

    let err = store
        .pause_thought(thought_id, Some("{}".to_string()))
        .expect_err("completed thought is settled");
    assert!(matches!(err, StoreError::ConstraintViolation(_)), "{err}");
}

#[test]
fn resume_rejects_completed_thought() {
    let dir = temp_dir("resume_rejects_completed_thought");
    let (mut store, thought_id) = open_with_thought(&dir, false);
    store.complete_session("s1").expect("complete");

    let err = store
        .resume_thought(thought_id)
        .expect_err("completed thought cannot come back");
    assert!(matches!(err, StoreError::ConstraintViolation(_)), "{err}");
    let row = store
        .session_thoughts("s1")
        .expect("list")
        .into_iter()
        .find(|t| t.id == thought_id)
        .expect("row");
    assert_eq!(row.status, ThoughtStatus::Completed);
}

#[test]
fn user_pause_silences_the_continuation_predicate() {
    let dir = temp_dir("user_pause_silences_the_continuation_predicate");
    let (mut store, thought_id) = open_with_thought(&dir, true);

    assert!(store.needs_continued_thinking("s1").expect("predicate"));

    // The only continuation-demanding thought is user-paused: the system
    // defers to user intent instead of asking to auto-resume.
    store.pause_thought(thought_id, None).expect("pause");
    assert!(!store.needs_continued_thinking("s1").expect("predicate"));

    store.resume_thought(thought_id).expect("resume");
    assert!(store.needs_continued_thinking("s1").expect("predicate"));
}
