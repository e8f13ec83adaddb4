#![forbid(unsafe_code)]

use sm_core::ids::SessionId;
use sm_core::model::{SessionStatus, ThoughtStatus};
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

fn thought(session: &str, number: i64, next_needed: bool) -> AddThoughtRequest {
    AddThoughtRequest {
        session_id: session_id(session),
        thought_number: number,
        total_thoughts: 3,
        content: format!("thought {number}"),
        next_thought_needed: next_needed,
        is_revision: false,
        revises_thought_id: None,
        branch_from_thought_id: None,
        branch_id: None,
        branch_label: None,
        needs_more_thoughts: false,
    }
}

#[test]
fn add_thought_requires_an_existing_session() {
    let dir = temp_dir("add_thought_requires_an_existing_session");
    let mut store = SqliteStore::open(&dir).expect("open store");

    let err = store
        .add_thought(thought("s1", 1, true))
        .expect_err("missing session must be rejected");
    assert!(matches!(err, StoreError::NotFound("session")), "{err}");

    store
        .create_session(CreateSessionRequest {
            session_id: session_id("s1"),
            title: Some("debug the flaky test".to_string()),
            description: None,
        })
        .expect("create session");

    // Identical call now succeeds.
    let appended = store.add_thought(thought("s1", 1, true)).expect("add thought");
    assert_eq!(appended.thought.session_id, "s1");
    assert_eq!(appended.thought.status, ThoughtStatus::Active);
    assert!(appended.new_branch.is_none());
}

#[test]
fn duplicate_session_id_is_rejected() {
    let dir = temp_dir("duplicate_session_id_is_rejected");
    let mut store = SqliteStore::open(&dir).expect("open store");

    store
        .create_session(CreateSessionRequest {
            session_id: session_id("s1"),
            title: None,
            description: None,
        })
        .expect("create session");

    let err = store
        .create_session(CreateSessionRequest {
            session_id: session_id("s1"),
            title: Some("again".to_string()),
            description: None,
        })
        .expect_err("duplicate id must be rejected");
    assert!(matches!(err, StoreError::AlreadyExists("session")), "{err}");
}

#[test]
fn get_session_reports_not_found() {
    let dir = temp_dir("get_session_reports_not_found");
    let store = SqliteStore::open(&dir).expect("open store");
    let err = store.get_session("nope").expect_err("absent session");
    assert!(matches!(err, StoreError::NotFound("session")), "{err}");
}

#[test]
fn completed_session_cascades_to_active_thoughts_only() {
    let dir = temp_dir("completed_session_cascades_to_active_thoughts_only");
    let mut store = SqliteStore::open(&dir).expect("open store");

    store
        .create_session(CreateSessionRequest {
            session_id: session_id("s1"),
            title: None,
            description: None,
        })
        .expect("create session");

    let first = store.add_thought(thought("s1", 1, true)).expect("thought 1");
    let mut revision = thought("s1", 2, true);
    revision.is_revision = true;
    revision.revises_thought_id = Some(first.thought.id);
    store.add_thought(revision).expect("thought 2");
    let third = store.add_thought(thought("s1", 3, false)).expect("thought 3");

    // Park the third thought so completion must leave it alone.
    store
        .pause_thought(third.thought.id, Some(r#"{"cursor":3}"#.to_string()))
        .expect("pause thought 3");

    let session = store.complete_session("s1").expect("complete session");
    assert_eq!(session.status, SessionStatus::Completed);

    let thoughts = store.session_thoughts("s1").expect("list thoughts");
    assert_eq!(thoughts.len(), 3);
    assert_eq!(thoughts[0].status, ThoughtStatus::Completed);
    assert_eq!(thoughts[1].status, ThoughtStatus::Completed);
    assert_eq!(thoughts[2].status, ThoughtStatus::Paused);

    // Idempotent: a second completion changes nothing and does not error.
    let again = store.complete_session("s1").expect("complete again");
    assert_eq!(again.status, SessionStatus::Completed);
    let thoughts = store.session_thoughts("s1").expect("list thoughts");
    assert_eq!(thoughts[2].status, ThoughtStatus::Paused);
}

#[test]
fn complete_session_requires_an_existing_session() {
    let dir = temp_dir("complete_session_requires_an_existing_session");
    let mut store = SqliteStore::open(&dir).expect("open store");
    let err = store.complete_session("nope").expect_err("absent session");
    assert!(matches!(err, StoreError::NotFound("session")), "{err}");
}

#[test]
fn concluding_scenario_ends_without_continuation() {
    let dir = temp_dir("concluding_scenario_ends_without_continuation");
    let mut store = SqliteStore::open(&dir).expect("open store");

    store
        .create_session(CreateSessionRequest {
            session_id: session_id("s1"),
            title: None,
            description: None,
        })
        .expect("create session");

    let first = store.add_thought(thought("s1", 1, true)).expect("thought 1");
    let mut revision = thought("s1", 2, true);
    revision.is_revision = true;
    revision.revises_thought_id = Some(first.thought.id);
    store.add_thought(revision).expect("thought 2");
    store.add_thought(thought("s1", 3, false)).expect("thought 3");

    // Earlier thoughts still demand continuation.
    assert!(store.needs_continued_thinking("s1").expect("predicate"));

    let session = store.complete_session("s1").expect("complete");
    assert_eq!(session.status, SessionStatus::Completed);
    for row in store.session_thoughts("s1").expect("list") {
        assert_eq!(row.status, ThoughtStatus::Completed);
    }
    assert!(!store.needs_continued_thinking("s1").expect("predicate"));
}
