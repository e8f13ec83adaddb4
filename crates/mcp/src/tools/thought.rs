#![forbid(unsafe_code)]

use crate::{
    McpServer, args_object, bool_or, branch_id_arg, branch_json, optional_i64, optional_json_text,
    optional_str, require_bool, require_i64, require_str, session_id_arg, store_error, thought_json,
    tool_error, tool_ok,
};
use serde_json::{Value, json};
use sm_storage::AddThoughtRequest;

pub(crate) fn handle(server: &mut McpServer, args: Value) -> Value {
    let args = match args_object(&args) {
        Ok(v) => v,
        Err(err) => return err,
    };
    let op = match require_str(args, "op") {
        Ok(v) => v,
        Err(err) => return err,
    };

    match op.as_str() {
        "add" => handle_add(server, args),
        "list" => {
            let session_id = match require_str(args, "session_id") {
                Ok(v) => v,
                Err(err) => return err,
            };
            match server.store().session_thoughts(&session_id) {
                Ok(rows) => {
                    let thoughts: Vec<Value> = rows.iter().map(thought_json).collect();
                    tool_ok("thought.list", json!({ "thoughts": thoughts }))
                }
                Err(err) => store_error(err),
            }
        }
        "active" => {
            let session_id = match require_str(args, "session_id") {
                Ok(v) => v,
                Err(err) => return err,
            };
            match server.store().active_thought(&session_id) {
                Ok(row) => tool_ok("thought.active", json!({ "thought": thought_json(&row) })),
                Err(err) => store_error(err),
            }
        }
        "branches" => {
            let session_id = match require_str(args, "session_id") {
                Ok(v) => v,
                Err(err) => return err,
            };
            match server.store().session_branches(&session_id) {
                Ok(rows) => {
                    let branches: Vec<Value> = rows.iter().map(branch_json).collect();
                    tool_ok("thought.branches", json!({ "branches": branches }))
                }
                Err(err) => store_error(err),
            }
        }
        "needs_continuation" => {
            let session_id = match require_str(args, "session_id") {
                Ok(v) => v,
                Err(err) => return err,
            };
            match server.store().needs_continued_thinking(&session_id) {
                Ok(needed) => tool_ok(
                    "thought.needs_continuation",
                    json!({ "needs_continued_thinking": needed }),
                ),
                Err(err) => store_error(err),
            }
        }
        "pause" => {
            let thought_id = match require_i64(args, "thought_id") {
                Ok(v) => v,
                Err(err) => return err,
            };
            let execution_state = match optional_json_text(args, "execution_state") {
                Ok(v) => v,
                Err(err) => return err,
            };
            match server.store().pause_thought(thought_id, execution_state) {
                Ok(row) => tool_ok("thought.pause", json!({ "thought": thought_json(&row) })),
                Err(err) => store_error(err),
            }
        }
        "resume" => {
            let thought_id = match require_i64(args, "thought_id") {
                Ok(v) => v,
                Err(err) => return err,
            };
            match server.store().resume_thought(thought_id) {
                Ok(row) => tool_ok("thought.resume", json!({ "thought": thought_json(&row) })),
                Err(err) => store_error(err),
            }
        }
        other => tool_error(
            "INVALID_INPUT",
            &format!(
                "unknown thought op: {other} (use add, list, active, branches, needs_continuation, pause, resume)"
            ),
        ),
    }
}

fn handle_add(server: &mut McpServer, args: &serde_json::Map<String, Value>) -> Value {
    let session_id = match session_id_arg(args, "session_id") {
        Ok(v) => v,
        Err(err) => return err,
    };
    let thought_number = match require_i64(args, "thought_number") {
        Ok(v) => v,
        Err(err) => return err,
    };
    let total_thoughts = match require_i64(args, "total_thoughts") {
        Ok(v) => v,
        Err(err) => return err,
    };
    let content = match require_str(args, "content") {
        Ok(v) => v,
        Err(err) => return err,
    };
    let next_thought_needed = match require_bool(args, "next_thought_needed") {
        Ok(v) => v,
        Err(err) => return err,
    };
    let is_revision = match bool_or(args, "is_revision", false) {
        Ok(v) => v,
        Err(err) => return err,
    };
    let revises_thought_id = match optional_i64(args, "revises_thought_id") {
        Ok(v) => v,
        Err(err) => return err,
    };
    let branch_from_thought_id = match optional_i64(args, "branch_from_thought_id") {
        Ok(v) => v,
        Err(err) => return err,
    };
    let branch_id = match branch_id_arg(args, "branch_id") {
        Ok(v) => v,
        Err(err) => return err,
    };
    let branch_label = match optional_str(args, "branch_label") {
        Ok(v) => v,
        Err(err) => return err,
    };
    let needs_more_thoughts = match bool_or(args, "needs_more_thoughts", false) {
        Ok(v) => v,
        Err(err) => return err,
    };

    let request = AddThoughtRequest {
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
    };

    match server.store().add_thought(request) {
        Ok(appended) => {
            let new_branch = match &appended.new_branch {
                Some(branch) => json!({
                    "id": branch.id,
                    "session_id": branch.session_id,
                    "parent_branch_id": branch.parent_branch_id,
                    "label": branch.label,
                    "created_at": crate::ts_ms_to_rfc3339(branch.created_at_ms),
                }),
                None => Value::Null,
            };
            tool_ok(
                "thought.add",
                json!({
                    "thought": thought_json(&appended.thought),
                    "new_branch": new_branch
                }),
            )
        }
        Err(err) => store_error(err),
    }
}
