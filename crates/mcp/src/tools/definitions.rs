#![forbid(unsafe_code)]

use serde_json::{Value, json};

pub(crate) fn tool_definitions() -> Vec<Value> {
    vec![
        json!({
            "name": "session",
            "description": "Reasoning session lifecycle: create, get, complete.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "op": { "type": "string", "enum": ["create", "get", "complete"] },
                    "session_id": { "type": "string" },
                    "title": { "type": "string" },
                    "description": { "type": "string" }
                },
                "required": ["op", "session_id"]
            }
        }),
        json!({
            "name": "thought",
            "description": "Thoughts within a session: add (with optional revision or branch references), list, active, branches, needs_continuation, pause, resume.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "op": {
                        "type": "string",
                        "enum": ["add", "list", "active", "branches", "needs_continuation", "pause", "resume"]
                    },
                    "session_id": { "type": "string" },
                    "thought_id": { "type": "integer" },
                    "thought_number": { "type": "integer" },
                    "total_thoughts": { "type": "integer" },
                    "content": { "type": "string" },
                    "next_thought_needed": { "type": "boolean" },
                    "is_revision": { "type": "boolean" },
                    "revises_thought_id": { "type": "integer" },
                    "branch_from_thought_id": { "type": "integer" },
                    "branch_id": { "type": "string" },
                    "branch_label": { "type": "string" },
                    "needs_more_thoughts": { "type": "boolean" },
                    "execution_state": { "description": "Opaque JSON snapshot stored verbatim on pause." }
                },
                "required": ["op"]
            }
        }),
        json!({
            "name": "plan",
            "description": "Execution plans derived from thoughts: create, add_step, finalize, steps, ready, mark_notified, complete_step.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "op": {
                        "type": "string",
                        "enum": ["create", "add_step", "finalize", "steps", "ready", "mark_notified", "complete_step"]
                    },
                    "session_id": { "type": "string" },
                    "thought_id": { "type": "integer" },
                    "plan_id": { "type": "integer" },
                    "step_id": { "type": "integer" },
                    "title": { "type": "string" },
                    "description": { "type": "string" },
                    "step_number": { "type": "integer" },
                    "estimated_time": { "type": "string" },
                    "depends_on_step_ids": { "type": "array", "items": { "type": "integer" } },
                    "assigned_to": { "type": "string" },
                    "priority": { "type": "string" },
                    "metadata": { "description": "Opaque JSON attached to a step, stored verbatim." },
                    "completed": { "type": "boolean" }
                },
                "required": ["op"]
            }
        }),
    ]
}
