#![forbid(unsafe_code)]

use crate::{
    McpServer, args_object, i64_list, optional_json_text, optional_str, plan_json, require_bool,
    require_i64, require_str, session_id_arg, step_json, store_error, tool_error, tool_ok,
};
use serde_json::{Value, json};
use sm_storage::{AddStepRequest, CreatePlanRequest};

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
        "create" => {
            let session_id = match session_id_arg(args, "session_id") {
                Ok(v) => v,
                Err(err) => return err,
            };
            let thought_id = match require_i64(args, "thought_id") {
                Ok(v) => v,
                Err(err) => return err,
            };
            let title = match require_str(args, "title") {
                Ok(v) => v,
                Err(err) => return err,
            };
            let description = match optional_str(args, "description") {
                Ok(v) => v,
                Err(err) => return err,
            };
            let request = CreatePlanRequest {
                session_id,
                thought_id,
                title,
                description,
            };
            match server.store().create_execution_plan(request) {
                Ok(row) => tool_ok("plan.create", json!({ "plan": plan_json(&row) })),
                Err(err) => store_error(err),
            }
        }
        "add_step" => handle_add_step(server, args),
        "finalize" => {
            let plan_id = match require_i64(args, "plan_id") {
                Ok(v) => v,
                Err(err) => return err,
            };
            match server.store().finalize_execution_plan(plan_id) {
                Ok(row) => tool_ok("plan.finalize", json!({ "plan": plan_json(&row) })),
                Err(err) => store_error(err),
            }
        }
        "steps" => {
            let plan_id = match require_i64(args, "plan_id") {
                Ok(v) => v,
                Err(err) => return err,
            };
            match server.store().plan_steps(plan_id) {
                Ok(rows) => {
                    let steps: Vec<Value> = rows.iter().map(step_json).collect();
                    tool_ok("plan.steps", json!({ "steps": steps }))
                }
                Err(err) => store_error(err),
            }
        }
        "ready" => {
            let session_id = match require_str(args, "session_id") {
                Ok(v) => v,
                Err(err) => return err,
            };
            match server.store().ready_plans_for_notification(&session_id) {
                Ok(rows) => {
                    let plans: Vec<Value> = rows.iter().map(plan_json).collect();
                    tool_ok("plan.ready", json!({ "plans": plans }))
                }
                Err(err) => store_error(err),
            }
        }
        "mark_notified" => {
            let plan_id = match require_i64(args, "plan_id") {
                Ok(v) => v,
                Err(err) => return err,
            };
            match server.store().mark_plan_notified(plan_id) {
                Ok(row) => tool_ok("plan.mark_notified", json!({ "plan": plan_json(&row) })),
                Err(err) => store_error(err),
            }
        }
        "complete_step" => {
            let step_id = match require_i64(args, "step_id") {
                Ok(v) => v,
                Err(err) => return err,
            };
            let completed = match require_bool(args, "completed") {
                Ok(v) => v,
                Err(err) => return err,
            };
            match server.store().update_step_completion(step_id, completed) {
                Ok(outcome) => tool_ok(
                    "plan.complete_step",
                    json!({
                        "step": step_json(&outcome.step),
                        "plan": plan_json(&outcome.plan)
                    }),
                ),
                Err(err) => store_error(err),
            }
        }
        other => tool_error(
            "INVALID_INPUT",
            &format!(
                "unknown plan op: {other} (use create, add_step, finalize, steps, ready, mark_notified, complete_step)"
            ),
        ),
    }
}

fn handle_add_step(server: &mut McpServer, args: &serde_json::Map<String, Value>) -> Value {
    let plan_id = match require_i64(args, "plan_id") {
        Ok(v) => v,
        Err(err) => return err,
    };
    let step_number = match require_i64(args, "step_number") {
        Ok(v) => v,
        Err(err) => return err,
    };
    let title = match require_str(args, "title") {
        Ok(v) => v,
        Err(err) => return err,
    };
    let description = match optional_str(args, "description") {
        Ok(v) => v,
        Err(err) => return err,
    };
    let estimated_time = match optional_str(args, "estimated_time") {
        Ok(v) => v,
        Err(err) => return err,
    };
    let depends_on_step_ids = match i64_list(args, "depends_on_step_ids") {
        Ok(v) => v,
        Err(err) => return err,
    };
    let assigned_to = match optional_str(args, "assigned_to") {
        Ok(v) => v,
        Err(err) => return err,
    };
    let priority = match optional_str(args, "priority") {
        Ok(v) => v,
        Err(err) => return err,
    };
    let metadata_json = match optional_json_text(args, "metadata") {
        Ok(v) => v,
        Err(err) => return err,
    };

    let request = AddStepRequest {
        plan_id,
        step_number,
        title,
        description,
        estimated_time,
        depends_on_step_ids,
        assigned_to,
        priority,
        metadata_json,
    };

    match server.store().add_execution_step(request) {
        Ok(row) => tool_ok("plan.add_step", json!({ "step": step_json(&row) })),
        Err(err) => store_error(err),
    }
}
