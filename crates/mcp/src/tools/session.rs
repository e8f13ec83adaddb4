#![forbid(unsafe_code)]

use crate::{
    McpServer, args_object, optional_str, require_str, session_id_arg, session_json, store_error,
    tool_error, tool_ok,
};
use serde_json::{Value, json};
use sm_storage::CreateSessionRequest;

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
            let title = match optional_str(args, "title") {
                Ok(v) => v,
                Err(err) => return err,
            };
            let description = match optional_str(args, "description") {
                Ok(v) => v,
                Err(err) => return err,
            };
            let request = CreateSessionRequest {
                session_id,
                title,
                description,
            };
            match server.store().create_session(request) {
                Ok(row) => tool_ok("session.create", json!({ "session": session_json(&row) })),
                Err(err) => store_error(err),
            }
        }
        "get" => {
            let session_id = match require_str(args, "session_id") {
                Ok(v) => v,
                Err(err) => return err,
            };
            match server.store().get_session(&session_id) {
                Ok(row) => tool_ok("session.get", json!({ "session": session_json(&row) })),
                Err(err) => store_error(err),
            }
        }
        "complete" => {
            let session_id = match require_str(args, "session_id") {
                Ok(v) => v,
                Err(err) => return err,
            };
            match server.store().complete_session(&session_id) {
                Ok(row) => tool_ok("session.complete", json!({ "session": session_json(&row) })),
                Err(err) => store_error(err),
            }
        }
        other => tool_error(
            "INVALID_INPUT",
            &format!("unknown session op: {other} (use create, get, complete)"),
        ),
    }
}
