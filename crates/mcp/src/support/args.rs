#![forbid(unsafe_code)]

use super::respond::tool_error;
use serde_json::{Map, Value};
use sm_core::ids::{BranchId, SessionId};

pub(crate) fn args_object(args: &Value) -> Result<&Map<String, Value>, Value> {
    args.as_object()
        .ok_or_else(|| tool_error("INVALID_INPUT", "arguments must be an object"))
}

pub(crate) fn require_str(args: &Map<String, Value>, key: &str) -> Result<String, Value> {
    let Some(value) = args.get(key).and_then(|v| v.as_str()) else {
        return Err(tool_error("INVALID_INPUT", &format!("{key} is required")));
    };
    Ok(value.to_string())
}

pub(crate) fn optional_str(args: &Map<String, Value>, key: &str) -> Result<Option<String>, Value> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(v)) => Ok(Some(v.to_string())),
        Some(_) => Err(tool_error("INVALID_INPUT", &format!("{key} must be a string"))),
    }
}

pub(crate) fn require_i64(args: &Map<String, Value>, key: &str) -> Result<i64, Value> {
    let Some(value) = args.get(key).and_then(|v| v.as_i64()) else {
        return Err(tool_error("INVALID_INPUT", &format!("{key} must be an integer")));
    };
    Ok(value)
}

pub(crate) fn optional_i64(args: &Map<String, Value>, key: &str) -> Result<Option<i64>, Value> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => match value.as_i64() {
            Some(v) => Ok(Some(v)),
            None => Err(tool_error("INVALID_INPUT", &format!("{key} must be an integer"))),
        },
    }
}

pub(crate) fn require_bool(args: &Map<String, Value>, key: &str) -> Result<bool, Value> {
    let Some(value) = args.get(key).and_then(|v| v.as_bool()) else {
        return Err(tool_error("INVALID_INPUT", &format!("{key} must be a boolean")));
    };
    Ok(value)
}

pub(crate) fn bool_or(args: &Map<String, Value>, key: &str, default: bool) -> Result<bool, Value> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(default),
        Some(Value::Bool(v)) => Ok(*v),
        Some(_) => Err(tool_error("INVALID_INPUT", &format!("{key} must be a boolean"))),
    }
}

pub(crate) fn i64_list(args: &Map<String, Value>, key: &str) -> Result<Vec<i64>, Value> {
    let Some(value) = args.get(key) else {
        return Ok(Vec::new());
    };
    match value {
        Value::Null => Ok(Vec::new()),
        Value::Array(items) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                let Some(id) = item.as_i64() else {
                    return Err(tool_error(
                        "INVALID_INPUT",
                        &format!("{key} must be an array of integers"),
                    ));
                };
                out.push(id);
            }
            Ok(out)
        }
        _ => Err(tool_error(
            "INVALID_INPUT",
            &format!("{key} must be an array of integers"),
        )),
    }
}

/// Opaque JSON payloads (execution state, step metadata) are accepted as any
/// JSON value and stored as their serialized text, verbatim.
pub(crate) fn optional_json_text(
    args: &Map<String, Value>,
    key: &str,
) -> Result<Option<String>, Value> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => match serde_json::to_string(value) {
            Ok(text) => Ok(Some(text)),
            Err(_) => Err(tool_error("INVALID_INPUT", &format!("{key} is not encodable"))),
        },
    }
}

pub(crate) fn session_id_arg(args: &Map<String, Value>, key: &str) -> Result<SessionId, Value> {
    let raw = require_str(args, key)?;
    SessionId::try_new(raw).map_err(|err| tool_error("CONSTRAINT_VIOLATION", &format!("{key}: {err}")))
}

/// Empty branch ids are treated as absent so a branch is never provisioned
/// for `""`.
pub(crate) fn branch_id_arg(args: &Map<String, Value>, key: &str) -> Result<Option<BranchId>, Value> {
    let Some(raw) = optional_str(args, key)? else {
        return Ok(None);
    };
    if raw.trim().is_empty() {
        return Ok(None);
    }
    BranchId::try_new(raw)
        .map(Some)
        .map_err(|err| tool_error("CONSTRAINT_VIOLATION", &format!("{key}: {err}")))
}
