#![forbid(unsafe_code)]

use serde_json::{Value, json};
use sm_storage::StoreError;

pub(crate) fn tool_ok(intent: &str, result: Value) -> Value {
    json!({
        "success": true,
        "intent": intent,
        "result": result,
        "error": null
    })
}

pub(crate) fn tool_error(code: &str, message: &str) -> Value {
    json!({
        "success": false,
        "intent": null,
        "result": null,
        "error": { "code": code, "message": message.trim() }
    })
}

pub(crate) fn store_error(err: StoreError) -> Value {
    match err {
        StoreError::NotFound(entity) => tool_error("NOT_FOUND", &format!("{entity} not found")),
        StoreError::AlreadyExists(entity) => {
            tool_error("ALREADY_EXISTS", &format!("{entity} already exists"))
        }
        StoreError::InvalidReference(message) => tool_error("INVALID_REFERENCE", message),
        StoreError::ConstraintViolation(message) => tool_error("CONSTRAINT_VIOLATION", message),
        StoreError::Io(e) => tool_error("STORAGE", &format!("io failure: {e}")),
        StoreError::Sql(e) => tool_error("STORAGE", &format!("sqlite failure: {e}")),
    }
}
