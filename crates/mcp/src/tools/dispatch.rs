#![forbid(unsafe_code)]

use crate::McpServer;
use serde_json::Value;

use super::{plan, session, thought};

pub(crate) fn dispatch_tool(server: &mut McpServer, name: &str, args: Value) -> Option<Value> {
    let resp = match name {
        "session" => session::handle(server, args),
        "thought" => thought::handle(server, args),
        "plan" => plan::handle(server, args),
        _ => return None,
    };
    Some(resp)
}
