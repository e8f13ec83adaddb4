#![forbid(unsafe_code)]

use crate::McpServer;
use serde_json::{Value, json};
use std::panic::{AssertUnwindSafe, catch_unwind};

impl McpServer {
    pub(crate) fn new(store: sm_storage::SqliteStore) -> Self {
        Self {
            initialized: false,
            store,
        }
    }

    pub(crate) fn handle(&mut self, request: crate::JsonRpcRequest) -> Option<Value> {
        let method = request.method.as_str();

        if method == "initialize" {
            let client_version = request
                .params
                .as_ref()
                .and_then(|v| v.get("protocolVersion"))
                .and_then(|v| v.as_str())
                .unwrap_or(crate::MCP_VERSION)
                .to_string();
            return Some(crate::json_rpc_response(
                request.id,
                json!({
                    "protocolVersion": client_version,
                    "serverInfo": { "name": crate::SERVER_NAME, "version": crate::SERVER_VERSION },
                    "capabilities": { "tools": {} }
                }),
            ));
        }

        if method == "notifications/initialized" {
            self.initialized = true;
            return None;
        }

        if !self.initialized {
            // Some clients skip the initialized notification and go straight
            // to tools; accept that rather than dead-locking the session.
            if method == "ping" || method.starts_with("tools/") {
                self.initialized = true;
            } else {
                return Some(crate::json_rpc_error(request.id, -32002, "Server not initialized"));
            }
        }

        if method == "ping" {
            return Some(crate::json_rpc_response(request.id, json!({})));
        }

        // Clients probe optional surfaces by default; answer with empty sets
        // so the probes stay quiet.
        if method == "resources/list" {
            return Some(crate::json_rpc_response(request.id, json!({ "resources": [] })));
        }
        if method == "resources/templates/list" {
            return Some(crate::json_rpc_response(
                request.id,
                json!({ "resourceTemplates": [] }),
            ));
        }
        if method == "resources/read" {
            return Some(crate::json_rpc_response(request.id, json!({ "contents": [] })));
        }
        if method == "prompts/list" {
            return Some(crate::json_rpc_response(request.id, json!({ "prompts": [] })));
        }

        if method == "tools/list" {
            return Some(crate::json_rpc_response(
                request.id,
                json!({ "tools": crate::tools::tool_definitions() }),
            ));
        }

        if method == "tools/call" {
            let Some(params_obj) = request.params.as_ref().and_then(|v| v.as_object()) else {
                return Some(crate::json_rpc_error(request.id, -32602, "params must be an object"));
            };

            let tool_name = params_obj
                .get("name")
                .and_then(|v| v.as_str())
                .unwrap_or("")
                .to_string();
            let args = params_obj
                .get("arguments")
                .cloned()
                .unwrap_or_else(|| json!({}));

            let response_body = self.call_tool(&tool_name, args);

            return Some(crate::json_rpc_response(
                request.id,
                json!({
                    "content": [crate::tool_text_content(&response_body)],
                    "isError": !response_body.get("success").and_then(|v| v.as_bool()).unwrap_or(false)
                }),
            ));
        }

        Some(crate::json_rpc_error(
            request.id,
            -32601,
            &format!("Method not found: {method}"),
        ))
    }

    pub(crate) fn call_tool(&mut self, name: &str, args: Value) -> Value {
        // A panic in one tool call must not take down the stdio transport.
        let outcome = catch_unwind(AssertUnwindSafe(|| {
            crate::tools::dispatch_tool(self, name, args)
        }));
        match outcome {
            Ok(Some(resp)) => resp,
            Ok(None) => crate::tool_error("UNKNOWN_TOOL", &format!("Unknown tool: {name}")),
            Err(_) => crate::tool_error("INTERNAL", "tool call panicked; see last-crash report"),
        }
    }

    pub(crate) fn store(&mut self) -> &mut sm_storage::SqliteStore {
        &mut self.store
    }
}
