#![forbid(unsafe_code)]

use crate::{JsonRpcRequest, McpServer, json_rpc_error};
use serde_json::Value;
use std::io::{BufRead, BufReader, Read, Write};

const MAX_CONTENT_LENGTH_BYTES: usize = 16 * 1024 * 1024;

/// Framing is detected once per process from the first non-empty line and
/// then kept, so responses never interleave styles on one transport.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum StdioMode {
    NewlineJson,
    ContentLength,
}

fn detect_mode(first_line: &str) -> Option<StdioMode> {
    let trimmed = first_line.trim_start();
    if trimmed.is_empty() {
        return None;
    }
    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        return Some(StdioMode::NewlineJson);
    }
    // MCP header framing; some clients send Content-Type first.
    let lower = trimmed.to_ascii_lowercase();
    if lower.starts_with("content-length:") || lower.starts_with("content-type:") {
        return Some(StdioMode::ContentLength);
    }
    None
}

fn parse_content_length(line: &str) -> Option<usize> {
    let (key, value) = line.trim().split_once(':')?;
    if !key.trim().eq_ignore_ascii_case("content-length") {
        return None;
    }
    value.trim().parse::<usize>().ok()
}

/// Reads the rest of a header block (the first header line is already
/// consumed) and then the body. `None` means the peer closed mid-frame.
fn read_frame_body(
    reader: &mut impl BufRead,
    mut header_line: String,
) -> std::io::Result<Option<Vec<u8>>> {
    let mut content_length = parse_content_length(&header_line);

    loop {
        if header_line.trim_end().is_empty() {
            break;
        }
        header_line.clear();
        if reader.read_line(&mut header_line)? == 0 {
            return Ok(None);
        }
        if content_length.is_none() {
            content_length = parse_content_length(&header_line);
        }
    }

    let Some(len) = content_length else {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            "missing Content-Length header",
        ));
    };
    if len > MAX_CONTENT_LENGTH_BYTES {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            "Content-Length exceeds max allowed size",
        ));
    }

    let mut body = vec![0u8; len];
    reader.read_exact(&mut body)?;
    Ok(Some(body))
}

fn write_response(
    stdout: &mut impl Write,
    mode: StdioMode,
    resp: &Value,
) -> Result<(), Box<dyn std::error::Error>> {
    match mode {
        StdioMode::NewlineJson => {
            writeln!(stdout, "{}", serde_json::to_string(resp)?)?;
        }
        StdioMode::ContentLength => {
            let body = serde_json::to_vec(resp)?;
            write!(stdout, "Content-Length: {}\r\n\r\n", body.len())?;
            stdout.write_all(&body)?;
        }
    }
    stdout.flush()?;
    Ok(())
}

/// Parses one JSON-RPC payload and hands it to the server. Malformed input
/// yields a JSON-RPC error instead of killing the transport.
fn handle_payload(server: &mut McpServer, raw: &[u8]) -> Option<Value> {
    let data: Value = match serde_json::from_slice(raw) {
        Ok(v) => v,
        Err(e) => return Some(json_rpc_error(None, -32700, &format!("Parse error: {e}"))),
    };

    let Some(obj) = data.as_object() else {
        return Some(json_rpc_error(None, -32600, "Invalid Request"));
    };
    let id = obj.get("id").cloned();
    if !obj.contains_key("method") {
        return Some(json_rpc_error(id, -32600, "Invalid Request"));
    }

    let request: JsonRpcRequest = match serde_json::from_value(data) {
        Ok(v) => v,
        Err(e) => return Some(json_rpc_error(id, -32600, &format!("Invalid Request: {e}"))),
    };

    server.handle(request)
}

pub(crate) fn run_stdio(server: &mut McpServer) -> Result<(), Box<dyn std::error::Error>> {
    let stdin = std::io::stdin();
    let mut reader = BufReader::new(stdin.lock());
    let mut stdout = std::io::stdout().lock();

    let mut mode: Option<StdioMode> = None;

    loop {
        let mut line = String::new();
        if reader.read_line(&mut line)? == 0 {
            break;
        }
        if line.trim().is_empty() {
            continue;
        }

        let effective_mode = match mode {
            Some(m) => m,
            None => match detect_mode(&line) {
                Some(detected) => {
                    mode = Some(detected);
                    detected
                }
                None => continue,
            },
        };

        let payload = match effective_mode {
            StdioMode::NewlineJson => line.trim().as_bytes().to_vec(),
            StdioMode::ContentLength => match read_frame_body(&mut reader, line)? {
                Some(body) => body,
                None => break,
            },
        };

        if let Some(resp) = handle_payload(server, &payload) {
            write_response(&mut stdout, effective_mode, &resp)?;
        }
    }

    Ok(())
}
