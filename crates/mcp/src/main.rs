#![forbid(unsafe_code)]

mod entry;
mod server;
mod support;
mod tools;

pub(crate) use support::*;

use sm_storage::SqliteStore;
use std::fmt::Write as _;
use std::path::PathBuf;

// Protocol negotiation baseline; the server echoes the client's declared
// version when present.
const MCP_VERSION: &str = "2024-11-05";
const SERVER_NAME: &str = "stepmind-mcp";
const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

pub(crate) struct McpServer {
    initialized: bool,
    store: SqliteStore,
}

fn resolve_storage_dir() -> PathBuf {
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--storage-dir"
            && let Some(value) = args.next()
        {
            return PathBuf::from(value);
        }
        if let Some(value) = arg.strip_prefix("--storage-dir=") {
            return PathBuf::from(value);
        }
    }
    if let Ok(value) = std::env::var("STEPMIND_DIR")
        && !value.trim().is_empty()
    {
        return PathBuf::from(value);
    }
    match std::env::var("HOME") {
        Ok(home) if !home.trim().is_empty() => PathBuf::from(home).join(".stepmind"),
        _ => PathBuf::from(".stepmind"),
    }
}

fn write_last_crash(storage_dir: &std::path::Path, detail: &str) {
    // Best-effort crash report for debugging stdio transport failures
    // without logging request bodies.
    let _ = std::fs::create_dir_all(storage_dir);
    let path = storage_dir.join("stepmind_mcp_last_crash.txt");

    let mut out = String::new();
    let _ = writeln!(out, "ts={}", crate::support::ts_ms_to_rfc3339(crate::support::now_ms_i64()));
    let _ = writeln!(out, "pid={}", std::process::id());
    let _ = writeln!(out, "version={SERVER_VERSION}");
    let _ = writeln!(out, "detail={detail}");
    let _ = std::fs::write(path, out);
}

fn install_crash_reporter(storage_dir: PathBuf) {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let mut detail = info.to_string();
        let backtrace = std::backtrace::Backtrace::force_capture();
        let _ = write!(&mut detail, "\nbacktrace:\n{backtrace}");
        write_last_crash(&storage_dir, &detail);
        default_hook(info);
    }));
}

fn main() {
    let storage_dir = resolve_storage_dir();
    install_crash_reporter(storage_dir.clone());

    let store = match SqliteStore::open(&storage_dir) {
        Ok(store) => store,
        Err(err) => {
            eprintln!("{SERVER_NAME}: cannot open store in {}: {err}", storage_dir.display());
            std::process::exit(1);
        }
    };

    let mut server = McpServer::new(store);
    if let Err(err) = entry::run_stdio(&mut server) {
        write_last_crash(&storage_dir, &format!("stdio loop error: {err}"));
        eprintln!("{SERVER_NAME}: stdio loop error: {err}");
        std::process::exit(1);
    }
}
