#![forbid(unsafe_code)]

mod definitions;
mod dispatch;
mod plan;
mod session;
mod thought;

pub(crate) use definitions::tool_definitions;
pub(crate) use dispatch::dispatch_tool;
