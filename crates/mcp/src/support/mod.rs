#![forbid(unsafe_code)]

mod args;
mod jsonrpc;
mod render;
mod respond;
mod time;

pub(crate) use args::*;
pub(crate) use jsonrpc::*;
pub(crate) use render::*;
pub(crate) use respond::*;
pub(crate) use time::*;
