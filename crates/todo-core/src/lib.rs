//! Core domain types for the todo CLI.

pub mod command;
pub mod config;
pub mod storage;
pub mod todo;

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
