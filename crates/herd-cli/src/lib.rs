//! Shared pieces of the `herd` command-line tool.

pub mod config;
pub mod logging;
pub mod source;
