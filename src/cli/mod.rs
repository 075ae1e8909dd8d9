//! CLI module for the `taxrag` binary
//!
//! - Command line argument parsing
//! - Command handlers (chat, ask, serve, config)
//! - Output formatting

pub mod commands;
pub mod handlers;
pub mod output;

pub use commands::*;
pub use handlers::*;
pub use output::*;
