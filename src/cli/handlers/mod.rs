//! CLI command handlers module
//!
//! - chat: interactive chat and single questions
//! - serve: API server
//! - info: configuration display

pub mod chat;
pub mod info;
pub mod serve;

pub use chat::*;
pub use info::*;
pub use serve::*;
