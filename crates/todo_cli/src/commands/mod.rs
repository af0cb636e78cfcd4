//! CLI command implementations.

pub mod compact;
pub mod list;
pub mod serve;
