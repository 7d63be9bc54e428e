//! CLI command handlers, one file per command.

mod config;
mod hash;
mod serve;

pub use config::run_config;
pub use hash::run_hash;
pub use serve::run_serve;
