//! Mode routing
//!
//! - Server mode (HTTP server, default)
//! - CLI mode (one-shot lookup, config generation)

pub mod cli;
pub mod server;

pub use cli::{run_config_generate, run_lookup};
pub use server::run_server;

use crate::cli::Commands;

/// Mode detection result
#[derive(Debug, PartialEq, Eq)]
pub enum Mode {
    Server,
    Cli,
}

/// 没有子命令或显式 `serve` 时运行服务器，其余为一次性 CLI 命令
pub fn detect_mode(command: Option<&Commands>) -> Mode {
    match command {
        None | Some(Commands::Serve) => Mode::Server,
        Some(_) => Mode::Cli,
    }
}
