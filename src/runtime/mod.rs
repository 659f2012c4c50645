//! Application lifecycle and execution modes
//!
//! - `lifetime`: 启动准备与优雅关闭
//! - `modes`: server / lookup / config 子命令

pub mod lifetime;
pub mod modes;
