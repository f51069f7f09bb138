//! # nlubot-cli
//!
//! CLI foundation: argument parsing, application config, console connector.

pub mod cli;
pub mod config;
pub mod console;

pub use cli::{Cli, Commands};
pub use config::AppConfig;
pub use console::{run_emulator, ConsoleTransport, EmulatorStats};
