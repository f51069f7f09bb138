//! CLI parser.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "nlubot")]
#[command(about = "Turn dispatcher bot: run on Telegram, emulate on the console, check cards", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the Telegram bot (config from env; token can override BOT_TOKEN).
    Run {
        #[arg(short, long)]
        token: Option<String>,
    },
    /// Read event JSON lines from stdin, print replies as JSON lines.
    Emulate {
        /// Use the built-in utterance table instead of the LUIS endpoint.
        #[arg(long)]
        offline: bool,
    },
    /// Load and validate the welcome and fallback cards, then print their text.
    CheckCards {
        #[arg(short, long)]
        dir: Option<PathBuf>,
    },
}
