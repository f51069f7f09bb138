//! # nlubot-telegram
//!
//! Telegram connector: adapters to [`nlubot_core::InboundEvent`], a [`nlubot_core::Transport`]
//! implementation, minimal config, and a REPL runner feeding a
//! [`turn_dispatcher::ConversationRouter`]. No recognition or dispatch logic lives here.

mod adapters;
mod config;
mod runner;
mod transport;

pub use adapters::{is_start_command, TelegramMessageWrapper, CHANNEL};
pub use config::TelegramConfig;
pub use runner::run_repl;
pub use transport::{parse_chat_id, render_reply, TelegramTransport};
