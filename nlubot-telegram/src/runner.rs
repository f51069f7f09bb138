//! REPL runner: converts teloxide messages to [`InboundEvent`](nlubot_core::InboundEvent)s and
//! submits them to the [`ConversationRouter`]. Calls get_me() first to learn the bot's own id.

use anyhow::{Context, Result};
use std::sync::Arc;
use teloxide::prelude::*;
use tracing::{info, instrument};
use turn_dispatcher::ConversationRouter;

use super::adapters::TelegramMessageWrapper;

/// Starts the REPL. Each message is converted and queued on its chat's conversation; the
/// router's worker logs turn failures. Returns when the REPL stops.
#[instrument(skip(bot, router))]
pub async fn run_repl(bot: teloxide::Bot, router: Arc<ConversationRouter>) -> Result<()> {
    let me = bot.get_me().await.context("getMe failed; check BOT_TOKEN")?;
    let bot_id = me.user.id.0.to_string();
    info!(
        bot_id = %bot_id,
        username = ?me.user.username,
        "Bot identity resolved before repl"
    );

    teloxide::repl(bot, move |_bot: Bot, msg: teloxide::types::Message| {
        let router = router.clone();
        let bot_id = bot_id.clone();

        async move {
            let event = TelegramMessageWrapper(&msg).to_event(&bot_id);
            info!(
                chat_id = %event.conversation.id,
                event_id = %event.id,
                kind = %event.kind,
                "Received Telegram update"
            );
            // Outcome is reported through the router's logging; the ticket is not awaited.
            let _ticket = router.submit(event);
            Ok(())
        }
    })
    .await;

    Ok(())
}
