//! Wraps teloxide::Bot and implements [`nlubot_core::Transport`]. Telegram has no card support,
//! so attachments are sent as their plain-text rendering.

use async_trait::async_trait;
use nlubot_core::{Conversation, OutboundReply, Transport, TransportError};
use teloxide::{prelude::*, types::ChatId};
use tracing::{info, warn};

/// Thin wrapper around teloxide::Bot that implements the core Transport trait.
pub struct TelegramTransport {
    bot: teloxide::Bot,
}

impl TelegramTransport {
    pub fn new(bot: teloxide::Bot) -> Self {
        Self { bot }
    }
}

/// Text sent to Telegram for `reply`: its text, then the card summary, separated by a blank line.
pub fn render_reply(reply: &OutboundReply) -> String {
    let mut parts: Vec<String> = Vec::new();
    if let Some(text) = reply.text.as_deref().filter(|t| !t.trim().is_empty()) {
        parts.push(text.to_string());
    }
    if let Some(card) = &reply.attachment {
        let summary = card.plain_text();
        if !summary.is_empty() {
            parts.push(summary);
        }
    }
    parts.join("\n\n")
}

pub fn parse_chat_id(conversation: &Conversation) -> Result<ChatId, TransportError> {
    conversation
        .id
        .parse::<i64>()
        .map(ChatId)
        .map_err(|_| TransportError::InvalidConversation(conversation.id.clone()))
}

#[async_trait]
impl Transport for TelegramTransport {
    async fn send(&self, conversation: &Conversation, reply: OutboundReply) -> Result<(), TransportError> {
        let chat_id = parse_chat_id(conversation)?;
        let text = render_reply(&reply);
        if text.is_empty() {
            warn!(chat_id = chat_id.0, "Reply renders to empty text");
            return Err(TransportError::Send("reply renders to empty text".to_string()));
        }
        self.bot
            .send_message(chat_id, text)
            .await
            .map_err(|e| TransportError::Send(e.to_string()))?;
        info!(
            chat_id = chat_id.0,
            card = ?reply.attachment.as_ref().map(|c| c.name.as_str()),
            "Reply sent"
        );
        Ok(())
    }
}
