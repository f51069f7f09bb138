//! Adapters from Telegram (teloxide) messages to [`InboundEvent`]s.
//!
//! Mapping: `/start` → session start for the sender; `new_chat_members` → session start for the
//! joined users; other text → message; anything else → other, named after the Telegram content.

use nlubot_core::{ActivityKind, Conversation, InboundEvent, ParticipantId};

/// Channel name stamped on every Telegram conversation.
pub const CHANNEL: &str = "telegram";

/// Wraps a teloxide Message for conversion to an [`InboundEvent`].
pub struct TelegramMessageWrapper<'a>(pub &'a teloxide::types::Message);

impl<'a> TelegramMessageWrapper<'a> {
    /// Converts the message. `recipient_id` is the bot's own Telegram user id.
    pub fn to_event(&self, recipient_id: &str) -> InboundEvent {
        let msg = self.0;
        let from = msg.from.as_ref().map(|u| u.id.0.to_string());

        let (kind, text, participants) = if let Some(members) = msg.new_chat_members() {
            let joined: Vec<ParticipantId> = members.iter().map(|u| u.id.0.to_string()).collect();
            (ActivityKind::SessionStart, None, joined)
        } else if let Some(text) = msg.text() {
            if is_start_command(text) {
                (ActivityKind::SessionStart, None, from.iter().cloned().collect())
            } else {
                (ActivityKind::Message, Some(text.to_string()), Vec::new())
            }
        } else {
            (ActivityKind::Other(self.other_kind_name().to_string()), None, Vec::new())
        };

        InboundEvent {
            id: msg.id.to_string(),
            conversation: Conversation::new(msg.chat.id.0.to_string(), CHANNEL),
            kind,
            text,
            from,
            participants,
            recipient_id: recipient_id.to_string(),
            received_at: msg.date,
        }
    }

    /// Telegram field name of the content this message carries, for non-text messages.
    fn other_kind_name(&self) -> &'static str {
        let msg = self.0;
        if msg.left_chat_member().is_some() {
            "left_chat_member"
        } else if msg.photo().is_some() {
            "photo"
        } else if msg.sticker().is_some() {
            "sticker"
        } else if msg.document().is_some() {
            "document"
        } else if msg.voice().is_some() {
            "voice"
        } else if msg.video().is_some() {
            "video"
        } else if msg.audio().is_some() {
            "audio"
        } else if msg.location().is_some() {
            "location"
        } else if msg.contact().is_some() {
            "contact"
        } else {
            "unsupported"
        }
    }
}

/// `/start`, `/start payload` or `/start@botname`.
pub fn is_start_command(text: &str) -> bool {
    let command = text.split_whitespace().next().unwrap_or("");
    command == "/start" || command.starts_with("/start@")
}
