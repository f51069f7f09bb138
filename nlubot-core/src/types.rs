//! Core types: conversation, inbound event, recognition result and outbound reply.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::card::CardPayload;

/// Participant identity as the transport spells it (e.g. Telegram user id as a string).
pub type ParticipantId = String;

/// Intent name the recognizer returns when nothing matched.
pub const NONE_INTENT: &str = "None";

/// Conversation the event came from; replies go back to the same conversation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Conversation {
    pub id: String,
    #[serde(default)]
    pub channel: String,
}

impl Conversation {
    pub fn new(id: impl Into<String>, channel: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            channel: channel.into(),
        }
    }
}

/// Event kind. Serialized as its name: `message`, `conversationUpdate`, or the raw name of any other event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ActivityKind {
    Message,
    SessionStart,
    Other(String),
}

impl ActivityKind {
    pub fn name(&self) -> &str {
        match self {
            ActivityKind::Message => "message",
            ActivityKind::SessionStart => "conversationUpdate",
            ActivityKind::Other(name) => name,
        }
    }
}

impl From<String> for ActivityKind {
    fn from(name: String) -> Self {
        match name.as_str() {
            "message" => ActivityKind::Message,
            "conversationUpdate" => ActivityKind::SessionStart,
            _ => ActivityKind::Other(name),
        }
    }
}

impl From<ActivityKind> for String {
    fn from(kind: ActivityKind) -> Self {
        kind.name().to_string()
    }
}

impl fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One inbound conversational event. Immutable once received.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InboundEvent {
    #[serde(default)]
    pub id: String,
    pub conversation: Conversation,
    pub kind: ActivityKind,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub from: Option<ParticipantId>,
    /// Participants that joined; only meaningful for [`ActivityKind::SessionStart`].
    #[serde(default)]
    pub participants: Vec<ParticipantId>,
    /// The bot's own id on this channel.
    pub recipient_id: ParticipantId,
    #[serde(default = "Utc::now")]
    pub received_at: DateTime<Utc>,
}

impl InboundEvent {
    pub fn message(conversation: Conversation, text: impl Into<String>, recipient_id: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            conversation,
            kind: ActivityKind::Message,
            text: Some(text.into()),
            from: None,
            participants: Vec::new(),
            recipient_id: recipient_id.into(),
            received_at: Utc::now(),
        }
    }

    pub fn session_start(
        conversation: Conversation,
        participants: Vec<ParticipantId>,
        recipient_id: impl Into<String>,
    ) -> Self {
        Self {
            id: String::new(),
            conversation,
            kind: ActivityKind::SessionStart,
            text: None,
            from: None,
            participants,
            recipient_id: recipient_id.into(),
            received_at: Utc::now(),
        }
    }

    pub fn other(conversation: Conversation, name: impl Into<String>, recipient_id: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            conversation,
            kind: ActivityKind::Other(name.into()),
            text: None,
            from: None,
            participants: Vec::new(),
            recipient_id: recipient_id.into(),
            received_at: Utc::now(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Participants that should be greeted: everyone except the recipient, in input order.
    pub fn joined_participants(&self) -> impl Iterator<Item = &ParticipantId> {
        self.participants
            .iter()
            .filter(move |id| **id != self.recipient_id)
    }
}

/// Top-ranked intent with its confidence score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Intent {
    pub name: String,
    pub confidence: f64,
}

/// What the recognizer extracted from one utterance. Produced per message; not persisted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecognitionResult {
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub top_intent: Option<Intent>,
    #[serde(default)]
    pub entities: HashMap<String, Vec<serde_json::Value>>,
}

impl RecognitionResult {
    pub fn with_intent(name: impl Into<String>, confidence: f64) -> Self {
        Self {
            top_intent: Some(Intent {
                name: name.into(),
                confidence,
            }),
            ..Default::default()
        }
    }

    /// Extracted values for `entity_type`; empty when the key is absent.
    pub fn entity_values(&self, entity_type: &str) -> &[serde_json::Value] {
        self.entities
            .get(entity_type)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Top intent if it is a real match: not the `None` sentinel and scoring at least `min_score`.
    pub fn recognized_intent(&self, min_score: f64) -> Option<&Intent> {
        self.top_intent
            .as_ref()
            .filter(|intent| intent.name != NONE_INTENT && intent.confidence >= min_score)
    }
}

/// One reply handed to the transport. Ownership moves to the transport on send.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutboundReply {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub attachment: Option<Arc<CardPayload>>,
}

impl OutboundReply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            attachment: None,
        }
    }

    pub fn card(card: Arc<CardPayload>) -> Self {
        Self {
            text: None,
            attachment: Some(card),
        }
    }
}
