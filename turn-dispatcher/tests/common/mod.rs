//! Test doubles for [`nlubot_core::Transport`] and [`nlubot_core::Recognizer`].

#![allow(dead_code)]

use async_trait::async_trait;
use nlubot_core::{
    CardPayload, CardStore, Conversation, OutboundReply, RecognitionError, RecognitionResult,
    Recognizer, Transport, TransportError,
};
use serde_json::json;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// One recorded `send(conversation, reply)`.
#[derive(Debug, Clone)]
pub struct SentReply {
    pub conversation_id: String,
    pub reply: OutboundReply,
}

/// Records every reply; optionally fails after `fail_after` successful sends.
#[derive(Default)]
pub struct RecordingTransport {
    sent: Mutex<Vec<SentReply>>,
    fail_after: Option<usize>,
}

impl RecordingTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing_after(n: usize) -> Arc<Self> {
        Arc::new(Self {
            sent: Mutex::new(Vec::new()),
            fail_after: Some(n),
        })
    }

    pub fn sent(&self) -> Vec<SentReply> {
        self.sent.lock().unwrap().clone()
    }

    pub fn texts(&self) -> Vec<Option<String>> {
        self.sent().into_iter().map(|s| s.reply.text).collect()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send(&self, conversation: &Conversation, reply: OutboundReply) -> Result<(), TransportError> {
        let mut sent = self.sent.lock().unwrap();
        if let Some(limit) = self.fail_after {
            if sent.len() >= limit {
                return Err(TransportError::Send("channel unavailable".to_string()));
            }
        }
        sent.push(SentReply {
            conversation_id: conversation.id.clone(),
            reply,
        });
        Ok(())
    }
}

/// Returns a canned result per utterance (or no intent), after an optional delay.
pub struct StubRecognizer {
    results: HashMap<String, RecognitionResult>,
    delays: HashMap<String, Duration>,
    fail: bool,
    calls: AtomicUsize,
}

impl StubRecognizer {
    pub fn new() -> Self {
        Self {
            results: HashMap::new(),
            delays: HashMap::new(),
            fail: false,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }

    pub fn with(mut self, text: &str, result: RecognitionResult) -> Self {
        self.results.insert(text.to_string(), result);
        self
    }

    pub fn with_delay(mut self, text: &str, delay: Duration) -> Self {
        self.delays.insert(text.to_string(), delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Recognizer for StubRecognizer {
    async fn recognize(&self, text: &str) -> Result<RecognitionResult, RecognitionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delays.get(text) {
            tokio::time::sleep(*delay).await;
        }
        if self.fail {
            return Err(RecognitionError::Timeout);
        }
        Ok(self.results.get(text).cloned().unwrap_or_default())
    }
}

pub fn test_cards() -> Arc<CardStore> {
    let welcome = CardPayload::from_json(
        "welcomeCard.json",
        json!({"type": "AdaptiveCard", "body": [{"type": "TextBlock", "text": "Welcome!"}]}),
    )
    .unwrap();
    let fallback = CardPayload::from_json(
        "fallbackCard.json",
        json!({"type": "AdaptiveCard", "body": [{"type": "TextBlock", "text": "Sorry, I did not get that."}]}),
    )
    .unwrap();
    Arc::new(CardStore::new(welcome, fallback))
}

pub fn conversation(id: &str) -> Conversation {
    Conversation::new(id, "test")
}

pub fn card_name(reply: &OutboundReply) -> Option<&str> {
    reply.attachment.as_ref().map(|c| c.name.as_str())
}
