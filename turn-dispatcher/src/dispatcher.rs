//! Turn dispatcher: routes one inbound event to the message, session-start or other-event path
//! and sends the resulting replies through the [`Transport`].
//!
//! Each turn is independent. The recognizer call is the only suspension point before the first
//! reply; a turn cancelled while waiting on it sends nothing.

use nlubot_core::{
    ActivityKind, CardStore, InboundEvent, OutboundReply, Recognizer, Result, Transport, TurnError,
};
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Reply sent when the recognizer returns a real intent.
pub const DEFAULT_INTENT_REPLY: &str = "22 Hours";

/// Entity type read (and only logged) on every recognized message.
pub const NUMBER_ENTITY: &str = "number";

#[derive(Debug, Clone, PartialEq)]
pub struct DispatcherConfig {
    pub intent_reply: String,
    /// Top intents scoring below this are treated like the `None` intent.
    pub min_score: f64,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            intent_reply: DEFAULT_INTENT_REPLY.to_string(),
            min_score: 0.0,
        }
    }
}

/// Which path a turn took.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnRoute {
    /// Recognized intent; the fixed reply was sent.
    Intent(String),
    /// No intent (or `None`); the fallback card was sent.
    Fallback,
    /// Session start; one welcome card per joined participant.
    Welcome,
    /// Any other event kind; its name was echoed back.
    Diagnostic,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnOutcome {
    pub route: TurnRoute,
    pub replies_sent: usize,
}

impl TurnOutcome {
    fn new(route: TurnRoute, replies_sent: usize) -> Self {
        Self { route, replies_sent }
    }
}

/// Routes inbound events. Cheap to clone; all collaborators are shared.
#[derive(Clone)]
pub struct TurnDispatcher {
    recognizer: Arc<dyn Recognizer>,
    transport: Arc<dyn Transport>,
    cards: Arc<CardStore>,
    config: DispatcherConfig,
}

impl TurnDispatcher {
    /// Creates a dispatcher. `cards` must already be loaded and validated.
    pub fn new(recognizer: Arc<dyn Recognizer>, transport: Arc<dyn Transport>, cards: Arc<CardStore>) -> Self {
        Self {
            recognizer,
            transport,
            cards,
            config: DispatcherConfig::default(),
        }
    }

    pub fn with_config(mut self, config: DispatcherConfig) -> Self {
        self.config = config;
        self
    }

    /// Handles one turn to completion.
    pub async fn handle_turn(&self, event: &InboundEvent) -> Result<TurnOutcome> {
        self.handle_turn_until(event, std::future::pending::<()>()).await
    }

    /// Handles one turn; if `cancelled` resolves before recognition returns, the turn aborts with
    /// [`TurnError::Cancelled`] and no reply is sent.
    #[instrument(
        skip(self, event, cancelled),
        fields(conversation_id = %event.conversation.id, event_id = %event.id, kind = %event.kind)
    )]
    pub async fn handle_turn_until<C>(&self, event: &InboundEvent, cancelled: C) -> Result<TurnOutcome>
    where
        C: Future<Output = ()> + Send,
    {
        info!("step: turn started");

        let outcome = match &event.kind {
            ActivityKind::Message => self.on_message(event, cancelled).await?,
            ActivityKind::SessionStart => self.on_session_start(event).await?,
            ActivityKind::Other(_) => self.on_other(event).await?,
        };

        info!(
            route = ?outcome.route,
            replies_sent = outcome.replies_sent,
            "step: turn finished"
        );
        Ok(outcome)
    }

    async fn on_message<C>(&self, event: &InboundEvent, cancelled: C) -> Result<TurnOutcome>
    where
        C: Future<Output = ()> + Send,
    {
        let text = match event.text.as_deref().filter(|t| !t.trim().is_empty()) {
            Some(text) => text,
            None => {
                info!("Message has no text, sending fallback card");
                self.send(event, OutboundReply::card(self.cards.fallback())).await?;
                return Ok(TurnOutcome::new(TurnRoute::Fallback, 1));
            }
        };

        debug!(text_len = text.len(), "step: recognizing");
        let result = tokio::select! {
            biased;
            _ = cancelled => {
                info!("Turn cancelled during recognition, no reply sent");
                return Err(TurnError::Cancelled);
            }
            result = self.recognizer.recognize(text) => result?,
        };

        let numbers = result.entity_values(NUMBER_ENTITY);
        debug!(number_entities = numbers.len(), "Entities read");

        match result.recognized_intent(self.config.min_score) {
            Some(intent) => {
                info!(
                    intent = %intent.name,
                    score = intent.confidence,
                    "Intent recognized"
                );
                let route = TurnRoute::Intent(intent.name.clone());
                self.send(event, OutboundReply::text(self.config.intent_reply.clone()))
                    .await?;
                Ok(TurnOutcome::new(route, 1))
            }
            None => {
                info!(
                    top_intent = ?result.top_intent.as_ref().map(|i| i.name.as_str()),
                    "No intent recognized, sending fallback card"
                );
                self.send(event, OutboundReply::card(self.cards.fallback())).await?;
                Ok(TurnOutcome::new(TurnRoute::Fallback, 1))
            }
        }
    }

    async fn on_session_start(&self, event: &InboundEvent) -> Result<TurnOutcome> {
        let mut sent = 0;
        for participant in event.joined_participants() {
            debug!(participant = %participant, "Sending welcome card");
            self.send(event, OutboundReply::card(self.cards.welcome())).await?;
            sent += 1;
        }
        Ok(TurnOutcome::new(TurnRoute::Welcome, sent))
    }

    async fn on_other(&self, event: &InboundEvent) -> Result<TurnOutcome> {
        self.send(event, OutboundReply::text(event.kind.name())).await?;
        Ok(TurnOutcome::new(TurnRoute::Diagnostic, 1))
    }

    async fn send(&self, event: &InboundEvent, reply: OutboundReply) -> Result<()> {
        self.transport.send(&event.conversation, reply).await?;
        Ok(())
    }
}
