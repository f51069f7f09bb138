//! # nlubot-core
//!
//! Core types and traits for the turn dispatcher: [`InboundEvent`], [`RecognitionResult`],
//! [`OutboundReply`], [`CardStore`], the [`Recognizer`] and [`Transport`] seams, the error taxonomy,
//! and tracing initialization. Channel-agnostic; used by turn-dispatcher and the connectors.

pub mod card;
pub mod error;
pub mod logger;
pub mod recognizer;
pub mod transport;
pub mod types;

pub use card::{load_card, CardPayload, CardStore, ADAPTIVE_CARD_CONTENT_TYPE, DEFAULT_FALLBACK_CARD, DEFAULT_WELCOME_CARD};
pub use error::{ConfigError, RecognitionError, Result, TransportError, TurnError};
pub use logger::{init_file_tracing, init_tracing};
pub use recognizer::{Recognizer, StaticRecognizer};
pub use transport::Transport;
pub use types::{
    ActivityKind, Conversation, InboundEvent, Intent, OutboundReply, ParticipantId, RecognitionResult,
    NONE_INTENT,
};
