//! # Turn dispatcher
//!
//! Classifies each inbound event (message, session start, other) and routes it: messages go
//! through the [`Recognizer`](nlubot_core::Recognizer) and get a fixed reply or the fallback card,
//! session starts greet every joined participant, anything else gets a diagnostic echo.
//! [`ConversationRouter`] serializes turns per conversation and runs conversations concurrently.

mod dispatcher;
mod router;

pub use dispatcher::{
    DispatcherConfig, TurnDispatcher, TurnOutcome, TurnRoute, DEFAULT_INTENT_REPLY, NUMBER_ENTITY,
};
pub use router::{ConversationRouter, TurnTicket};

// Integration tests live in tests/turn_dispatcher_test.rs and tests/conversation_router_test.rs
