//! Outbound side of a connector.
//!
//! [`Transport`] is channel-agnostic; the Telegram and console connectors implement it, tests
//! substitute recording mocks.

use async_trait::async_trait;

use crate::error::TransportError;
use crate::types::{Conversation, OutboundReply};

/// Delivers replies to the conversation an event came from.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends one reply. The reply is owned by the transport from here on.
    async fn send(&self, conversation: &Conversation, reply: OutboundReply) -> Result<(), TransportError>;
}
