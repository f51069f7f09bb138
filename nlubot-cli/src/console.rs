//! Console connector: [`InboundEvent`] JSON lines in, reply JSON lines out.
//!
//! Useful for trying the dispatcher without a chat platform:
//! `echo '{"conversation":{"id":"c1"},"kind":"message","text":"what time is it","recipientId":"bot"}' | nlubot emulate`

use async_trait::async_trait;
use nlubot_core::{Conversation, InboundEvent, OutboundReply, Transport, TransportError};
use serde::Serialize;
use std::io::Write;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{info, warn};
use turn_dispatcher::{ConversationRouter, TurnTicket};

/// One reply as printed by [`ConsoleTransport`].
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ConsoleReply<'a> {
    conversation_id: &'a str,
    #[serde(flatten)]
    reply: &'a OutboundReply,
}

/// Writes each reply as one JSON line.
pub struct ConsoleTransport<W> {
    out: Mutex<W>,
}

impl<W: Write + Send> ConsoleTransport<W> {
    pub fn new(out: W) -> Self {
        Self { out: Mutex::new(out) }
    }

    /// Runs `f` on the writer (e.g. to inspect a buffer in tests).
    pub fn with_output<R>(&self, f: impl FnOnce(&W) -> R) -> Result<R, TransportError> {
        let out = self
            .out
            .lock()
            .map_err(|_| TransportError::Send("console writer poisoned".to_string()))?;
        Ok(f(&out))
    }
}

#[async_trait]
impl<W: Write + Send> Transport for ConsoleTransport<W> {
    async fn send(&self, conversation: &Conversation, reply: OutboundReply) -> Result<(), TransportError> {
        let line = serde_json::to_string(&ConsoleReply {
            conversation_id: &conversation.id,
            reply: &reply,
        })
        .map_err(|e| TransportError::Send(e.to_string()))?;
        let mut out = self
            .out
            .lock()
            .map_err(|_| TransportError::Send("console writer poisoned".to_string()))?;
        writeln!(out, "{}", line).map_err(|e| TransportError::Send(e.to_string()))?;
        out.flush().map_err(|e| TransportError::Send(e.to_string()))?;
        Ok(())
    }
}

/// Counts reported at the end of an emulator run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct EmulatorStats {
    pub turns: usize,
    pub failed: usize,
    pub invalid_lines: usize,
}

/// Reads events until EOF, submits each to `router`, then waits for every turn.
pub async fn run_emulator<R>(reader: R, router: Arc<ConversationRouter>) -> anyhow::Result<EmulatorStats>
where
    R: AsyncBufRead + Unpin,
{
    let mut stats = EmulatorStats::default();
    let mut tickets: Vec<TurnTicket> = Vec::new();
    let mut lines = reader.lines();

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<InboundEvent>(line) {
            Ok(event) => tickets.push(router.submit(event)),
            Err(e) => {
                warn!(error = %e, "Skipping invalid event line");
                stats.invalid_lines += 1;
            }
        }
    }

    for ticket in tickets {
        stats.turns += 1;
        if ticket.outcome().await.is_err() {
            stats.failed += 1;
        }
    }

    info!(
        turns = stats.turns,
        failed = stats.failed,
        invalid_lines = stats.invalid_lines,
        "Emulator input exhausted"
    );
    Ok(stats)
}
