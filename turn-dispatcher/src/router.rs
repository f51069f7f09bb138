//! Per-conversation serialization.
//!
//! Each conversation id gets one unbounded queue and one worker task, created on first use.
//! Turns of one conversation run strictly in submission order; different conversations run
//! concurrently.
//!
//! **Data flow:** [`ConversationRouter::submit`] → enqueue per conversation → `run_queue` consumes
//! the queue → [`TurnDispatcher::handle_turn_until`] → outcome sent back to the [`TurnTicket`].

use dashmap::DashMap;
use nlubot_core::{InboundEvent, Result, TurnError};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{error, info, instrument};

use crate::dispatcher::{TurnDispatcher, TurnOutcome};

/// One queued turn: the event, its cancel flag and where to report the outcome.
struct QueuedTurn {
    event: InboundEvent,
    cancel_rx: watch::Receiver<bool>,
    outcome_tx: oneshot::Sender<Result<TurnOutcome>>,
}

type QueueSender = mpsc::UnboundedSender<QueuedTurn>;

/// Handle to a submitted turn. Dropping it does not cancel the turn.
pub struct TurnTicket {
    cancel_tx: watch::Sender<bool>,
    outcome_rx: oneshot::Receiver<Result<TurnOutcome>>,
}

impl TurnTicket {
    /// Aborts the turn if it has not got past recognition yet. No effect afterwards.
    pub fn cancel(&self) {
        let _ = self.cancel_tx.send(true);
    }

    /// Waits for the turn to finish.
    pub async fn outcome(self) -> Result<TurnOutcome> {
        self.outcome_rx.await.unwrap_or(Err(TurnError::Cancelled))
    }
}

/// Fans turns out to per-conversation workers.
pub struct ConversationRouter {
    dispatcher: Arc<TurnDispatcher>,
    queues: DashMap<String, QueueSender>,
}

impl ConversationRouter {
    pub fn new(dispatcher: Arc<TurnDispatcher>) -> Self {
        Self {
            dispatcher,
            queues: DashMap::new(),
        }
    }

    /// Number of conversations that have a worker.
    pub fn active_conversations(&self) -> usize {
        self.queues.len()
    }

    /// Queues `event` behind earlier turns of the same conversation. Must be called inside a
    /// tokio runtime.
    #[instrument(skip(self, event), fields(conversation_id = %event.conversation.id, event_id = %event.id))]
    pub fn submit(&self, event: InboundEvent) -> TurnTicket {
        let (cancel_tx, cancel_rx) = watch::channel(false);
        let (outcome_tx, outcome_rx) = oneshot::channel();
        let conversation_id = event.conversation.id.clone();
        let turn = QueuedTurn {
            event,
            cancel_rx,
            outcome_tx,
        };

        let tx = self
            .queues
            .entry(conversation_id.clone())
            .or_insert_with(|| self.spawn_worker(conversation_id.clone()))
            .clone();

        if let Err(mpsc::error::SendError(turn)) = tx.send(turn) {
            // Worker is gone; replace it and retry once.
            error!(conversation_id = %conversation_id, "Conversation worker stopped, restarting");
            let tx = self.spawn_worker(conversation_id.clone());
            self.queues.insert(conversation_id.clone(), tx.clone());
            if tx.send(turn).is_err() {
                error!(conversation_id = %conversation_id, "Failed to queue turn (receiver dropped)");
            }
        } else {
            info!("step: turn queued");
        }

        TurnTicket {
            cancel_tx,
            outcome_rx,
        }
    }

    /// Submits and waits for the outcome.
    pub async fn dispatch(&self, event: InboundEvent) -> Result<TurnOutcome> {
        self.submit(event).outcome().await
    }

    fn spawn_worker(&self, conversation_id: String) -> QueueSender {
        let (tx, rx) = mpsc::unbounded_channel::<QueuedTurn>();
        let dispatcher = self.dispatcher.clone();
        tokio::spawn(run_queue(rx, dispatcher, conversation_id));
        tx
    }
}

/// Consumes one conversation's queue, one turn at a time.
async fn run_queue(
    mut rx: mpsc::UnboundedReceiver<QueuedTurn>,
    dispatcher: Arc<TurnDispatcher>,
    conversation_id: String,
) {
    while let Some(turn) = rx.recv().await {
        let QueuedTurn {
            event,
            cancel_rx,
            outcome_tx,
        } = turn;

        let result = if *cancel_rx.borrow() {
            Err(TurnError::Cancelled)
        } else {
            dispatcher
                .handle_turn_until(&event, wait_for_cancel(cancel_rx))
                .await
        };

        match &result {
            Ok(_) => {}
            Err(TurnError::Cancelled) => {
                info!(
                    conversation_id = %conversation_id,
                    event_id = %event.id,
                    "Turn cancelled"
                );
            }
            Err(e) => {
                error!(
                    error = %e,
                    conversation_id = %conversation_id,
                    event_id = %event.id,
                    "Turn failed"
                );
            }
        }

        let _ = outcome_tx.send(result);
    }
}

/// Resolves once the flag flips to true; never resolves if the ticket was dropped.
async fn wait_for_cancel(mut rx: watch::Receiver<bool>) {
    loop {
        if *rx.borrow_and_update() {
            return;
        }
        if rx.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}
