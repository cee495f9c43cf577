//! Runtime for executing the conversation
//!
//! One runtime task owns the live `ConversationState`. UI actions and remote
//! results arrive as events on a single channel and are applied in order;
//! clients observe the result through a snapshot and a broadcast stream.

mod executor;
pub mod traits;

#[cfg(test)]
pub mod testing;

pub use executor::ConversationRuntime;
pub use traits::*;

use crate::state_machine::{ConvContext, ConversationState, Event, SessionToken, Summary, Turn};
use chrono::Utc;
use tokio::sync::{broadcast, mpsc, watch};

/// Events sent to connected clients
#[derive(Debug, Clone)]
pub enum ClientEvent {
    /// Full state after every applied transition
    State { state: ConversationState },
    TurnAppended {
        session: SessionToken,
        index: usize,
        turn: Turn,
    },
    Revealed { summary: Summary },
    Error { message: String },
}

/// Handle to interact with the running conversation
#[derive(Clone)]
pub struct ConversationHandle {
    pub event_tx: mpsc::Sender<Event>,
    pub broadcast_tx: broadcast::Sender<ClientEvent>,
    snapshot_rx: watch::Receiver<ConversationState>,
}

impl ConversationHandle {
    /// Send an event to the conversation
    pub async fn send_event(&self, event: Event) -> Result<(), String> {
        self.event_tx
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {e}"))
    }

    pub async fn set_draft(&self, text: impl Into<String>) -> Result<(), String> {
        self.send_event(Event::DraftChanged { text: text.into() })
            .await
    }

    pub async fn submit(&self, text: impl Into<String>) -> Result<(), String> {
        self.send_event(Event::Submit {
            text: text.into(),
            at: Utc::now(),
        })
        .await
    }

    /// Submit the current draft, in order with any draft updates already sent
    pub async fn submit_draft(&self) -> Result<(), String> {
        self.send_event(Event::SubmitDraft { at: Utc::now() }).await
    }

    pub async fn reset(&self) -> Result<(), String> {
        self.send_event(Event::Reset { at: Utc::now() }).await
    }

    pub async fn animation_played(
        &self,
        session: SessionToken,
        index: usize,
    ) -> Result<(), String> {
        self.send_event(Event::EntryAnimationPlayed {
            token: session,
            index,
        })
        .await
    }

    /// Current state as last published by the runtime
    pub fn snapshot(&self) -> ConversationState {
        self.snapshot_rx.borrow().clone()
    }

    /// Watch the published state
    #[cfg(test)]
    pub fn watch(&self) -> watch::Receiver<ConversationState> {
        self.snapshot_rx.clone()
    }

    /// Subscribe to conversation updates
    pub fn subscribe(&self) -> broadcast::Receiver<ClientEvent> {
        self.broadcast_tx.subscribe()
    }
}

/// Start a conversation runtime in the background
pub fn spawn_conversation<C>(context: ConvContext, client: C) -> ConversationHandle
where
    C: ConversationClient + 'static,
{
    let initial = ConversationState::initial(&context, SessionToken::default(), Utc::now());

    let (event_tx, event_rx) = mpsc::channel(32);
    let (broadcast_tx, _) = broadcast::channel(128);
    let (snapshot_tx, snapshot_rx) = watch::channel(initial.clone());

    let runtime = ConversationRuntime::new(
        context,
        initial,
        client,
        event_rx,
        event_tx.downgrade(),
        broadcast_tx.clone(),
        snapshot_tx,
    );

    tokio::spawn(async move {
        runtime.run().await;
    });

    ConversationHandle {
        event_tx,
        broadcast_tx,
        snapshot_rx,
    }
}
