//! Conversation runtime executor

use super::traits::ConversationClient;
use super::ClientEvent;

use crate::state_machine::{
    transition, ConvContext, ConversationState, Effect, Event, Notice, SessionToken,
};
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, watch};
use tokio_util::sync::CancellationToken;

/// Conversation runtime, generic over the backend client
pub struct ConversationRuntime<C>
where
    C: ConversationClient + 'static,
{
    context: ConvContext,
    state: ConversationState,
    client: Arc<C>,
    event_rx: mpsc::Receiver<Event>,
    /// Weak so the loop ends once every handle is dropped
    event_tx: mpsc::WeakSender<Event>,
    broadcast_tx: broadcast::Sender<ClientEvent>,
    snapshot_tx: watch::Sender<ConversationState>,
    /// Token to cancel the scheduled reveal timer
    reveal_cancel_token: Option<CancellationToken>,
}

impl<C> ConversationRuntime<C>
where
    C: ConversationClient + 'static,
{
    pub fn new(
        context: ConvContext,
        state: ConversationState,
        client: C,
        event_rx: mpsc::Receiver<Event>,
        event_tx: mpsc::WeakSender<Event>,
        broadcast_tx: broadcast::Sender<ClientEvent>,
        snapshot_tx: watch::Sender<ConversationState>,
    ) -> Self {
        Self {
            context,
            state,
            client: Arc::new(client),
            event_rx,
            event_tx,
            broadcast_tx,
            snapshot_tx,
            reveal_cancel_token: None,
        }
    }

    pub async fn run(mut self) {
        tracing::info!(session = %self.state.session_token, "Starting conversation runtime");

        // Events are applied strictly one at a time
        while let Some(event) = self.event_rx.recv().await {
            self.process_event(event);
        }

        self.cancel_reveal();
        tracing::info!(session = %self.state.session_token, "Conversation runtime stopped");
    }

    fn process_event(&mut self, event: Event) {
        let event_name = event.name();
        if let Event::RequestFailed {
            token,
            kind,
            message,
        } = &event
        {
            tracing::warn!(
                session = %token,
                error = %message,
                kind = kind.as_str(),
                "Advance request failed"
            );
        }

        // Pure state transition
        let result = match transition(&self.state, &self.context, event) {
            Ok(r) => r,
            Err(e) if e.is_silent() => {
                tracing::debug!(event = event_name, reason = %e, "Event ignored");
                return;
            }
            Err(e) => {
                tracing::warn!(event = event_name, error = %e, "Event rejected");
                return;
            }
        };

        let previous_session = self.state.session_token;
        self.state = result.new_state;
        if self.state.session_token != previous_session {
            tracing::info!(
                from = %previous_session,
                to = %self.state.session_token,
                "Conversation reset"
            );
        }
        tracing::debug!(
            event = event_name,
            session = %self.state.session_token,
            turns = self.state.log.len(),
            surface = ?self.state.surface(),
            "Transition applied"
        );
        self.publish_state();

        for effect in result.effects {
            self.execute_effect(effect);
        }
    }

    fn publish_state(&self) {
        self.snapshot_tx.send_replace(self.state.clone());
        let _ = self.broadcast_tx.send(ClientEvent::State {
            state: self.state.clone(),
        });
    }

    fn execute_effect(&mut self, effect: Effect) {
        match effect {
            Effect::RequestAdvance { token, user_text } => {
                self.request_advance(token, user_text);
            }

            Effect::ScheduleReveal { token, delay } => {
                self.schedule_reveal(token, delay);
            }

            Effect::CancelReveal => {
                self.cancel_reveal();
            }

            Effect::NotifyRemoteReset => {
                let client = Arc::clone(&self.client);
                tokio::spawn(async move {
                    // Local state is already fresh; the backend acknowledgment
                    // is not needed for anything.
                    if let Err(e) = client.reset().await {
                        tracing::warn!(error = %e, kind = e.kind.as_str(), "Remote reset failed");
                    }
                });
            }

            Effect::NotifyClient(notice) => {
                let event = match notice {
                    Notice::TurnAppended { index } => {
                        let Some(turn) = self.state.log.get(index) else {
                            return;
                        };
                        ClientEvent::TurnAppended {
                            session: self.state.session_token,
                            index,
                            turn: turn.clone(),
                        }
                    }
                    Notice::Revealed { summary } => ClientEvent::Revealed { summary },
                    Notice::Error { message } => ClientEvent::Error { message },
                };
                let _ = self.broadcast_tx.send(event);
            }
        }
    }

    /// The call is never aborted: a reset only makes its result stale.
    fn request_advance(&self, token: SessionToken, user_text: String) {
        let Some(event_tx) = self.event_tx.upgrade() else {
            return;
        };
        let client = Arc::clone(&self.client);

        tokio::spawn(async move {
            let event = match client.advance(&user_text).await {
                Ok(reply) => Event::ReplyReceived {
                    token,
                    reply,
                    at: Utc::now(),
                },
                Err(e) => Event::RequestFailed {
                    token,
                    kind: e.kind,
                    message: e.message,
                },
            };
            let _ = event_tx.send(event).await;
        });
    }

    fn schedule_reveal(&mut self, token: SessionToken, delay: Duration) {
        self.cancel_reveal();

        let Some(event_tx) = self.event_tx.upgrade() else {
            return;
        };
        let cancel = CancellationToken::new();
        self.reveal_cancel_token = Some(cancel.clone());

        tokio::spawn(async move {
            tokio::select! {
                () = cancel.cancelled() => {
                    tracing::debug!(session = %token, "Reveal timer cancelled");
                }
                () = tokio::time::sleep(delay) => {
                    let _ = event_tx.send(Event::RevealElapsed { token }).await;
                }
            }
        });
    }

    fn cancel_reveal(&mut self) {
        if let Some(token) = self.reveal_cancel_token.take() {
            token.cancel();
        }
    }
}
