//! Pure state transition function
//!
//! Given the same state, context and event this always produces the same
//! result; all I/O is described by the returned effects.

use super::gate::{GateRejection, RequestGate};
use super::log::Turn;
use super::reveal::terminal_summary;
use super::{ConvContext, ConversationState, Effect, Event, SessionToken};
use thiserror::Error;

/// Retry prompt shown after a failed advance call
pub const RETRY_PROMPT: &str = "Something went wrong. Try again?";

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: ConversationState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: ConversationState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    #[must_use]
    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    #[must_use]
    pub fn with_effects(mut self, effects: impl IntoIterator<Item = Effect>) -> Self {
        self.effects.extend(effects);
        self
    }
}

/// Reasons an event leaves the state untouched
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error(transparent)]
    Rejected(#[from] GateRejection),
    #[error("Event from session {event} ignored, current session is {current}")]
    StaleSession {
        event: SessionToken,
        current: SessionToken,
    },
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
}

impl TransitionError {
    /// Validation rejections and stale results are expected traffic and are
    /// never surfaced to the user.
    pub fn is_silent(&self) -> bool {
        matches!(self, Self::Rejected(_) | Self::StaleSession { .. })
    }
}

/// Pure transition function
pub fn transition(
    state: &ConversationState,
    context: &ConvContext,
    event: Event,
) -> Result<TransitionResult, TransitionError> {
    if let Some(token) = event.token() {
        if token != state.session_token {
            return Err(TransitionError::StaleSession {
                event: token,
                current: state.session_token,
            });
        }
    }

    match event {
        // ============================================================
        // Compose surface
        // ============================================================
        Event::DraftChanged { text } => {
            if state.revealed {
                return Err(GateRejection::SurfaceLocked.into());
            }
            let mut next = state.clone();
            next.draft_input = text;
            Ok(TransitionResult::new(next))
        }

        Event::Submit { text, at } => submit_text(state, &text, at),

        Event::SubmitDraft { at } => submit_text(state, &state.draft_input, at),

        Event::EntryAnimationPlayed { index, .. } => {
            let mut next = state.clone();
            if next.log.mark_animation_played(index) {
                Ok(TransitionResult::new(next))
            } else {
                Err(TransitionError::InvalidTransition(format!(
                    "No pending entrance animation for turn {index}"
                )))
            }
        }

        // ============================================================
        // Remote results
        // ============================================================
        Event::ReplyReceived { reply, at, .. } => {
            if !state.awaiting_response {
                return Err(TransitionError::InvalidTransition(
                    "Reply received with no request outstanding".to_string(),
                ));
            }

            // A reply with nothing to show is a failed round trip
            if reply.message.trim().is_empty() {
                return Ok(fail_request(state));
            }

            let expecting_tag = (!reply.expecting.is_empty()).then(|| reply.expecting.clone());
            let summary = terminal_summary(&reply);

            let mut next = state.clone();
            let index = next
                .log
                .append(Turn::assistant(reply.message, expecting_tag, at));
            next.awaiting_response = false;

            let result = TransitionResult::new(next).with_effect(Effect::notify_turn(index));
            match summary {
                Some(summary) => {
                    let mut result = result.with_effect(Effect::ScheduleReveal {
                        token: state.session_token,
                        delay: context.reveal_delay,
                    });
                    result.new_state.pending_reveal = Some(summary);
                    Ok(result)
                }
                None => {
                    let mut result = result;
                    result.new_state.revealed = false;
                    result.new_state.summary = None;
                    if result.new_state.pending_reveal.take().is_some() {
                        result = result.with_effect(Effect::CancelReveal);
                    }
                    Ok(result)
                }
            }
        }

        Event::RequestFailed { .. } => {
            if !state.awaiting_response {
                return Err(TransitionError::InvalidTransition(
                    "Failure reported with no request outstanding".to_string(),
                ));
            }

            Ok(fail_request(state))
        }

        // ============================================================
        // Reveal
        // ============================================================
        Event::RevealElapsed { .. } => {
            let Some(summary) = state.pending_reveal.clone() else {
                return Err(TransitionError::InvalidTransition(
                    "Reveal timer fired with nothing pending".to_string(),
                ));
            };

            let mut next = state.clone();
            next.pending_reveal = None;
            next.revealed = true;
            next.summary = Some(summary.clone());
            next.draft_input.clear();
            Ok(TransitionResult::new(next).with_effect(Effect::notify_revealed(summary)))
        }

        // ============================================================
        // Reset: replace the state wholesale under a new session
        // ============================================================
        Event::Reset { at } => {
            let next = ConversationState::initial(context, state.session_token.next(), at);
            Ok(TransitionResult::new(next)
                .with_effects([Effect::CancelReveal, Effect::NotifyRemoteReset]))
        }
    }
}

/// The user's turn stays in the log; nothing is retried automatically.
fn fail_request(state: &ConversationState) -> TransitionResult {
    let mut next = state.clone();
    next.awaiting_response = false;
    next.transient_error = Some(RETRY_PROMPT.to_string());
    TransitionResult::new(next).with_effect(Effect::notify_error(RETRY_PROMPT))
}

fn submit_text(
    state: &ConversationState,
    text: &str,
    at: chrono::DateTime<chrono::Utc>,
) -> Result<TransitionResult, TransitionError> {
    let user_text = RequestGate::check(state, text)?.to_string();

    let mut next = state.clone();
    let index = next.log.append(Turn::user(&user_text, at));
    next.awaiting_response = true;
    next.transient_error = None;
    next.draft_input.clear();

    Ok(TransitionResult::new(next)
        .with_effect(Effect::notify_turn(index))
        .with_effect(Effect::RequestAdvance {
            token: state.session_token,
            user_text,
        }))
}
