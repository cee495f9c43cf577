//! API request and response types

use crate::display::format_turn_time;
use crate::state_machine::{
    ConversationState, RequestGate, Sender, SessionToken, Summary, Surface, Turn,
};
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Submit request; without `text` the current draft is submitted
#[derive(Debug, Default, Deserialize)]
pub struct SubmitRequest {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DraftRequest {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct AnimationPlayedRequest {
    pub session: SessionToken,
}

/// Acknowledgment for queued user actions
#[derive(Debug, Serialize)]
pub struct AcceptedResponse {
    pub accepted: bool,
}

impl AcceptedResponse {
    pub fn yes() -> Self {
        Self { accepted: true }
    }
}

/// A turn as rendered by the compose surface
#[derive(Debug, Clone, Serialize)]
pub struct TurnView {
    pub index: usize,
    pub sender: Sender,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expecting_tag: Option<String>,
    pub sent_at: DateTime<Utc>,
    pub display_time: String,
    pub entry_animation_pending: bool,
}

impl TurnView {
    pub fn new<Tz>(index: usize, turn: &Turn, now: &DateTime<Tz>) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        let local_sent = turn.sent_at.with_timezone(&now.timezone());
        Self {
            index,
            sender: turn.sender,
            text: turn.text.clone(),
            expecting_tag: turn.expecting_tag.clone(),
            sent_at: turn.sent_at,
            display_time: format_turn_time(&local_sent, now),
            entry_animation_pending: turn.entry_animation_pending,
        }
    }
}

/// Everything the presentation layer needs to draw the conversation
#[derive(Debug, Clone, Serialize)]
pub struct ConversationSnapshot {
    pub session: SessionToken,
    pub surface: Surface,
    pub awaiting_response: bool,
    /// Whether submitting the current draft would be admitted
    pub can_submit: bool,
    pub draft_input: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transient_error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<Summary>,
    pub turns: Vec<TurnView>,
}

impl ConversationSnapshot {
    pub fn from_state<Tz>(state: &ConversationState, now: &DateTime<Tz>) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        Self {
            session: state.session_token,
            surface: state.surface(),
            awaiting_response: state.awaiting_response,
            can_submit: RequestGate::admits(state, &state.draft_input),
            draft_input: state.draft_input.clone(),
            transient_error: state.transient_error.clone(),
            summary: state.summary.clone(),
            turns: state
                .log
                .turns()
                .iter()
                .enumerate()
                .map(|(index, turn)| TurnView::new(index, turn, now))
                .collect(),
        }
    }
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}
