//! Events that can occur in a conversation

use super::state::SessionToken;
use crate::remote::{AdvanceReply, RemoteErrorKind};
use chrono::{DateTime, Utc};

/// Events that trigger state transitions
#[derive(Debug, Clone)]
pub enum Event {
    // User events
    DraftChanged {
        text: String,
    },
    Submit {
        text: String,
        at: DateTime<Utc>,
    },
    /// Submit whatever is currently in the draft
    SubmitDraft {
        at: DateTime<Utc>,
    },
    Reset {
        at: DateTime<Utc>,
    },
    /// The presentation layer played the entrance animation of a turn
    EntryAnimationPlayed {
        token: SessionToken,
        index: usize,
    },

    // Remote events, tagged with the session that issued the call
    ReplyReceived {
        token: SessionToken,
        reply: AdvanceReply,
        at: DateTime<Utc>,
    },
    RequestFailed {
        token: SessionToken,
        kind: RemoteErrorKind,
        message: String,
    },

    // Timer events
    RevealElapsed {
        token: SessionToken,
    },
}

impl Event {
    /// Session the event belongs to; `None` for events that always apply
    /// to the current session.
    pub fn token(&self) -> Option<SessionToken> {
        match self {
            Event::EntryAnimationPlayed { token, .. }
            | Event::ReplyReceived { token, .. }
            | Event::RequestFailed { token, .. }
            | Event::RevealElapsed { token } => Some(*token),
            Event::DraftChanged { .. }
            | Event::Submit { .. }
            | Event::SubmitDraft { .. }
            | Event::Reset { .. } => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Event::DraftChanged { .. } => "draft_changed",
            Event::Submit { .. } => "submit",
            Event::SubmitDraft { .. } => "submit_draft",
            Event::Reset { .. } => "reset",
            Event::EntryAnimationPlayed { .. } => "entry_animation_played",
            Event::ReplyReceived { .. } => "reply_received",
            Event::RequestFailed { .. } => "request_failed",
            Event::RevealElapsed { .. } => "reveal_elapsed",
        }
    }
}
