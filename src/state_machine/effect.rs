//! Effects produced by state transitions

use super::state::{SessionToken, Summary};
use std::time::Duration;

/// Effects to be executed after state transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Send the user's turn to the backend (spawns as background task)
    RequestAdvance {
        token: SessionToken,
        user_text: String,
    },

    /// Fire `RevealElapsed` after `delay`
    ScheduleReveal { token: SessionToken, delay: Duration },

    /// Drop a scheduled reveal timer, if any
    CancelReveal,

    /// Best-effort server-side reset; failures are swallowed
    NotifyRemoteReset,

    /// Notify connected clients
    NotifyClient(Notice),
}

/// Client notifications beyond the state snapshot that follows every
/// applied transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    TurnAppended { index: usize },
    Revealed { summary: Summary },
    Error { message: String },
}

impl Effect {
    pub fn notify_turn(index: usize) -> Self {
        Effect::NotifyClient(Notice::TurnAppended { index })
    }

    pub fn notify_revealed(summary: Summary) -> Self {
        Effect::NotifyClient(Notice::Revealed { summary })
    }

    pub fn notify_error(message: impl Into<String>) -> Self {
        Effect::NotifyClient(Notice::Error {
            message: message.into(),
        })
    }
}
