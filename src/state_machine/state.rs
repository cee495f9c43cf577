//! Conversation state types

use super::log::{MessageLog, Turn};
use super::reveal::DEFAULT_REVEAL_DELAY;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Prompt every fresh conversation opens with
pub const DEFAULT_OPENING_PROMPT: &str = "What did you do today?";

/// Expecting tag of the opening prompt
pub const DEFAULT_OPENING_TAG: &str = "today_action";

/// Generation counter identifying one conversation instance.
///
/// Every reset moves to the next token; remote results carry the token that
/// was current when their call was issued and are dropped on mismatch.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct SessionToken(u64);

impl SessionToken {
    #[cfg(test)]
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }

    #[cfg(test)]
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Artifacts revealed once the dialog concludes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub daily_stroke: String,
    pub self_portrait: String,
}

/// What the visible surface currently shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Surface {
    /// Input bar visible
    Composing,
    /// A remote call is outstanding
    Sending,
    /// Summary replaced the input bar; only reset leaves this state
    Revealed,
}

/// The conversation aggregate
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversationState {
    pub log: MessageLog,
    pub awaiting_response: bool,
    pub draft_input: String,
    pub revealed: bool,
    /// Present iff `revealed`
    pub summary: Option<Summary>,
    /// Terminal summary waiting for the reveal timer
    pub pending_reveal: Option<Summary>,
    pub transient_error: Option<String>,
    pub session_token: SessionToken,
}

impl ConversationState {
    /// Fresh state seeded with the opening prompt
    pub fn initial(context: &ConvContext, session_token: SessionToken, at: DateTime<Utc>) -> Self {
        Self {
            log: MessageLog::seeded(Turn::opening(
                &context.opening_prompt,
                &context.opening_tag,
                at,
            )),
            awaiting_response: false,
            draft_input: String::new(),
            revealed: false,
            summary: None,
            pending_reveal: None,
            transient_error: None,
            session_token,
        }
    }

    pub fn surface(&self) -> Surface {
        if self.revealed {
            Surface::Revealed
        } else if self.awaiting_response {
            Surface::Sending
        } else {
            Surface::Composing
        }
    }

    /// Input is frozen from the terminal reply onwards
    pub fn is_locked(&self) -> bool {
        self.revealed || self.pending_reveal.is_some()
    }
}

/// Conversation configuration (immutable for the runtime's lifetime)
#[derive(Debug, Clone)]
pub struct ConvContext {
    pub opening_prompt: String,
    pub opening_tag: String,
    /// Lets the terminal turn's entrance finish before the input bar goes away
    pub reveal_delay: Duration,
}

impl ConvContext {
    pub fn new(reveal_delay: Duration) -> Self {
        Self {
            opening_prompt: DEFAULT_OPENING_PROMPT.to_string(),
            opening_tag: DEFAULT_OPENING_TAG.to_string(),
            reveal_delay,
        }
    }
}

impl Default for ConvContext {
    fn default() -> Self {
        Self::new(DEFAULT_REVEAL_DELAY)
    }
}
