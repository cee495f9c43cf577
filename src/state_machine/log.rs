//! Append-only record of dialog turns

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who authored a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sender {
    User,
    Assistant,
}

/// One message in the dialog
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Turn {
    pub sender: Sender,
    pub text: String,
    /// What the dialog expects next (assistant turns only)
    pub expecting_tag: Option<String>,
    pub sent_at: DateTime<Utc>,
    /// Cleared by the presentation layer once the entrance animation played
    pub entry_animation_pending: bool,
}

impl Turn {
    pub fn user(text: impl Into<String>, sent_at: DateTime<Utc>) -> Self {
        Self {
            sender: Sender::User,
            text: text.into(),
            expecting_tag: None,
            sent_at,
            entry_animation_pending: true,
        }
    }

    pub fn assistant(
        text: impl Into<String>,
        expecting_tag: Option<String>,
        sent_at: DateTime<Utc>,
    ) -> Self {
        Self {
            sender: Sender::Assistant,
            text: text.into(),
            expecting_tag,
            sent_at,
            entry_animation_pending: true,
        }
    }

    /// The seeded prompt a fresh conversation opens with. It is already on
    /// screen when the surface appears, so it never animates in.
    pub fn opening(
        text: impl Into<String>,
        expecting_tag: impl Into<String>,
        sent_at: DateTime<Utc>,
    ) -> Self {
        Self {
            sender: Sender::Assistant,
            text: text.into(),
            expecting_tag: Some(expecting_tag.into()),
            sent_at,
            entry_animation_pending: false,
        }
    }

    #[cfg(test)]
    pub fn is_assistant(&self) -> bool {
        self.sender == Sender::Assistant
    }
}

/// Ordered turns; insertion order is chronological order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct MessageLog {
    turns: Vec<Turn>,
}

impl MessageLog {
    pub fn seeded(turn: Turn) -> Self {
        Self { turns: vec![turn] }
    }

    /// Append a turn and return its index.
    ///
    /// A turn stamped earlier than the current tail (clock skew between the
    /// submit and reply paths) is clamped to the tail's timestamp.
    pub fn append(&mut self, mut turn: Turn) -> usize {
        if let Some(last) = self.turns.last() {
            if turn.sent_at < last.sent_at {
                turn.sent_at = last.sent_at;
            }
        }
        self.turns.push(turn);
        self.turns.len() - 1
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn get(&self, index: usize) -> Option<&Turn> {
        self.turns.get(index)
    }

    #[cfg(test)]
    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    #[cfg(test)]
    pub fn has_assistant_turn(&self) -> bool {
        self.turns.iter().any(Turn::is_assistant)
    }

    /// Returns false if there is no turn at `index` or it already played.
    pub fn mark_animation_played(&mut self, index: usize) -> bool {
        match self.turns.get_mut(index) {
            Some(turn) if turn.entry_animation_pending => {
                turn.entry_animation_pending = false;
                true
            }
            _ => false,
        }
    }
}
