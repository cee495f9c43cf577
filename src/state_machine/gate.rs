//! Submission admission
//!
//! At most one remote call may be outstanding per conversation. Rejected
//! submissions are not queued; the caller retries once the gate reopens.

use super::state::ConversationState;
use thiserror::Error;

/// Why a submission was not admitted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GateRejection {
    #[error("Input is empty")]
    EmptyInput,
    #[error("A reply is still pending")]
    Busy,
    #[error("Conversation is concluded; reset to start over")]
    SurfaceLocked,
}

pub struct RequestGate;

impl RequestGate {
    /// Admit `text` against `state`, returning the trimmed text to send.
    pub fn check<'a>(state: &ConversationState, text: &'a str) -> Result<&'a str, GateRejection> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(GateRejection::EmptyInput);
        }
        if state.awaiting_response {
            return Err(GateRejection::Busy);
        }
        if state.is_locked() {
            return Err(GateRejection::SurfaceLocked);
        }
        Ok(trimmed)
    }

    pub fn admits(state: &ConversationState, text: &str) -> bool {
        Self::check(state, text).is_ok()
    }
}
