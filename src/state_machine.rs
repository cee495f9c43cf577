//! Core conversation state machine
//!
//! Implements the Elm Architecture pattern with pure state transitions.
//! The runtime owns the only live `ConversationState`; everything here is
//! deterministic given the state, context and event.

mod effect;
pub mod event;
pub mod gate;
pub mod log;
pub mod reveal;
pub mod state;
pub(crate) mod transition;


pub use effect::{Effect, Notice};
pub use event::Event;
pub use gate::RequestGate;
pub use log::{Sender, Turn};
pub use state::{ConvContext, ConversationState, SessionToken, Summary, Surface};
pub use transition::transition;
