//! Local HTTP bridge for the presentation layer
//!
//! The compose surface is driven through queued actions and observed through
//! a snapshot endpoint and an SSE stream; history and profile are read-only
//! projections of backend records.

mod handlers;
mod sse;
mod types;

pub use handlers::create_router;

use crate::remote::ReflectionService;
use crate::runtime::ConversationHandle;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub conversation: ConversationHandle,
    pub service: Arc<dyn ReflectionService>,
    pub user_id: String,
}

impl AppState {
    pub fn new(
        conversation: ConversationHandle,
        service: Arc<dyn ReflectionService>,
        user_id: impl Into<String>,
    ) -> Self {
        Self {
            conversation,
            service,
            user_id: user_id.into(),
        }
    }
}
