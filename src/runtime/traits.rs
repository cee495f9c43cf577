//! Trait abstractions for runtime I/O
//!
//! These traits enable testing the executor with mock implementations.

use crate::remote::{AdvanceReply, AdvanceRequest, ReflectionService, RemoteError, ResetRequest};
use async_trait::async_trait;
use std::sync::Arc;

/// The conversation's view of the backend: one dialog, one user
#[async_trait]
pub trait ConversationClient: Send + Sync {
    /// Advance the dialog with the user's turn
    async fn advance(&self, user_text: &str) -> Result<AdvanceReply, RemoteError>;

    /// Reset the server-side session
    async fn reset(&self) -> Result<(), RemoteError>;
}

#[async_trait]
impl<T: ConversationClient + ?Sized> ConversationClient for Arc<T> {
    async fn advance(&self, user_text: &str) -> Result<AdvanceReply, RemoteError> {
        (**self).advance(user_text).await
    }

    async fn reset(&self) -> Result<(), RemoteError> {
        (**self).reset().await
    }
}

// ============================================================================
// Production Adapter
// ============================================================================

/// Adapter binding a `ReflectionService` to the configured user
pub struct ServiceConversationClient {
    service: Arc<dyn ReflectionService>,
    user_id: String,
}

impl ServiceConversationClient {
    pub fn new(service: Arc<dyn ReflectionService>, user_id: impl Into<String>) -> Self {
        Self {
            service,
            user_id: user_id.into(),
        }
    }
}

#[async_trait]
impl ConversationClient for ServiceConversationClient {
    async fn advance(&self, user_text: &str) -> Result<AdvanceReply, RemoteError> {
        self.service
            .advance(&AdvanceRequest::new(&self.user_id, user_text))
            .await
    }

    async fn reset(&self) -> Result<(), RemoteError> {
        self.service.reset(&ResetRequest::new(&self.user_id)).await
    }
}
