//! Reflection backend abstraction
//!
//! The backend is the sole holder of dialog history; the client only sends
//! the next user turn and renders what comes back.

mod error;
mod http;
mod types;

pub use error::{RemoteError, RemoteErrorKind};
pub use http::HttpReflectionService;
pub use types::*;

use async_trait::async_trait;
use std::sync::Arc;

/// Common interface for the reflection backend
#[async_trait]
pub trait ReflectionService: Send + Sync {
    /// Advance the dialog one turn
    async fn advance(&self, request: &AdvanceRequest) -> Result<AdvanceReply, RemoteError>;

    /// Reset the server-side session; the response body is ignored
    async fn reset(&self, request: &ResetRequest) -> Result<(), RemoteError>;

    /// Ordered daily, weekly and monthly records
    async fn history(&self, user_id: &str) -> Result<HistoryRecords, RemoteError>;

    /// Aggregate narrative
    async fn profile(&self, user_id: &str) -> Result<ProfileRecord, RemoteError>;

    fn base_url(&self) -> &str;
}

/// Logging wrapper for reflection services
pub struct LoggingService {
    inner: Arc<dyn ReflectionService>,
}

impl LoggingService {
    pub fn new(inner: Arc<dyn ReflectionService>) -> Self {
        Self { inner }
    }

    fn log_outcome<T>(
        &self,
        call: &'static str,
        started: std::time::Instant,
        result: &Result<T, RemoteError>,
    ) {
        let duration = started.elapsed();
        match result {
            Ok(_) => {
                tracing::info!(
                    call,
                    backend = %self.inner.base_url(),
                    duration_ms = %duration.as_millis(),
                    "Backend request completed"
                );
            }
            Err(e) => {
                tracing::error!(
                    call,
                    backend = %self.inner.base_url(),
                    duration_ms = %duration.as_millis(),
                    error = %e.message,
                    kind = e.kind.as_str(),
                    "Backend request failed"
                );
            }
        }
    }
}

#[async_trait]
impl ReflectionService for LoggingService {
    async fn advance(&self, request: &AdvanceRequest) -> Result<AdvanceReply, RemoteError> {
        let start = std::time::Instant::now();
        let result = self.inner.advance(request).await;
        if let Ok(reply) = &result {
            tracing::debug!(expecting = %reply.expecting, "Dialog advanced");
        }
        self.log_outcome("advance", start, &result);
        result
    }

    async fn reset(&self, request: &ResetRequest) -> Result<(), RemoteError> {
        let start = std::time::Instant::now();
        let result = self.inner.reset(request).await;
        self.log_outcome("reset", start, &result);
        result
    }

    async fn history(&self, user_id: &str) -> Result<HistoryRecords, RemoteError> {
        let start = std::time::Instant::now();
        let result = self.inner.history(user_id).await;
        self.log_outcome("history", start, &result);
        result
    }

    async fn profile(&self, user_id: &str) -> Result<ProfileRecord, RemoteError> {
        let start = std::time::Instant::now();
        let result = self.inner.profile(user_id).await;
        self.log_outcome("profile", start, &result);
        result
    }

    fn base_url(&self) -> &str {
        self.inner.base_url()
    }
}
