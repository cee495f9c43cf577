//! Reflection client - guided daily-reflection conversation
//!
//! Drives a short dialog with the reflection backend, reveals the daily
//! stroke and self-portrait when the dialog concludes, and serves the
//! conversation plus read-only history over a local HTTP bridge.

mod api;
mod config;
mod display;
mod records;
mod remote;
mod runtime;
mod state_machine;

use api::{create_router, AppState};
use config::ClientConfig;
use remote::{HttpReflectionService, LoggingService, ReflectionService};
use runtime::{spawn_conversation, ServiceConversationClient};
use state_machine::ConvContext;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "reflection_client=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    // Configuration
    let config = ClientConfig::from_env()?;
    tracing::info!(
        backend = %config.backend_url,
        user = %config.user_id,
        timeout_secs = config.request_timeout.as_secs(),
        "Configuration loaded"
    );

    // Backend
    let http = HttpReflectionService::new(&config.backend_url, config.request_timeout)?;
    let service: Arc<dyn ReflectionService> = Arc::new(LoggingService::new(Arc::new(http)));

    // Conversation runtime
    let client = ServiceConversationClient::new(Arc::clone(&service), config.user_id.clone());
    let conversation = spawn_conversation(ConvContext::new(config.reveal_delay), client);

    let state = AppState::new(conversation, service, config.user_id);

    // Create router
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = create_router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = SocketAddr::from(([127, 0, 0, 1], config.port));
    tracing::info!("Reflection client listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
