//! Server-Sent Events support

use super::types::{ConversationSnapshot, TurnView};
use crate::runtime::ClientEvent;
use axum::response::sse::{Event, KeepAlive, Sse};
use chrono::Local;
use futures::stream::Stream;
use serde_json::json;
use std::convert::Infallible;
use std::time::Duration;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;

/// Snapshot first, then every conversation update as it happens
pub fn sse_stream(
    init: ConversationSnapshot,
    broadcast_rx: tokio::sync::broadcast::Receiver<ClientEvent>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let init = futures::stream::once(async move {
        let data = json!({ "type": "init", "conversation": init });
        Ok(Event::default().event("init").data(data.to_string()))
    });

    // Lagged receivers skip ahead; the next state event resynchronizes them
    let updates = BroadcastStream::new(broadcast_rx)
        .filter_map(|result| result.ok().map(|event| Ok(client_event_to_sse(event))));

    Sse::new(init.chain(updates)).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("ping"),
    )
}

fn client_event_to_sse(event: ClientEvent) -> Event {
    let now = Local::now();
    let (event_type, data) = match event {
        ClientEvent::State { state } => (
            "state",
            json!({
                "type": "state",
                "conversation": ConversationSnapshot::from_state(&state, &now)
            }),
        ),
        ClientEvent::TurnAppended {
            session,
            index,
            turn,
        } => (
            "turn",
            json!({
                "type": "turn",
                "session": session,
                "turn": TurnView::new(index, &turn, &now)
            }),
        ),
        ClientEvent::Revealed { summary } => (
            "revealed",
            json!({
                "type": "revealed",
                "summary": summary
            }),
        ),
        ClientEvent::Error { message } => (
            "error",
            json!({
                "type": "error",
                "message": message
            }),
        ),
    };

    Event::default().event(event_type).data(data.to_string())
}
