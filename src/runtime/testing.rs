//! Mock implementations for testing
//!
//! These mocks enable integration testing without real I/O.

use super::traits::ConversationClient;
use super::{spawn_conversation, ClientEvent, ConversationHandle};
use crate::remote::{AdvanceReply, RemoteError};
use crate::state_machine::{ConvContext, ConversationState};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{broadcast, Notify};

// ============================================================================
// Mock Conversation Client
// ============================================================================

/// Mock client that returns queued replies
pub struct MockConversationClient {
    replies: Mutex<VecDeque<Result<AdvanceReply, RemoteError>>>,
    /// Record of all submitted user texts
    pub requests: Mutex<Vec<String>>,
    resets: AtomicUsize,
    fail_resets: bool,
}

impl MockConversationClient {
    pub fn new() -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            resets: AtomicUsize::new(0),
            fail_resets: false,
        }
    }

    /// Make every reset notification fail
    pub fn failing_resets(mut self) -> Self {
        self.fail_resets = true;
        self
    }

    /// Queue a successful reply
    pub fn queue_reply(&self, reply: AdvanceReply) {
        self.replies.lock().unwrap().push_back(Ok(reply));
    }

    /// Queue an error reply
    pub fn queue_error(&self, error: RemoteError) {
        self.replies.lock().unwrap().push_back(Err(error));
    }

    /// Get recorded requests
    pub fn recorded_requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub fn reset_count(&self) -> usize {
        self.resets.load(Ordering::SeqCst)
    }

    fn next_reply(&self) -> Result<AdvanceReply, RemoteError> {
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(RemoteError::network("No mock reply queued")))
    }
}

impl Default for MockConversationClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ConversationClient for MockConversationClient {
    async fn advance(&self, user_text: &str) -> Result<AdvanceReply, RemoteError> {
        self.requests.lock().unwrap().push(user_text.to_string());
        self.next_reply()
    }

    async fn reset(&self) -> Result<(), RemoteError> {
        self.resets.fetch_add(1, Ordering::SeqCst);
        if self.fail_resets {
            Err(RemoteError::network("Reset endpoint unreachable"))
        } else {
            Ok(())
        }
    }
}

// ============================================================================
// Delayed Mock Client (for reset races)
// ============================================================================

/// Mock client whose advance calls take `delay` to answer
pub struct DelayedMockConversationClient {
    inner: MockConversationClient,
    delay: Duration,
    /// Notified when a request starts (for test synchronization)
    pub request_started: Arc<Notify>,
}

impl DelayedMockConversationClient {
    pub fn new(delay: Duration) -> Self {
        Self {
            inner: MockConversationClient::new(),
            delay,
            request_started: Arc::new(Notify::new()),
        }
    }

    pub fn queue_reply(&self, reply: AdvanceReply) {
        self.inner.queue_reply(reply);
    }

    pub fn recorded_requests(&self) -> Vec<String> {
        self.inner.recorded_requests()
    }
}

#[async_trait]
impl ConversationClient for DelayedMockConversationClient {
    async fn advance(&self, user_text: &str) -> Result<AdvanceReply, RemoteError> {
        self.inner.requests.lock().unwrap().push(user_text.to_string());
        self.request_started.notify_one();
        tokio::time::sleep(self.delay).await;
        self.inner.next_reply()
    }

    async fn reset(&self) -> Result<(), RemoteError> {
        self.inner.reset().await
    }
}

// ============================================================================
// Test Runtime
// ============================================================================

/// Helper for building test runtimes with minimal boilerplate
pub struct TestRuntime<C: ConversationClient + 'static> {
    pub handle: ConversationHandle,
    pub client: Arc<C>,
    pub events: broadcast::Receiver<ClientEvent>,
}

impl<C: ConversationClient + 'static> TestRuntime<C> {
    pub fn with_client(client: C, reveal_delay: Duration) -> Self {
        let client = Arc::new(client);
        let handle = spawn_conversation(ConvContext::new(reveal_delay), Arc::clone(&client));
        let events = handle.subscribe();
        Self {
            handle,
            client,
            events,
        }
    }

    pub async fn submit(&self, text: &str) {
        self.handle.submit(text).await.expect("Failed to submit");
    }

    pub async fn reset(&self) {
        self.handle.reset().await.expect("Failed to reset");
    }

    pub fn state(&self) -> ConversationState {
        self.handle.snapshot()
    }

    /// Wait until the published state satisfies `predicate`
    pub async fn wait_for_state(
        &self,
        timeout: Duration,
        predicate: impl FnMut(&ConversationState) -> bool,
    ) -> bool {
        let mut rx = self.handle.watch();
        let reached = matches!(
            tokio::time::timeout(timeout, rx.wait_for(predicate)).await,
            Ok(Ok(_))
        );
        reached
    }

    /// Wait for a `Revealed` client event
    pub async fn wait_for_reveal(&mut self, timeout: Duration) -> bool {
        let deadline = tokio::time::Instant::now() + timeout;
        while tokio::time::Instant::now() < deadline {
            match tokio::time::timeout(Duration::from_millis(50), self.events.recv()).await {
                Ok(Ok(ClientEvent::Revealed { .. })) => return true,
                _ => continue,
            }
        }
        false
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state_machine::transition::RETRY_PROMPT;
    use crate::state_machine::{Sender, SessionToken, Summary, Surface};

    const REVEAL_DELAY: Duration = Duration::from_millis(30);
    const WAIT: Duration = Duration::from_secs(2);

    fn runtime(client: MockConversationClient) -> TestRuntime<MockConversationClient> {
        TestRuntime::with_client(client, REVEAL_DELAY)
    }

    #[tokio::test]
    async fn test_mock_client_replays_queue() {
        let mock = MockConversationClient::new();
        mock.queue_reply(AdvanceReply::new("How did it feel?", "today_feeling"));

        let reply = mock.advance("I worked on code").await.unwrap();
        assert_eq!(reply.expecting, "today_feeling");
        assert!(mock.advance("again").await.is_err());
        assert_eq!(mock.recorded_requests(), vec!["I worked on code", "again"]);
    }

    #[tokio::test]
    async fn test_non_terminal_round_trip() {
        let client = MockConversationClient::new();
        client.queue_reply(AdvanceReply::new("How did it feel?", "today_feeling"));

        let rt = runtime(client);
        rt.submit("I worked on code").await;

        assert!(rt.wait_for_state(WAIT, |s| s.log.len() == 3).await);
        let state = rt.state();
        assert!(!state.awaiting_response);
        assert!(!state.revealed);
        let senders: Vec<_> = state.log.turns().iter().map(|t| t.sender).collect();
        assert_eq!(senders, vec![Sender::Assistant, Sender::User, Sender::Assistant]);
        assert_eq!(state.log.turns()[2].text, "How did it feel?");
        assert_eq!(rt.client.recorded_requests(), vec!["I worked on code"]);
    }

    #[tokio::test]
    async fn test_terminal_reply_reveals_after_delay() {
        let client = MockConversationClient::new();
        client.queue_reply(AdvanceReply::new("Noted.", "done").with_summary("X", "Y"));

        let mut rt = runtime(client);
        rt.submit("It felt good").await;

        assert!(rt.wait_for_state(WAIT, |s| s.log.len() == 3).await);
        assert!(rt.wait_for_reveal(WAIT).await);

        let state = rt.state();
        assert!(state.revealed);
        assert_eq!(state.surface(), Surface::Revealed);
        assert_eq!(
            state.summary,
            Some(Summary {
                daily_stroke: "X".into(),
                self_portrait: "Y".into(),
            })
        );

        // No further submission until reset
        rt.submit("one more thing").await;
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(rt.state().log.len(), 3);
        assert_eq!(rt.client.recorded_requests(), vec!["It felt good"]);
    }

    #[tokio::test]
    async fn test_failure_allows_immediate_resubmit() {
        let client = MockConversationClient::new();
        client.queue_error(RemoteError::server_error("Backend returned 500"));
        client.queue_reply(AdvanceReply::new("How did it feel?", "today_feeling"));

        let rt = runtime(client);
        rt.submit("I worked on code").await;

        assert!(rt.wait_for_state(WAIT, |s| s.transient_error.is_some()).await);
        let state = rt.state();
        assert!(!state.awaiting_response);
        assert_eq!(state.transient_error.as_deref(), Some(RETRY_PROMPT));
        assert_eq!(state.log.len(), 2);
        assert_eq!(state.log.last().unwrap().sender, Sender::User);

        rt.submit("I worked on code, mostly").await;
        assert!(rt.wait_for_state(WAIT, |s| s.log.len() == 4).await);
        assert!(rt.state().transient_error.is_none());
    }

    #[tokio::test]
    async fn test_blank_submit_issues_no_request() {
        let rt = runtime(MockConversationClient::new());
        rt.submit("   ").await;
        rt.submit("").await;
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert!(rt.client.recorded_requests().is_empty());
        assert_eq!(rt.state().log.len(), 1);
    }

    #[tokio::test]
    async fn test_submit_while_busy_issues_single_request() {
        let client = DelayedMockConversationClient::new(Duration::from_millis(200));
        client.queue_reply(AdvanceReply::new("How did it feel?", "today_feeling"));
        let started = client.request_started.clone();

        let rt = TestRuntime::with_client(client, REVEAL_DELAY);
        rt.submit("first").await;
        started.notified().await;
        rt.submit("second").await;

        assert!(rt.wait_for_state(WAIT, |s| s.log.len() == 3).await);
        assert_eq!(rt.client.recorded_requests(), vec!["first"]);
        let texts: Vec<_> = rt.state().log.turns().iter().map(|t| t.text.clone()).collect();
        assert!(!texts.contains(&"second".to_string()));
    }

    /// A reply that lands after a reset must not touch the fresh conversation.
    #[tokio::test]
    async fn test_reset_discards_in_flight_reply() {
        let client = DelayedMockConversationClient::new(Duration::from_millis(100));
        client.queue_reply(AdvanceReply::new("Noted.", "done").with_summary("X", "Y"));
        let started = client.request_started.clone();

        let rt = TestRuntime::with_client(client, REVEAL_DELAY);
        rt.submit("I worked on code").await;
        started.notified().await;
        rt.reset().await;

        assert!(
            rt.wait_for_state(WAIT, |s| s.session_token == SessionToken::new(1))
                .await
        );
        let after_reset = rt.state();

        // Let the stale reply and any reveal timer run out
        tokio::time::sleep(Duration::from_millis(250)).await;
        let state = rt.state();
        assert_eq!(state, after_reset);
        assert_eq!(state.log.len(), 1);
        assert!(!state.awaiting_response);
        assert!(!state.revealed);
    }

    #[tokio::test]
    async fn test_reset_during_pending_reveal_cancels_it() {
        let client = MockConversationClient::new();
        client.queue_reply(AdvanceReply::new("Noted.", "done").with_summary("X", "Y"));

        let rt = TestRuntime::with_client(client, Duration::from_millis(150));
        rt.submit("It felt good").await;
        assert!(rt.wait_for_state(WAIT, |s| s.pending_reveal.is_some()).await);

        rt.reset().await;
        assert!(rt.wait_for_state(WAIT, |s| s.log.len() == 1).await);
        tokio::time::sleep(Duration::from_millis(250)).await;
        assert!(!rt.state().revealed);
        assert_eq!(rt.state().surface(), Surface::Composing);
    }

    #[tokio::test]
    async fn test_reset_notification_failure_is_swallowed() {
        let client = MockConversationClient::new().failing_resets();
        client.queue_reply(AdvanceReply::new("How did it feel?", "today_feeling"));

        let rt = runtime(client);
        rt.reset().await;
        assert!(
            rt.wait_for_state(WAIT, |s| s.session_token == SessionToken::new(1))
                .await
        );

        // The conversation keeps working after the failed notification
        rt.submit("I worked on code").await;
        assert!(rt.wait_for_state(WAIT, |s| s.log.len() == 3).await);
        assert!(rt.state().transient_error.is_none());
        assert_eq!(rt.client.reset_count(), 1);
    }

    #[tokio::test]
    async fn test_turn_events_are_broadcast_in_order() {
        let client = MockConversationClient::new();
        client.queue_reply(AdvanceReply::new("How did it feel?", "today_feeling"));

        let mut rt = runtime(client);
        rt.submit("I worked on code").await;
        assert!(rt.wait_for_state(WAIT, |s| s.log.len() == 3).await);

        let mut appended = Vec::new();
        while let Ok(event) = rt.events.try_recv() {
            if let ClientEvent::TurnAppended { index, turn, .. } = event {
                appended.push((index, turn.sender));
            }
        }
        assert_eq!(appended, vec![(1, Sender::User), (2, Sender::Assistant)]);
    }

    #[tokio::test]
    async fn test_blank_reply_surfaces_retry_prompt() {
        let client = MockConversationClient::new();
        client.queue_reply(AdvanceReply::new("", "today_feeling"));

        let rt = runtime(client);
        rt.submit("hi").await;

        assert!(rt.wait_for_state(WAIT, |s| s.transient_error.is_some()).await);
        let state = rt.state();
        assert_eq!(state.log.len(), 2);
        assert_eq!(state.transient_error.as_deref(), Some(RETRY_PROMPT));
        assert!(!state.awaiting_response);
    }

    #[tokio::test]
    async fn test_runtime_stops_once_handles_dropped() {
        use crate::runtime::ConversationRuntime;
        use crate::state_machine::Event;
        use tokio::sync::{mpsc, watch};

        let context = ConvContext::new(REVEAL_DELAY);
        let initial =
            ConversationState::initial(&context, SessionToken::default(), chrono::Utc::now());
        let (event_tx, event_rx) = mpsc::channel(8);
        let (broadcast_tx, _) = broadcast::channel(8);
        let (snapshot_tx, snapshot_rx) = watch::channel(initial.clone());

        let runtime = ConversationRuntime::new(
            context,
            initial,
            MockConversationClient::new(),
            event_rx,
            event_tx.downgrade(),
            broadcast_tx,
            snapshot_tx,
        );
        let task = tokio::spawn(runtime.run());

        event_tx
            .send(Event::DraftChanged {
                text: "half a thought".to_string(),
            })
            .await
            .unwrap();
        drop(event_tx);

        assert!(tokio::time::timeout(WAIT, task).await.is_ok());
        assert_eq!(snapshot_rx.borrow().draft_input, "half a thought");
    }
}
