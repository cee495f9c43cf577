//! HTTP implementation of the reflection backend

use super::types::{
    AdvanceReply, AdvanceRequest, HistoryRecords, ProfileRecord, ResetRequest,
};
use super::{RemoteError, ReflectionService};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Talks JSON to the backend's `/conversation`, `/history` and `/profile`
pub struct HttpReflectionService {
    client: Client,
    base_url: String,
}

impl HttpReflectionService {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, RemoteError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RemoteError::network(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, RemoteError> {
        let request_id = uuid::Uuid::new_v4().to_string();
        let response = request
            .header(REQUEST_ID_HEADER, &request_id)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        tracing::debug!(request_id = %request_id, status = %status, "Backend rejected request");
        Err(RemoteError::from_status(status, &body))
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, RemoteError> {
        let response = self.send(request).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| RemoteError::invalid_response(format!("Malformed backend reply: {e}")))
    }
}

#[async_trait]
impl ReflectionService for HttpReflectionService {
    async fn advance(&self, request: &AdvanceRequest) -> Result<AdvanceReply, RemoteError> {
        let reply: AdvanceReply = self
            .send_json(self.client.post(self.url("conversation")).json(request))
            .await?;

        if reply.message.trim().is_empty() {
            return Err(RemoteError::invalid_response("Backend reply has no message"));
        }
        Ok(reply)
    }

    async fn reset(&self, request: &ResetRequest) -> Result<(), RemoteError> {
        self.send(self.client.post(self.url("conversation")).json(request))
            .await
            .map(|_| ())
    }

    async fn history(&self, user_id: &str) -> Result<HistoryRecords, RemoteError> {
        self.send_json(
            self.client
                .get(self.url("history"))
                .query(&[("user_id", user_id)]),
        )
        .await
    }

    async fn profile(&self, user_id: &str) -> Result<ProfileRecord, RemoteError> {
        self.send_json(
            self.client
                .get(self.url("profile"))
                .query(&[("user_id", user_id)]),
        )
        .await
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }
}
