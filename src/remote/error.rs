//! Remote call error types

use reqwest::StatusCode;
use thiserror::Error;

/// Remote error with classification
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct RemoteError {
    pub kind: RemoteErrorKind,
    pub message: String,
}

impl RemoteError {
    pub fn new(kind: RemoteErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(RemoteErrorKind::Network, message)
    }

    #[cfg(test)]
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(RemoteErrorKind::Timeout, message)
    }

    #[cfg(test)]
    pub fn server_error(message: impl Into<String>) -> Self {
        Self::new(RemoteErrorKind::ServerError, message)
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::new(RemoteErrorKind::InvalidResponse, message)
    }

    /// Classify a non-success HTTP status
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let kind = if status.is_server_error() {
            RemoteErrorKind::ServerError
        } else if status == StatusCode::REQUEST_TIMEOUT {
            RemoteErrorKind::Timeout
        } else if status.is_client_error() {
            RemoteErrorKind::InvalidRequest
        } else {
            RemoteErrorKind::Unknown
        };
        let detail = body.trim();
        let message = if detail.is_empty() {
            format!("Backend returned {status}")
        } else {
            format!("Backend returned {status}: {detail}")
        };
        Self::new(kind, message)
    }
}

impl From<reqwest::Error> for RemoteError {
    fn from(err: reqwest::Error) -> Self {
        let kind = if err.is_timeout() {
            RemoteErrorKind::Timeout
        } else if err.is_decode() {
            RemoteErrorKind::InvalidResponse
        } else if let Some(status) = err.status() {
            return Self::from_status(status, "");
        } else {
            RemoteErrorKind::Network
        };
        Self::new(kind, err.to_string())
    }
}

/// Error classification, used for logging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteErrorKind {
    /// Connection refused, DNS, TLS
    Network,
    /// No reply within the configured bound
    Timeout,
    /// 5xx
    ServerError,
    /// 4xx other than 408
    InvalidRequest,
    /// Body did not match the contract
    InvalidResponse,
    Unknown,
}

impl RemoteErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Network => "network",
            Self::Timeout => "timeout",
            Self::ServerError => "server_error",
            Self::InvalidRequest => "invalid_request",
            Self::InvalidResponse => "invalid_response",
            Self::Unknown => "unknown",
        }
    }
}
