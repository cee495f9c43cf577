//! Client configuration from the environment

use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_BACKEND_URL: &str = "https://selfportrait-backend.onrender.com";
pub const DEFAULT_USER_ID: &str = "demo";
pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{var} must be {expected}, got {value:?}")]
    Invalid {
        var: &'static str,
        expected: &'static str,
        value: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Backend base URL, without trailing slash
    pub backend_url: String,
    pub user_id: String,
    /// Port of the local bridge
    pub port: u16,
    /// Upper bound on every backend call
    pub request_timeout: Duration,
    pub reveal_delay: Duration,
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build from an arbitrary variable lookup; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

        let backend_url = get("REFLECTION_BACKEND_URL").map_or_else(
            || DEFAULT_BACKEND_URL.to_string(),
            |url| url.trim().trim_end_matches('/').to_string(),
        );
        let user_id = get("REFLECTION_USER_ID").unwrap_or_else(|| DEFAULT_USER_ID.to_string());

        let port = match get("REFLECTION_PORT") {
            Some(raw) => parse_number("REFLECTION_PORT", "a port number", &raw)?,
            None => DEFAULT_PORT,
        };
        let request_timeout = match get("REFLECTION_REQUEST_TIMEOUT_SECS") {
            Some(raw) => {
                let secs: u64 = parse_number(
                    "REFLECTION_REQUEST_TIMEOUT_SECS",
                    "a positive number of seconds",
                    &raw,
                )?;
                if secs == 0 {
                    return Err(ConfigError::Invalid {
                        var: "REFLECTION_REQUEST_TIMEOUT_SECS",
                        expected: "a positive number of seconds",
                        value: raw,
                    });
                }
                Duration::from_secs(secs)
            }
            None => DEFAULT_REQUEST_TIMEOUT,
        };
        let reveal_delay = match get("REFLECTION_REVEAL_DELAY_MS") {
            Some(raw) => Duration::from_millis(parse_number(
                "REFLECTION_REVEAL_DELAY_MS",
                "a number of milliseconds",
                &raw,
            )?),
            None => crate::state_machine::reveal::DEFAULT_REVEAL_DELAY,
        };

        Ok(Self {
            backend_url,
            user_id,
            port,
            request_timeout,
            reveal_delay,
        })
    }
}

fn parse_number<T: std::str::FromStr>(
    var: &'static str,
    expected: &'static str,
    raw: &str,
) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::Invalid {
        var,
        expected,
        value: raw.to_string(),
    })
}
