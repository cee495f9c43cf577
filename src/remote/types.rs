//! Wire types for the reflection backend

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Advance the dialog by one user turn
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdvanceRequest {
    pub user_id: String,
    pub user_text: String,
}

impl AdvanceRequest {
    pub fn new(user_id: impl Into<String>, user_text: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            user_text: user_text.into(),
        }
    }
}

/// Best-effort server-side session reset
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResetRequest {
    pub user_id: String,
    pub reset: bool,
}

impl ResetRequest {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            reset: true,
        }
    }
}

/// Assistant reply to an advance request.
///
/// `expecting == "done"` is the only terminal signal; terminal replies are
/// expected to carry both summary fields.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AdvanceReply {
    #[serde(default, deserialize_with = "lenient_string")]
    pub message: String,
    /// Missing or null reads as empty, which is non-terminal
    #[serde(default, deserialize_with = "lenient_string")]
    pub expecting: String,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub daily_stroke: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub selfportrait: Option<String>,
}

#[cfg(test)]
impl AdvanceReply {
    pub fn new(message: impl Into<String>, expecting: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            expecting: expecting.into(),
            daily_stroke: None,
            selfportrait: None,
        }
    }

    #[must_use]
    pub fn with_summary(
        mut self,
        daily_stroke: impl Into<String>,
        selfportrait: impl Into<String>,
    ) -> Self {
        self.daily_stroke = Some(daily_stroke.into());
        self.selfportrait = Some(selfportrait.into());
        self
    }
}

// ============================================================================
// Read-only records
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyStroke {
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub date: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklySummary {
    /// Rendered as given; the backend normally sends a number
    #[serde(default, deserialize_with = "lenient_label")]
    pub week_number: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub summary: String,
    #[serde(default, deserialize_with = "lenient_list")]
    pub evidence: Vec<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub generated_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyPortrait {
    #[serde(default, deserialize_with = "lenient_label")]
    pub month_number: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub portrait: String,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub generated_at: Option<String>,
}

/// Ordered daily, weekly and monthly records, oldest first
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct HistoryRecords {
    #[serde(default, deserialize_with = "lenient_list")]
    pub daily_strokes: Vec<DailyStroke>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub weekly_summaries: Vec<WeeklySummary>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub monthly_portraits: Vec<MonthlyPortrait>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub past_memory: Vec<Value>,
}

/// Aggregate narrative for the profile surface
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProfileRecord {
    #[serde(default, deserialize_with = "lenient_string")]
    pub selfportrait: String,
}

/// A list field that is missing, null or not an array reads as empty.
/// Entries that still fail to decode (non-objects in a record list,
/// non-strings in `evidence`) are skipped.
fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect(),
        _ => Vec::new(),
    })
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_opt_string(deserializer)?.unwrap_or_default())
}

fn lenient_opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        _ => None,
    })
}

/// Numbers and strings both read as display text
fn lenient_label<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => s,
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    })
}
