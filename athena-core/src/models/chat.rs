use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use super::de::{opt_string_or_number, string_or_number};

pub const CHAT_ERROR_TEXT: &str = "Sorry, I encountered an error. Please try again.";

/// An agent as listed by the chat service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatAgent {
    #[serde(rename = "agentId", deserialize_with = "string_or_number")]
    pub agent_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_type: Option<String>,
}

impl ChatAgent {
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or("AI Assistant")
    }

    pub fn model_label(&self) -> &str {
        self.model_type
            .as_deref()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or("GPT-4")
    }
}

/// One transcript entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub text: String,
    pub is_user: bool,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub is_error: bool,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_user: true,
            timestamp: Utc::now(),
            is_error: false,
        }
    }

    pub fn agent(text: impl Into<String>, timestamp: Option<DateTime<Utc>>) -> Self {
        Self {
            text: text.into(),
            is_user: false,
            timestamp: timestamp.unwrap_or_else(Utc::now),
            is_error: false,
        }
    }

    /// The synthetic entry appended when a turn fails.
    pub fn error() -> Self {
        Self {
            text: CHAT_ERROR_TEXT.to_string(),
            is_user: false,
            timestamp: Utc::now(),
            is_error: true,
        }
    }
}

/// A message as stored by the history endpoint. Older records use `content`
/// and `role`, newer ones `text` and `isUser`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct HistoryEntry {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub is_user: Option<bool>,
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub timestamp: Option<String>,
}

impl From<HistoryEntry> for ChatMessage {
    fn from(entry: HistoryEntry) -> Self {
        let is_user = entry.role.as_deref() == Some("user") || entry.is_user.unwrap_or(false);
        let timestamp = entry
            .timestamp
            .as_deref()
            .and_then(parse_timestamp)
            .unwrap_or_else(Utc::now);
        ChatMessage {
            text: entry.text.or(entry.content).unwrap_or_default(),
            is_user,
            timestamp,
            is_error: false,
        }
    }
}

/// RFC 3339, or a zone-less `YYYY-MM-DD HH:MM:SS` (with `T` or a space)
/// read as UTC.
pub(crate) fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(t) = DateTime::parse_from_rfc3339(raw) {
        return Some(t.with_timezone(&Utc));
    }
    ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}
