//! Message log entries for Confab conversations.
//!
//! A conversation's log is an ordered, append-only sequence of [`Message`]s.
//! Append order is authoritative; `timestamp` is informational only.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;
use std::str::FromStr;

/// Who produced a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    /// Any assistant persona. Accepts the legacy `"ai"` spelling on input.
    #[serde(alias = "ai")]
    Assistant,
    /// Error and info banners. Never enters model context.
    System,
}

impl fmt::Display for Sender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sender::User => write!(f, "user"),
            Sender::Assistant => write!(f, "assistant"),
            Sender::System => write!(f, "system"),
        }
    }
}

impl FromStr for Sender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(Sender::User),
            "assistant" | "ai" => Ok(Sender::Assistant),
            "system" => Ok(Sender::System),
            other => Err(format!("invalid sender: '{other}'")),
        }
    }
}

/// A single entry in a conversation log.
///
/// Immutable once appended; the only permitted mutation is deletion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: Uuid,
    pub text: String,
    pub sender: Sender,
    /// Conversation id of the persona that authored an assistant message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_id: Option<Uuid>,
    /// Display name of the author, used for multi-party attribution.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_name: Option<String>,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_error: bool,
}

impl Message {
    fn new(sender: Sender, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            text: text.into(),
            sender,
            author_id: None,
            author_name: None,
            timestamp: Utc::now(),
            is_error: false,
        }
    }

    /// A message typed by the human.
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Sender::User, text)
    }

    /// A reply attributed to an assistant persona.
    pub fn assistant(text: impl Into<String>, author_id: Uuid, author_name: impl Into<String>) -> Self {
        let mut message = Self::new(Sender::Assistant, text);
        message.author_id = Some(author_id);
        message.author_name = Some(author_name.into());
        message
    }

    /// A system banner flagged as an error.
    pub fn system_error(text: impl Into<String>) -> Self {
        let mut message = Self::new(Sender::System, text);
        message.is_error = true;
        message
    }

    /// A neutral system banner.
    pub fn system_info(text: impl Into<String>) -> Self {
        Self::new(Sender::System, text)
    }
}
