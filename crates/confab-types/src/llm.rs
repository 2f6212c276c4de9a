//! LLM request/response types for Confab.
//!
//! These types model the data shapes shared by the normalizer, the provider
//! gateway and the concrete HTTP backends: provider identity, normalized
//! turns, the provider-agnostic request, and the classified error taxonomy.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Backend family an assistant persona is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[serde(rename = "openai")]
    OpenAi,
    #[serde(rename = "deepseek")]
    DeepSeek,
    Gemini,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 3] = [ProviderKind::OpenAi, ProviderKind::DeepSeek, ProviderKind::Gemini];

    /// REST providers need a user-supplied key passed into every call.
    /// Gemini's credential is process-wide and resolved by the host.
    pub fn requires_user_credential(&self) -> bool {
        !matches!(self, ProviderKind::Gemini)
    }

    /// Gemini names the non-user side `model` and tolerates repeated roles
    /// less strictly than the chat-completion APIs.
    pub fn is_gemini(&self) -> bool {
        matches!(self, ProviderKind::Gemini)
    }

    /// Human-readable vendor name for banners.
    pub fn display_name(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "OpenAI",
            ProviderKind::DeepSeek => "DeepSeek",
            ProviderKind::Gemini => "Gemini",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderKind::OpenAi => write!(f, "openai"),
            ProviderKind::DeepSeek => write!(f, "deepseek"),
            ProviderKind::Gemini => write!(f, "gemini"),
        }
    }
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "openai" => Ok(ProviderKind::OpenAi),
            "deepseek" => Ok(ProviderKind::DeepSeek),
            "gemini" | "google" => Ok(ProviderKind::Gemini),
            other => Err(format!("invalid provider: '{other}'")),
        }
    }
}

/// Role of a normalized turn in a provider request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Assistant,
    /// Gemini's name for the assistant side.
    Model,
}

impl fmt::Display for TurnRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TurnRole::User => write!(f, "user"),
            TurnRole::Assistant => write!(f, "assistant"),
            TurnRole::Model => write!(f, "model"),
        }
    }
}

/// One role-tagged content block submitted to a provider.
///
/// Rebuilt from the message log on every request; never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedTurn {
    pub role: TurnRole,
    pub content: String,
}

impl NormalizedTurn {
    pub fn new(role: TurnRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// Provider-agnostic request handed to a concrete backend.
///
/// `temperature` is already clamped by the gateway; backends decide whether
/// a given model accepts it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub model: String,
    pub system: String,
    pub turns: Vec<NormalizedTurn>,
    pub temperature: f64,
    pub max_tokens: u32,
}

/// Errors from provider gateway operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LlmError {
    #[error("no API key configured for {}", provider.display_name())]
    CredentialMissing { provider: ProviderKind },

    #[error("authentication failed: the API key was rejected")]
    AuthenticationFailed,

    #[error("{message}")]
    RateLimited { message: String },

    #[error("{message}")]
    Provider { status: Option<u16>, message: String },

    #[error("transport error: {0}")]
    Transport(String),
}
