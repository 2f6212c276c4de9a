//! User settings for Confab.
//!
//! `Settings` represents `config.toml`: global instructions appended to every
//! request, output limits, auto-flow pacing, user-supplied API keys and
//! optional endpoint overrides.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::llm::ProviderKind;

/// Top-level user settings. All fields have defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Appended to every persona's system prompt, unconditionally.
    #[serde(default)]
    pub global_instructions: String,

    /// `max_tokens` sent to REST providers.
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,

    /// Pause between unattended arena turns.
    #[serde(default = "default_auto_flow_delay_ms")]
    pub auto_flow_delay_ms: u64,

    #[serde(default)]
    pub credentials: CredentialsConfig,

    #[serde(default)]
    pub providers: ProviderEndpoints,
}

fn default_max_output_tokens() -> u32 {
    4096
}

fn default_auto_flow_delay_ms() -> u64 {
    2500
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            global_instructions: String::new(),
            max_output_tokens: default_max_output_tokens(),
            auto_flow_delay_ms: default_auto_flow_delay_ms(),
            credentials: CredentialsConfig::default(),
            providers: ProviderEndpoints::default(),
        }
    }
}

/// User-supplied keys for the REST providers.
///
/// Gemini's key is process-wide and comes from the environment instead.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct CredentialsConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub openai_api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deepseek_api_key: Option<String>,
}

impl fmt::Debug for CredentialsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |v: &Option<String>| if v.is_some() { "<redacted>" } else { "<unset>" };
        f.debug_struct("CredentialsConfig")
            .field("openai_api_key", &redact(&self.openai_api_key))
            .field("deepseek_api_key", &redact(&self.deepseek_api_key))
            .finish()
    }
}

/// Optional base URL overrides, keyed by provider.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderEndpoints {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub openai: Option<EndpointConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deepseek: Option<EndpointConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gemini: Option<EndpointConfig>,
}

impl ProviderEndpoints {
    pub fn base_url(&self, kind: ProviderKind) -> Option<&str> {
        let endpoint = match kind {
            ProviderKind::OpenAi => self.openai.as_ref(),
            ProviderKind::DeepSeek => self.deepseek.as_ref(),
            ProviderKind::Gemini => self.gemini.as_ref(),
        };
        endpoint.map(|e| e.base_url.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointConfig {
    pub base_url: String,
}
