//! Configuration and per-provider defaults for OpenAI-compatible backends.

use secrecy::SecretString;

use confab_types::llm::ProviderKind;

pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEEPSEEK_BASE_URL: &str = "https://api.deepseek.com";

/// Configuration for an [`super::OpenAiCompatibleProvider`].
pub struct OpenAiCompatConfig {
    pub kind: ProviderKind,
    /// Base URL without the `/chat/completions` suffix.
    pub base_url: String,
    pub api_key: SecretString,
}

/// OpenAI defaults. Base URL: `https://api.openai.com/v1`.
pub fn openai_defaults(api_key: SecretString) -> OpenAiCompatConfig {
    OpenAiCompatConfig {
        kind: ProviderKind::OpenAi,
        base_url: OPENAI_BASE_URL.into(),
        api_key,
    }
}

/// DeepSeek defaults. Base URL: `https://api.deepseek.com`.
pub fn deepseek_defaults(api_key: SecretString) -> OpenAiCompatConfig {
    OpenAiCompatConfig {
        kind: ProviderKind::DeepSeek,
        base_url: DEEPSEEK_BASE_URL.into(),
        api_key,
    }
}

/// Reasoner models reject the `temperature` parameter.
pub fn accepts_temperature(model: &str) -> bool {
    !model.contains("reasoner")
}
