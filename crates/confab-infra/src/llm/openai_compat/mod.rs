//! OpenAI-compatible chat provider.
//!
//! A single [`OpenAiCompatibleProvider`] serves OpenAI and DeepSeek: both
//! speak the Chat Completions protocol with bearer auth and differ only in
//! base URL and model quirks.

pub mod config;
pub mod types;

use secrecy::ExposeSecret;
use tracing::debug;

use confab_core::llm::provider::ChatProvider;
use confab_types::llm::{ChatRequest, LlmError, ProviderKind, TurnRole};

use super::http::{check_status, transport};

use self::config::{OpenAiCompatConfig, accepts_temperature};
use self::types::{CompletionBody, CompletionResponse, WireMessage};

/// Provider for any Chat Completions API.
///
/// Does NOT derive Debug: the API key must never reach logs.
pub struct OpenAiCompatibleProvider {
    client: reqwest::Client,
    config: OpenAiCompatConfig,
}

impl OpenAiCompatibleProvider {
    pub fn new(client: reqwest::Client, config: OpenAiCompatConfig) -> Self {
        Self { client, config }
    }

    /// OpenAI at `https://api.openai.com/v1`.
    pub fn openai(client: reqwest::Client, api_key: secrecy::SecretString) -> Self {
        Self::new(client, config::openai_defaults(api_key))
    }

    /// DeepSeek at `https://api.deepseek.com`.
    pub fn deepseek(client: reqwest::Client, api_key: secrecy::SecretString) -> Self {
        Self::new(client, config::deepseek_defaults(api_key))
    }

    /// Override the base URL (proxies, tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config.base_url = base_url.into();
        self
    }

    fn url(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }

    /// Build the wire body: a leading system message, then the turns.
    fn to_body<'a>(&self, request: &'a ChatRequest) -> CompletionBody<'a> {
        let mut messages = Vec::with_capacity(request.turns.len() + 1);
        messages.push(WireMessage {
            role: "system",
            content: &request.system,
        });
        for turn in &request.turns {
            messages.push(WireMessage {
                role: match turn.role {
                    TurnRole::User => "user",
                    TurnRole::Assistant | TurnRole::Model => "assistant",
                },
                content: &turn.content,
            });
        }

        CompletionBody {
            model: &request.model,
            messages,
            max_tokens: request.max_tokens,
            temperature: accepts_temperature(&request.model).then_some(request.temperature),
        }
    }
}

impl ChatProvider for OpenAiCompatibleProvider {
    fn kind(&self) -> ProviderKind {
        self.config.kind
    }

    fn name(&self) -> &str {
        match self.config.kind {
            ProviderKind::DeepSeek => "deepseek",
            _ => "openai",
        }
    }

    async fn send(&self, request: &ChatRequest) -> Result<String, LlmError> {
        let body = self.to_body(request);
        debug!(provider = self.name(), model = %request.model, messages = body.messages.len(), "POST chat/completions");

        let response = self
            .client
            .post(self.url())
            .bearer_auth(self.config.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(transport)?;
        let response = check_status(response).await?;

        let parsed: CompletionResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Transport(format!("failed to parse response: {e}")))?;

        let choice = parsed.choices.into_iter().next().ok_or_else(|| LlmError::Provider {
            status: None,
            message: "response contained no choices".to_string(),
        })?;
        Ok(choice.message.content.unwrap_or_default())
    }
}
