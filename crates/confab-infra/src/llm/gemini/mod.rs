//! Gemini provider (Google Generative Language API).
//!
//! Uses the native `models/{model}:generateContent` endpoint: the system
//! prompt travels in `systemInstruction`, turns become `{role, parts}`
//! contents, and `pro` models get a larger thinking budget.

pub mod types;

use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use confab_core::llm::provider::ChatProvider;
use confab_types::llm::{ChatRequest, LlmError, ProviderKind, TurnRole};

use super::http::{check_status, transport};

use self::types::{
    Content, GenerateContentBody, GenerateContentResponse, GenerationConfig, Part, ThinkingConfig,
};

pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Thinking budget for `pro` models.
pub const PRO_THINKING_BUDGET: u32 = 32_768;

/// Thinking budget for every other model.
pub const DEFAULT_THINKING_BUDGET: u32 = 8_192;

pub fn thinking_budget(model: &str) -> u32 {
    if model.contains("pro") {
        PRO_THINKING_BUDGET
    } else {
        DEFAULT_THINKING_BUDGET
    }
}

/// Gemini provider. Does NOT derive Debug (holds the API key).
pub struct GeminiProvider {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
}

impl GeminiProvider {
    pub fn new(client: reqwest::Client, api_key: SecretString) -> Self {
        Self {
            client,
            api_key,
            base_url: GEMINI_BASE_URL.to_string(),
        }
    }

    /// Override the base URL (proxies, tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn url(&self, model: &str) -> String {
        format!(
            "{}/models/{model}:generateContent",
            self.base_url.trim_end_matches('/')
        )
    }

    fn to_body<'a>(&self, request: &'a ChatRequest) -> GenerateContentBody<'a> {
        let system_instruction = (!request.system.is_empty()).then(|| Content {
            role: None,
            parts: vec![Part {
                text: &request.system,
            }],
        });

        let contents = request
            .turns
            .iter()
            .map(|turn| Content {
                role: Some(match turn.role {
                    TurnRole::User => "user",
                    TurnRole::Assistant | TurnRole::Model => "model",
                }),
                parts: vec![Part {
                    text: &turn.content,
                }],
            })
            .collect();

        GenerateContentBody {
            system_instruction,
            contents,
            generation_config: GenerationConfig {
                temperature: request.temperature,
                thinking_config: ThinkingConfig {
                    thinking_budget: thinking_budget(&request.model),
                },
            },
        }
    }
}

impl ChatProvider for GeminiProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Gemini
    }

    fn name(&self) -> &str {
        "gemini"
    }

    async fn send(&self, request: &ChatRequest) -> Result<String, LlmError> {
        let body = self.to_body(request);
        debug!(model = %request.model, contents = body.contents.len(), "POST generateContent");

        let response = self
            .client
            .post(self.url(&request.model))
            .header("x-goog-api-key", self.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(transport)?;
        let response = check_status(response).await?;

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Transport(format!("failed to parse response: {e}")))?;

        let Some(candidate) = parsed.candidates.into_iter().next() else {
            let reason = parsed
                .prompt_feedback
                .and_then(|f| f.block_reason)
                .unwrap_or_else(|| "no candidates returned".to_string());
            return Err(LlmError::Provider {
                status: None,
                message: format!("Gemini returned no reply: {reason}"),
            });
        };

        let text = candidate
            .content
            .map(|c| {
                c.parts
                    .into_iter()
                    .filter(|p| !p.thought)
                    .filter_map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();
        Ok(text)
    }
}
