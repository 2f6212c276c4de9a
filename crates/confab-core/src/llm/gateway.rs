//! Provider gateway: one place for the per-call policy shared by every backend.
//!
//! The gateway checks credentials, normalizes history for the target
//! provider, clamps temperature, retries a rate-limited call once after a
//! fixed pause, and cleans author scaffolding out of the reply.

use std::sync::Arc;
use std::time::Duration;

use secrecy::SecretString;
use tracing::{Instrument, debug, info_span, warn};

use confab_types::llm::{ChatRequest, LlmError, ProviderKind};
use confab_types::message::Message;

use crate::history::{clean, normalize};

use super::factory::ProviderFactory;

/// Retries allowed after an HTTP 429. One retry slot, no backoff.
pub const MAX_RATE_LIMIT_RETRIES: u32 = 1;

/// Fixed pause before retrying a rate-limited call.
pub const RATE_LIMIT_RETRY_DELAY: Duration = Duration::from_secs(2);

/// Temperature range accepted by every backend.
pub const MIN_TEMPERATURE: f64 = 0.0;
pub const MAX_TEMPERATURE: f64 = 1.2;

/// Default `max_tokens` for REST providers.
pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 4096;

/// Inputs to a single gateway call.
#[derive(Clone, Copy)]
pub struct GatewayRequest<'a> {
    pub provider: ProviderKind,
    pub model: &'a str,
    pub system_prompt: &'a str,
    pub history: &'a [Message],
    pub credential: Option<&'a SecretString>,
    pub temperature: f64,
}

/// Sends conversation history to a backend and returns cleaned reply text.
#[derive(Clone)]
pub struct ProviderGateway {
    factory: Arc<dyn ProviderFactory>,
    max_tokens: u32,
    retry_delay: Duration,
}

impl ProviderGateway {
    pub fn new(factory: Arc<dyn ProviderFactory>) -> Self {
        Self {
            factory,
            max_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
            retry_delay: RATE_LIMIT_RETRY_DELAY,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Override the 429 pause. Intended for tests and local proxies.
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Send `history` to `request.provider` and return the cleaned reply.
    ///
    /// A REST provider without a credential fails before any network call.
    /// HTTP 401 is never retried. HTTP 429 is retried once; a second 429 is
    /// reported as an ordinary provider error.
    pub async fn send(&self, request: GatewayRequest<'_>) -> Result<String, LlmError> {
        if request.provider.requires_user_credential() && request.credential.is_none() {
            return Err(LlmError::CredentialMissing {
                provider: request.provider,
            });
        }

        let provider = self.factory.create(request.provider, request.credential)?;
        let chat_request = ChatRequest {
            model: request.model.to_string(),
            system: request.system_prompt.to_string(),
            turns: normalize(request.history, request.provider),
            temperature: clamp_temperature(request.temperature),
            max_tokens: self.max_tokens,
        };

        let span = info_span!(
            "gen_ai.chat",
            gen_ai.system = provider.name(),
            gen_ai.request.model = %chat_request.model,
            gen_ai.request.max_tokens = chat_request.max_tokens,
            gen_ai.request.temperature = chat_request.temperature,
        );

        async {
            let mut attempt: u32 = 0;
            loop {
                debug!(attempt, turns = chat_request.turns.len(), "sending chat request");
                match provider.send(&chat_request).await {
                    Ok(raw) => return Ok(clean(&raw)),
                    Err(LlmError::RateLimited { .. }) if attempt < MAX_RATE_LIMIT_RETRIES => {
                        attempt += 1;
                        warn!(
                            attempt,
                            delay_ms = self.retry_delay.as_millis() as u64,
                            "rate limited, retrying"
                        );
                        tokio::time::sleep(self.retry_delay).await;
                    }
                    Err(LlmError::RateLimited { message }) => {
                        warn!(attempt, "rate limited again, giving up");
                        return Err(LlmError::Provider {
                            status: Some(429),
                            message,
                        });
                    }
                    Err(e) => return Err(e),
                }
            }
        }
        .instrument(span)
        .await
    }
}

/// Clamp to the supported range. NaN falls back to the lower bound.
pub fn clamp_temperature(temperature: f64) -> f64 {
    if temperature.is_nan() {
        return MIN_TEMPERATURE;
    }
    temperature.clamp(MIN_TEMPERATURE, MAX_TEMPERATURE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::box_provider::BoxChatProvider;
    use crate::llm::provider::ChatProvider;
    use confab_types::llm::TurnRole;
    use std::collections::VecDeque;
    use std::future::Future;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    // --- Mock provider and factory ---

    #[derive(Default)]
    struct Script {
        replies: Mutex<VecDeque<Result<String, LlmError>>>,
        calls: AtomicUsize,
        creates: AtomicUsize,
        last_request: Mutex<Option<ChatRequest>>,
    }

    struct ScriptedProvider {
        kind: ProviderKind,
        script: Arc<Script>,
    }

    impl ChatProvider for ScriptedProvider {
        fn kind(&self) -> ProviderKind {
            self.kind
        }

        fn name(&self) -> &str {
            "scripted"
        }

        fn send(
            &self,
            request: &ChatRequest,
        ) -> impl Future<Output = Result<String, LlmError>> + Send {
            self.script.calls.fetch_add(1, Ordering::SeqCst);
            *self.script.last_request.lock().unwrap() = Some(request.clone());
            let reply = self
                .script
                .replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok("default".to_string()));
            async move { reply }
        }
    }

    struct ScriptedFactory {
        script: Arc<Script>,
    }

    impl ProviderFactory for ScriptedFactory {
        fn create(
            &self,
            kind: ProviderKind,
            _credential: Option<&SecretString>,
        ) -> Result<BoxChatProvider, LlmError> {
            self.script.creates.fetch_add(1, Ordering::SeqCst);
            Ok(BoxChatProvider::new(ScriptedProvider {
                kind,
                script: self.script.clone(),
            }))
        }
    }

    fn gateway(replies: Vec<Result<String, LlmError>>) -> (ProviderGateway, Arc<Script>) {
        let script = Arc::new(Script {
            replies: Mutex::new(replies.into()),
            ..Default::default()
        });
        let factory = Arc::new(ScriptedFactory {
            script: script.clone(),
        });
        (ProviderGateway::new(factory), script)
    }

    fn rate_limited() -> Result<String, LlmError> {
        Err(LlmError::RateLimited {
            message: "Too many requests".to_string(),
        })
    }

    fn request<'a>(
        provider: ProviderKind,
        history: &'a [Message],
        credential: Option<&'a SecretString>,
    ) -> GatewayRequest<'a> {
        GatewayRequest {
            provider,
            model: "test-model",
            system_prompt: "Be brief.",
            history,
            credential,
            temperature: 0.7,
        }
    }

    #[tokio::test]
    async fn test_missing_rest_credential_fails_without_network() {
        let (gateway, script) = gateway(vec![]);
        let history = vec![Message::user("hi")];
        let err = gateway
            .send(request(ProviderKind::OpenAi, &history, None))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            LlmError::CredentialMissing {
                provider: ProviderKind::OpenAi
            }
        );
        assert_eq!(script.creates.load(Ordering::SeqCst), 0);
        assert_eq!(script.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_gemini_does_not_require_user_credential() {
        let (gateway, script) = gateway(vec![Ok("hello".to_string())]);
        let history = vec![Message::user("hi")];
        let reply = gateway
            .send(request(ProviderKind::Gemini, &history, None))
            .await
            .unwrap();
        assert_eq!(reply, "hello");
        assert_eq!(script.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limit_retries_once_after_delay() {
        let (gateway, script) = gateway(vec![rate_limited(), Ok("recovered".to_string())]);
        let key = SecretString::from("sk-test");
        let history = vec![Message::user("hi")];

        let started = tokio::time::Instant::now();
        let reply = gateway
            .send(request(ProviderKind::DeepSeek, &history, Some(&key)))
            .await
            .unwrap();

        assert_eq!(reply, "recovered");
        assert_eq!(script.calls.load(Ordering::SeqCst), 2);
        assert!(started.elapsed() >= RATE_LIMIT_RETRY_DELAY);
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_rate_limit_surfaces_as_provider_error() {
        let (gateway, script) = gateway(vec![rate_limited(), rate_limited(), Ok("late".to_string())]);
        let key = SecretString::from("sk-test");
        let history = vec![Message::user("hi")];

        let err = gateway
            .send(request(ProviderKind::OpenAi, &history, Some(&key)))
            .await
            .unwrap_err();

        assert_eq!(
            err,
            LlmError::Provider {
                status: Some(429),
                message: "Too many requests".to_string()
            }
        );
        assert_eq!(script.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_authentication_failure_is_not_retried() {
        let (gateway, script) = gateway(vec![Err(LlmError::AuthenticationFailed)]);
        let key = SecretString::from("sk-bad");
        let history = vec![Message::user("hi")];

        let err = gateway
            .send(request(ProviderKind::OpenAi, &history, Some(&key)))
            .await
            .unwrap_err();

        assert_eq!(err, LlmError::AuthenticationFailed);
        assert_eq!(script.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_reply_is_cleaned() {
        let (gateway, _) = gateway(vec![Ok("--- SOURCE: BOT ---\nHello!\n--- END BOT ---".to_string())]);
        let history = vec![Message::user("hi")];
        let reply = gateway
            .send(request(ProviderKind::Gemini, &history, None))
            .await
            .unwrap();
        assert_eq!(reply, "Hello!");
    }

    #[tokio::test]
    async fn test_request_is_normalized_and_clamped() {
        let (gateway, script) = gateway(vec![]);
        let gateway = gateway.with_max_tokens(512);
        let key = SecretString::from("sk-test");
        let history = vec![
            Message::user("question"),
            Message::system_error("banner"),
            Message::assistant("answer", uuid::Uuid::now_v7(), "Bot"),
        ];
        let mut req = request(ProviderKind::OpenAi, &history, Some(&key));
        req.temperature = 1.9;

        gateway.send(req).await.unwrap();

        let sent = script.last_request.lock().unwrap().clone().unwrap();
        assert_eq!(sent.model, "test-model");
        assert_eq!(sent.system, "Be brief.");
        assert_eq!(sent.max_tokens, 512);
        assert_eq!(sent.temperature, MAX_TEMPERATURE);
        assert_eq!(sent.turns.len(), 1);
        assert_eq!(sent.turns[0].role, TurnRole::User);
        assert!(sent.turns[0].content.contains("[FOLLOW-UP RESPONSE]"));
        assert!(!sent.turns[0].content.contains("banner"));
    }

    #[test]
    fn test_clamp_temperature() {
        assert_eq!(clamp_temperature(-0.3), 0.0);
        assert_eq!(clamp_temperature(0.7), 0.7);
        assert_eq!(clamp_temperature(2.0), 1.2);
        assert_eq!(clamp_temperature(f64::NAN), 0.0);
    }
}
