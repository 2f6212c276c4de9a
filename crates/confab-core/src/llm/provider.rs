//! ChatProvider trait definition.
//!
//! This is the core abstraction every chat backend implements. Uses RPITIT
//! for `send`; dynamic dispatch goes through [`BoxChatProvider`].
//!
//! [`BoxChatProvider`]: super::box_provider::BoxChatProvider

use confab_types::llm::{ChatRequest, LlmError, ProviderKind};

/// Trait for chat backends (OpenAI-compatible REST, Gemini).
///
/// A provider is built per call with the credential it needs, so `send`
/// only ever sees the request. Retry policy and output cleanup live in the
/// gateway, not here: implementations report each HTTP outcome once.
///
/// Implementations live in confab-infra.
pub trait ChatProvider: Send + Sync {
    /// Which backend family this provider talks to.
    fn kind(&self) -> ProviderKind;

    /// Human-readable provider name for logs (e.g., "openai").
    fn name(&self) -> &str;

    /// Send one request and return the raw reply text.
    fn send(
        &self,
        request: &ChatRequest,
    ) -> impl std::future::Future<Output = Result<String, LlmError>> + Send;
}
