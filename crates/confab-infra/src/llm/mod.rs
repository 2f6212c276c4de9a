//! LLM provider implementations.
//!
//! Concrete [`ChatProvider`] backends for the traits defined in
//! `confab-core`, plus [`HttpProviderFactory`], which builds the right
//! backend for a [`ProviderKind`] from the credential resolved by the caller.
//!
//! [`ChatProvider`]: confab_core::llm::provider::ChatProvider

pub mod gemini;
pub mod http;
pub mod openai_compat;

#[cfg(test)]
pub(crate) mod mock_server;

use secrecy::SecretString;

use confab_core::llm::box_provider::BoxChatProvider;
use confab_core::llm::factory::ProviderFactory;
use confab_types::config::ProviderEndpoints;
use confab_types::llm::{LlmError, ProviderKind};

use self::gemini::GeminiProvider;
use self::openai_compat::OpenAiCompatibleProvider;

/// Create a [`BoxChatProvider`] for `kind`.
///
/// `base_url` overrides the vendor default when set.
///
/// # Errors
///
/// Returns [`LlmError::CredentialMissing`] when no credential is given.
pub fn create_provider(
    client: &reqwest::Client,
    kind: ProviderKind,
    credential: Option<&SecretString>,
    base_url: Option<&str>,
) -> Result<BoxChatProvider, LlmError> {
    let key = credential
        .cloned()
        .ok_or(LlmError::CredentialMissing { provider: kind })?;

    match kind {
        ProviderKind::OpenAi | ProviderKind::DeepSeek => {
            let mut provider = if kind == ProviderKind::OpenAi {
                OpenAiCompatibleProvider::openai(client.clone(), key)
            } else {
                OpenAiCompatibleProvider::deepseek(client.clone(), key)
            };
            if let Some(url) = base_url {
                provider = provider.with_base_url(url);
            }
            Ok(BoxChatProvider::new(provider))
        }
        ProviderKind::Gemini => {
            let mut provider = GeminiProvider::new(client.clone(), key);
            if let Some(url) = base_url {
                provider = provider.with_base_url(url);
            }
            Ok(BoxChatProvider::new(provider))
        }
    }
}

/// [`ProviderFactory`] backed by real HTTP clients.
///
/// One `reqwest::Client` is shared by every provider it builds.
pub struct HttpProviderFactory {
    client: reqwest::Client,
    endpoints: ProviderEndpoints,
}

impl HttpProviderFactory {
    pub fn new(endpoints: ProviderEndpoints) -> Result<Self, LlmError> {
        Ok(Self {
            client: http::build_client()?,
            endpoints,
        })
    }
}

impl ProviderFactory for HttpProviderFactory {
    fn create(
        &self,
        kind: ProviderKind,
        credential: Option<&SecretString>,
    ) -> Result<BoxChatProvider, LlmError> {
        create_provider(&self.client, kind, credential, self.endpoints.base_url(kind))
    }
}
