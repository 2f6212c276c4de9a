//! Credential bundle threaded explicitly into orchestration calls.
//!
//! The core never reads ambient credential state. Hosts build a
//! [`CredentialSet`] (from settings and the environment) and pass it in.

use std::fmt;

use secrecy::SecretString;

use crate::llm::ProviderKind;

/// API keys for each provider kind, any of which may be absent.
#[derive(Clone, Default)]
pub struct CredentialSet {
    openai: Option<SecretString>,
    deepseek: Option<SecretString>,
    gemini: Option<SecretString>,
}

impl CredentialSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the key for `kind`. Blank keys are treated as absent.
    pub fn with(mut self, kind: ProviderKind, key: impl Into<String>) -> Self {
        self.set(kind, key);
        self
    }

    pub fn set(&mut self, kind: ProviderKind, key: impl Into<String>) {
        let key = key.into();
        let value = if key.trim().is_empty() {
            None
        } else {
            Some(SecretString::from(key.trim().to_string()))
        };
        *self.slot_mut(kind) = value;
    }

    pub fn get(&self, kind: ProviderKind) -> Option<&SecretString> {
        match kind {
            ProviderKind::OpenAi => self.openai.as_ref(),
            ProviderKind::DeepSeek => self.deepseek.as_ref(),
            ProviderKind::Gemini => self.gemini.as_ref(),
        }
    }

    pub fn has(&self, kind: ProviderKind) -> bool {
        self.get(kind).is_some()
    }

    fn slot_mut(&mut self, kind: ProviderKind) -> &mut Option<SecretString> {
        match kind {
            ProviderKind::OpenAi => &mut self.openai,
            ProviderKind::DeepSeek => &mut self.deepseek,
            ProviderKind::Gemini => &mut self.gemini,
        }
    }
}

// Only presence is printed, never the key material.
impl fmt::Debug for CredentialSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialSet")
            .field("openai", &self.openai.is_some())
            .field("deepseek", &self.deepseek.is_some())
            .field("gemini", &self.gemini.is_some())
            .finish()
    }
}
