//! Credential resolution for the host process.
//!
//! Gemini's key is process-wide and comes from the environment
//! (`GEMINI_API_KEY`, falling back to `API_KEY`). OpenAI and DeepSeek keys
//! are user-supplied through settings. The result is handed to the core as
//! an explicit [`CredentialSet`].

use confab_types::config::Settings;
use confab_types::credential::CredentialSet;
use confab_types::llm::ProviderKind;

/// Primary environment variable for the Gemini key.
pub const GEMINI_KEY_ENV: &str = "GEMINI_API_KEY";

/// Fallback environment variable for the Gemini key.
pub const FALLBACK_KEY_ENV: &str = "API_KEY";

/// Build credentials from settings and the process environment.
pub fn resolve_credentials(settings: &Settings) -> CredentialSet {
    credentials_from(settings, |name| std::env::var(name).ok())
}

/// Build credentials from settings and an environment lookup.
pub fn credentials_from(settings: &Settings, env: impl Fn(&str) -> Option<String>) -> CredentialSet {
    let mut credentials = CredentialSet::new();

    let gemini = [GEMINI_KEY_ENV, FALLBACK_KEY_ENV]
        .into_iter()
        .filter_map(&env)
        .find(|v| !v.trim().is_empty());
    if let Some(key) = gemini {
        credentials.set(ProviderKind::Gemini, key);
    }
    if let Some(key) = &settings.credentials.openai_api_key {
        credentials.set(ProviderKind::OpenAi, key.as_str());
    }
    if let Some(key) = &settings.credentials.deepseek_api_key {
        credentials.set(ProviderKind::DeepSeek, key.as_str());
    }

    tracing::debug!(
        openai = credentials.has(ProviderKind::OpenAi),
        deepseek = credentials.has(ProviderKind::DeepSeek),
        gemini = credentials.has(ProviderKind::Gemini),
        "credentials resolved"
    );
    credentials
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::collections::HashMap;

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_gemini_key_prefers_primary_variable() {
        let creds = credentials_from(
            &Settings::default(),
            env(&[(GEMINI_KEY_ENV, "primary"), (FALLBACK_KEY_ENV, "fallback")]),
        );
        assert_eq!(creds.get(ProviderKind::Gemini).unwrap().expose_secret(), "primary");
    }

    #[test]
    fn test_gemini_key_falls_back() {
        let creds = credentials_from(&Settings::default(), env(&[(GEMINI_KEY_ENV, " "), (FALLBACK_KEY_ENV, "fallback")]));
        assert_eq!(creds.get(ProviderKind::Gemini).unwrap().expose_secret(), "fallback");
    }

    #[test]
    fn test_rest_keys_come_from_settings_only() {
        let mut settings = Settings::default();
        settings.credentials.deepseek_api_key = Some("sk-ds".to_string());
        let creds = credentials_from(&settings, env(&[("OPENAI_API_KEY", "ignored")]));
        assert!(creds.has(ProviderKind::DeepSeek));
        assert!(!creds.has(ProviderKind::OpenAi));
        assert!(!creds.has(ProviderKind::Gemini));
    }
}
