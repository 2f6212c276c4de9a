//! Shared HTTP status classification for provider backends.
//!
//! Every backend reports failures the same way: 401 is an authentication
//! failure, 429 is a rate limit, anything else non-2xx is a provider error
//! carrying the provider's own `error.message` when it sent one.

use std::time::Duration;

use confab_types::llm::LlmError;

/// Long generations with large thinking budgets can take minutes.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

/// Build the shared HTTP client.
pub fn build_client() -> Result<reqwest::Client, LlmError> {
    reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .map_err(|e| LlmError::Transport(format!("failed to create HTTP client: {e}")))
}

/// Pass successful responses through; classify everything else.
pub async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, LlmError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(classify(status.as_u16(), &body))
}

/// Map a non-2xx status and body to an [`LlmError`].
pub fn classify(status: u16, body: &str) -> LlmError {
    match status {
        401 => LlmError::AuthenticationFailed,
        429 => LlmError::RateLimited {
            message: error_message(status, body),
        },
        _ => LlmError::Provider {
            status: Some(status),
            message: error_message(status, body),
        },
    }
}

/// The provider's `error.message`, or `Error <status>` when absent.
pub fn error_message(status: u16, body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")?
                .get("message")?
                .as_str()
                .map(str::to_string)
        })
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| format!("Error {status}"))
}

/// Map a transport-level failure.
pub fn transport(e: reqwest::Error) -> LlmError {
    LlmError::Transport(e.to_string())
}
