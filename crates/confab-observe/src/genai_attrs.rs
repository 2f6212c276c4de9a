//! OpenTelemetry GenAI semantic convention names.
//!
//! Field names match the OTel GenAI conventions so spans exported through
//! the stdout bridge line up with other GenAI tooling. `tracing` macros need
//! literal field names, so the gateway spells them out; these constants are
//! for span naming and for anything that builds attributes dynamically.
//!
//! Span naming convention: `"{operation} {model}"` (e.g., `"chat gpt-4o"`).

/// The name of the operation being performed.
pub const GEN_AI_OPERATION_NAME: &str = "gen_ai.operation.name";

/// The provider family (e.g., "openai", "gemini").
pub const GEN_AI_SYSTEM: &str = "gen_ai.system";

/// The model ID requested.
pub const GEN_AI_REQUEST_MODEL: &str = "gen_ai.request.model";

/// The sampling temperature for the request.
pub const GEN_AI_REQUEST_TEMPERATURE: &str = "gen_ai.request.temperature";

/// The maximum number of output tokens requested.
pub const GEN_AI_REQUEST_MAX_TOKENS: &str = "gen_ai.request.max_tokens";

/// Id of the persona answering.
pub const GEN_AI_AGENT_ID: &str = "gen_ai.agent.id";

/// Display name of the persona answering.
pub const GEN_AI_AGENT_NAME: &str = "gen_ai.agent.name";

// --- Operation name values ---

/// Chat completion.
pub const OP_CHAT: &str = "chat";

/// One orchestrated reply (responder selection plus chat call).
pub const OP_RESPOND: &str = "respond";

/// Span name for an operation against a model.
pub fn span_name(operation: &str, model: &str) -> String {
    if model.is_empty() {
        operation.to_string()
    } else {
        format!("{operation} {model}")
    }
}
