//! OrchestrationController: turns one "respond" request into exactly one
//! message for the conversation log.
//!
//! Every failure is converted into a system error message here; nothing
//! past this boundary sees an `LlmError`.

use secrecy::SecretString;
use tracing::{debug, info, warn};
use uuid::Uuid;

use confab_types::chat::{Chat, Persona};
use confab_types::credential::CredentialSet;
use confab_types::llm::LlmError;
use confab_types::message::{Message, Sender};

use crate::history::strip_self_reference;
use crate::llm::gateway::{GatewayRequest, ProviderGateway};
use crate::turn::selector::{responders_for, select_responder};

use super::in_flight::InFlightRegistry;

/// Separator between a persona's prompt and the global instructions.
pub const SYSTEM_PROMPT_SEPARATOR: &str = "\n\n---\n\n";

/// Process-wide inputs threaded explicitly into every call.
#[derive(Debug, Clone, Default)]
pub struct RespondContext {
    pub credentials: CredentialSet,
    pub global_instructions: String,
}

impl RespondContext {
    pub fn new(credentials: CredentialSet, global_instructions: impl Into<String>) -> Self {
        Self {
            credentials,
            global_instructions: global_instructions.into(),
        }
    }
}

/// What a `respond` call produced.
#[derive(Debug, Clone, PartialEq)]
pub enum RespondOutcome {
    /// Exactly one message to append: a reply or a system error.
    Commit(Message),
    /// Nobody is due to answer (human slot pinned, no assistants).
    NoResponder,
    /// A response for this conversation is already in flight.
    Busy,
    /// No user or assistant messages to answer yet.
    EmptyHistory,
}

impl RespondOutcome {
    pub fn message(&self) -> Option<&Message> {
        match self {
            RespondOutcome::Commit(message) => Some(message),
            _ => None,
        }
    }
}

/// Resolves the responder, calls the gateway and shapes the result.
pub struct OrchestrationController {
    gateway: ProviderGateway,
    in_flight: InFlightRegistry,
}

impl OrchestrationController {
    pub fn new(gateway: ProviderGateway) -> Self {
        Self {
            gateway,
            in_flight: InFlightRegistry::new(),
        }
    }

    pub fn in_flight(&self) -> &InFlightRegistry {
        &self.in_flight
    }

    /// Produce the next message for `conversation` from a history snapshot.
    ///
    /// `roster` holds the personas of the conversation's participants.
    /// `pin` forces a specific responder. The caller appends the committed
    /// message; see [`Self::respond_and_append`].
    pub async fn respond(
        &self,
        conversation: &Chat,
        roster: &[Persona],
        history: &[Message],
        pin: Option<Uuid>,
        ctx: &RespondContext,
    ) -> RespondOutcome {
        let Some(_guard) = self.in_flight.try_acquire(conversation.id) else {
            warn!(conversation_id = %conversation.id, "response already in flight");
            return RespondOutcome::Busy;
        };

        if history.iter().all(|m| m.sender == Sender::System) {
            debug!(conversation_id = %conversation.id, "nothing to respond to");
            return RespondOutcome::EmptyHistory;
        }

        let responders = responders_for(conversation, roster);
        let Some(persona) =
            select_responder(&responders, history, conversation.is_multi_party(), pin)
        else {
            debug!(conversation_id = %conversation.id, "no responder due");
            return RespondOutcome::NoResponder;
        };

        let credential = ctx.credentials.get(persona.provider);
        if persona.provider.requires_user_credential() && credential.is_none() {
            warn!(
                conversation_id = %conversation.id,
                provider = %persona.provider,
                "no credential configured, skipping provider call"
            );
            let err = LlmError::CredentialMissing {
                provider: persona.provider,
            };
            return RespondOutcome::Commit(Message::system_error(err.to_string()));
        }

        let message = self
            .call(conversation.id, &persona, history, credential, ctx)
            .await;
        RespondOutcome::Commit(message)
    }

    /// Snapshot `chat`'s history, respond, and append the committed message.
    pub async fn respond_and_append(
        &self,
        chat: &mut Chat,
        roster: &[Persona],
        pin: Option<Uuid>,
        ctx: &RespondContext,
    ) -> RespondOutcome {
        let snapshot = chat.messages.clone();
        let outcome = self.respond(chat, roster, &snapshot, pin, ctx).await;
        if let RespondOutcome::Commit(message) = &outcome {
            chat.append(message.clone());
        }
        outcome
    }

    async fn call(
        &self,
        conversation_id: Uuid,
        persona: &Persona,
        history: &[Message],
        credential: Option<&SecretString>,
        ctx: &RespondContext,
    ) -> Message {
        let system_prompt = compose_system_prompt(&persona.system_prompt, &ctx.global_instructions);
        let request = GatewayRequest {
            provider: persona.provider,
            model: &persona.model,
            system_prompt: &system_prompt,
            history,
            credential,
            temperature: persona.temperature,
        };

        match self.gateway.send(request).await {
            Ok(text) => {
                let text = strip_self_reference(&text, &persona.name);
                if text.is_empty() {
                    warn!(%conversation_id, responder = %persona.name, "empty reply");
                    return Message::system_error(format!("{} returned an empty response", persona.name));
                }
                info!(
                    %conversation_id,
                    responder = %persona.name,
                    provider = %persona.provider,
                    model = %persona.model,
                    "reply received"
                );
                Message::assistant(text, persona.id, persona.name.clone())
            }
            Err(e) => {
                warn!(
                    %conversation_id,
                    responder = %persona.name,
                    provider = %persona.provider,
                    error = %e,
                    "provider call failed"
                );
                Message::system_error(format!("{}: {e}", persona.name))
            }
        }
    }
}

/// Persona prompt followed by the global instructions, always both.
pub fn compose_system_prompt(persona_prompt: &str, global_instructions: &str) -> String {
    format!("{persona_prompt}{SYSTEM_PROMPT_SEPARATOR}{global_instructions}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::box_provider::BoxChatProvider;
    use crate::llm::factory::ProviderFactory;
    use crate::llm::provider::ChatProvider;
    use confab_types::llm::{ChatRequest, ProviderKind};
    use std::collections::VecDeque;
    use std::future::Future;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    // --- Mock backend ---

    #[derive(Default)]
    struct Backend {
        replies: Mutex<VecDeque<Result<String, LlmError>>>,
        calls: AtomicUsize,
        requests: Mutex<Vec<(ProviderKind, ChatRequest)>>,
    }

    struct MockProvider {
        kind: ProviderKind,
        backend: Arc<Backend>,
    }

    impl ChatProvider for MockProvider {
        fn kind(&self) -> ProviderKind {
            self.kind
        }

        fn name(&self) -> &str {
            "mock"
        }

        fn send(
            &self,
            request: &ChatRequest,
        ) -> impl Future<Output = Result<String, LlmError>> + Send {
            self.backend.calls.fetch_add(1, Ordering::SeqCst);
            self.backend
                .requests
                .lock()
                .unwrap()
                .push((self.kind, request.clone()));
            let reply = self
                .backend
                .replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok("ok".to_string()));
            async move { reply }
        }
    }

    struct MockFactory {
        backend: Arc<Backend>,
    }

    impl ProviderFactory for MockFactory {
        fn create(
            &self,
            kind: ProviderKind,
            _credential: Option<&SecretString>,
        ) -> Result<BoxChatProvider, LlmError> {
            Ok(BoxChatProvider::new(MockProvider {
                kind,
                backend: self.backend.clone(),
            }))
        }
    }

    fn controller(replies: Vec<Result<String, LlmError>>) -> (OrchestrationController, Arc<Backend>) {
        let backend = Arc::new(Backend {
            replies: Mutex::new(replies.into()),
            ..Default::default()
        });
        let gateway = ProviderGateway::new(Arc::new(MockFactory {
            backend: backend.clone(),
        }));
        (OrchestrationController::new(gateway), backend)
    }

    fn direct_chat(provider: ProviderKind) -> Chat {
        let mut chat = Chat::new_assistant("Sage", provider, "model-x", "You are Sage.", 0.7);
        chat.append(Message::user("Hello?"));
        chat
    }

    fn with_keys() -> RespondContext {
        RespondContext::new(
            CredentialSet::new()
                .with(ProviderKind::OpenAi, "sk-openai")
                .with(ProviderKind::DeepSeek, "sk-deepseek"),
            "Answer in English.",
        )
    }

    #[tokio::test]
    async fn test_missing_credential_appends_one_error_without_network() {
        let (controller, backend) = controller(vec![]);
        let mut chat = direct_chat(ProviderKind::OpenAi);
        let ctx = RespondContext::default();

        let outcome = controller.respond_and_append(&mut chat, &[], None, &ctx).await;

        assert!(matches!(outcome, RespondOutcome::Commit(_)));
        assert_eq!(chat.messages.len(), 2);
        let last = chat.messages.last().unwrap();
        assert_eq!(last.sender, Sender::System);
        assert!(last.is_error);
        assert!(last.text.contains("OpenAI"));
        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limit_then_success_appends_one_reply() {
        let (controller, backend) = controller(vec![
            Err(LlmError::RateLimited {
                message: "slow down".to_string(),
            }),
            Ok("Greetings.".to_string()),
        ]);
        let mut chat = direct_chat(ProviderKind::DeepSeek);

        controller
            .respond_and_append(&mut chat, &[], None, &with_keys())
            .await;

        assert_eq!(chat.messages.len(), 2);
        let reply = chat.messages.last().unwrap();
        assert_eq!(reply.sender, Sender::Assistant);
        assert!(!reply.is_error);
        assert_eq!(reply.text, "Greetings.");
        assert_eq!(reply.author_id, Some(chat.id));
        assert_eq!(reply.author_name.as_deref(), Some("Sage"));
        assert_eq!(backend.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_system_prompt_always_carries_global_instructions() {
        let (controller, backend) = controller(vec![]);
        let chat = direct_chat(ProviderKind::OpenAi);

        controller
            .respond(&chat, &[], &chat.messages, None, &with_keys())
            .await;

        let requests = backend.requests.lock().unwrap();
        assert_eq!(requests[0].1.system, "You are Sage.\n\n---\n\nAnswer in English.");
    }

    #[test]
    fn test_compose_system_prompt_with_empty_globals() {
        assert_eq!(compose_system_prompt("P", ""), "P\n\n---\n\n");
    }

    #[tokio::test]
    async fn test_provider_failure_becomes_system_error() {
        let (controller, _) = controller(vec![Err(LlmError::Provider {
            status: Some(400),
            message: "model not found".to_string(),
        })]);
        let chat = direct_chat(ProviderKind::OpenAi);

        let outcome = controller
            .respond(&chat, &[], &chat.messages, None, &with_keys())
            .await;

        let message = outcome.message().unwrap();
        assert!(message.is_error);
        assert_eq!(message.sender, Sender::System);
        assert!(message.text.contains("model not found"));
    }

    #[tokio::test]
    async fn test_reply_self_reference_is_stripped() {
        let (controller, _) = controller(vec![Ok("[Sage] Indeed.".to_string())]);
        let chat = direct_chat(ProviderKind::Gemini);

        let outcome = controller
            .respond(&chat, &[], &chat.messages, None, &RespondContext::default())
            .await;

        assert_eq!(outcome.message().unwrap().text, "Indeed.");
    }

    #[tokio::test]
    async fn test_empty_reply_becomes_system_error() {
        let (controller, _) = controller(vec![Ok("--- END SAGE ---".to_string())]);
        let chat = direct_chat(ProviderKind::Gemini);

        let outcome = controller
            .respond(&chat, &[], &chat.messages, None, &RespondContext::default())
            .await;

        assert!(outcome.message().unwrap().is_error);
    }

    #[tokio::test]
    async fn test_arena_uses_responders_own_provider_and_credential() {
        let (controller, backend) = controller(vec![]);
        let mut arena = Chat::new_assistant("Host", ProviderKind::Gemini, "gemini-2.5-flash", "Host.", 0.5);
        let guest = Chat::new_assistant("Guest", ProviderKind::DeepSeek, "deepseek-chat", "Guest.", 0.9);
        arena.add_participant(guest.id).unwrap();
        arena.append(Message::user("Debate!"));
        arena.append(Message::assistant("Opening.", arena.id, "Host"));
        let roster = vec![guest.persona()];

        let ctx = RespondContext::new(CredentialSet::new().with(ProviderKind::DeepSeek, "sk-ds"), "");
        let outcome = controller.respond_and_append(&mut arena, &roster, None, &ctx).await;

        let reply = outcome.message().unwrap();
        assert_eq!(reply.author_id, Some(guest.id));
        assert_eq!(reply.author_name.as_deref(), Some("Guest"));
        let requests = backend.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].0, ProviderKind::DeepSeek);
        assert_eq!(requests[0].1.model, "deepseek-chat");
        assert_eq!(requests[0].1.temperature, 0.9);
    }

    #[tokio::test]
    async fn test_arena_responder_without_credential_gets_error() {
        let (controller, backend) = controller(vec![]);
        let mut arena = Chat::new_assistant("Host", ProviderKind::Gemini, "gemini-2.5-flash", "", 0.5);
        let guest = Chat::new_assistant("Guest", ProviderKind::OpenAi, "gpt-4o", "", 0.9);
        arena.add_participant(guest.id).unwrap();
        arena.append(Message::assistant("Opening.", arena.id, "Host"));

        let outcome = controller
            .respond_and_append(&mut arena, &[guest.persona()], None, &RespondContext::default())
            .await;

        assert!(outcome.message().unwrap().is_error);
        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_busy_conversation_is_rejected() {
        let (controller, backend) = controller(vec![]);
        let mut chat = direct_chat(ProviderKind::Gemini);
        let _guard = controller.in_flight().try_acquire(chat.id).unwrap();

        let outcome = controller
            .respond_and_append(&mut chat, &[], None, &RespondContext::default())
            .await;

        assert_eq!(outcome, RespondOutcome::Busy);
        assert_eq!(chat.messages.len(), 1);
        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_in_flight_slot_released_after_respond() {
        let (controller, _) = controller(vec![]);
        let mut chat = direct_chat(ProviderKind::Gemini);
        controller
            .respond_and_append(&mut chat, &[], None, &RespondContext::default())
            .await;
        assert!(!controller.in_flight().is_in_flight(&chat.id));
    }

    #[tokio::test]
    async fn test_pinning_me_is_a_no_op() {
        let (controller, backend) = controller(vec![]);
        let mut chat = direct_chat(ProviderKind::Gemini);

        let outcome = controller
            .respond_and_append(
                &mut chat,
                &[],
                Some(crate::turn::Responder::ME_ID),
                &RespondContext::default(),
            )
            .await;

        assert_eq!(outcome, RespondOutcome::NoResponder);
        assert_eq!(chat.messages.len(), 1);
        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_empty_history_is_not_sent() {
        let (controller, backend) = controller(vec![]);
        let mut arena = Chat::new_assistant("Host", ProviderKind::Gemini, "gemini-2.5-flash", "", 0.5);
        let guest = Chat::new_assistant("Guest", ProviderKind::Gemini, "gemini-2.5-flash", "", 0.9);
        arena.add_participant(guest.id).unwrap();
        arena.append(Message::system_error("earlier failure"));

        let outcome = controller
            .respond_and_append(&mut arena, &[guest.persona()], None, &RespondContext::default())
            .await;

        assert_eq!(outcome, RespondOutcome::EmptyHistory);
        assert_eq!(arena.messages.len(), 1);
        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
        assert!(!controller.in_flight().is_in_flight(&arena.id));
    }
}
