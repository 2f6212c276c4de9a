//! Conversation commands: send a message, run an arena unattended.

use std::time::Duration;

use anyhow::{Context, Result};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::Instrument;
use uuid::Uuid;

use confab_core::orchestration::RespondOutcome;
use confab_core::turn::{AutoFlowScheduler, FlowDecision, FlowEligibility, Responder, assistants_for};
use confab_infra::store::ChatDocument;
use confab_observe::genai_attrs::{OP_RESPOND, span_name};
use confab_types::chat::Chat;
use confab_types::message::{Message, Sender};

use super::render::print_message;
use super::resolve_chat;
use crate::state::AppState;

/// Append a user message (if any) and let the due responder answer.
///
/// `responder` pins the answer to a persona, or to nobody with "me".
pub async fn send_message(
    state: &AppState,
    reference: &str,
    text: &str,
    responder: Option<&str>,
    json: bool,
) -> Result<()> {
    let mut document = state.load().await?;
    let id = resolve_chat(&document, reference)?;
    let pin = responder.map(|r| resolve_pin(&document, r)).transpose()?;

    let text = text.trim();
    if !text.is_empty() {
        let message = Message::user(text);
        chat_mut(&mut document, &id)?.append(message.clone());
        state.save(&document).await?;
        if !json {
            println!();
            print_message(&message);
        }
    }

    let outcome = respond_once(state, &mut document, id, pin, !json).await?;
    report(&outcome, json)
}

/// Run up to `rounds` unattended turns in an arena.
///
/// Stops early on Ctrl-C, when a turn fails, or when the arena no longer
/// has enough assistants.
pub async fn run_flow(state: &AppState, reference: &str, rounds: u32, json: bool) -> Result<()> {
    let mut document = state.load().await?;
    let id = resolve_chat(&document, reference)?;

    let empty = document.find(&id).is_some_and(awaits_first_message);
    if empty {
        report(&RespondOutcome::EmptyHistory, json)?;
        return Ok(());
    }

    let scheduler = AutoFlowScheduler::new(state.auto_flow_delay());
    scheduler.enable();

    let shutdown = scheduler.shutdown_token();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            shutdown.cancel();
        }
    });

    let mut completed = 0;
    while completed < rounds {
        let eligibility = {
            let chat = document
                .find(&id)
                .with_context(|| format!("conversation {id} vanished"))?;
            FlowEligibility {
                assistant_count: assistants_for(chat, &document.roster()).len(),
                in_flight: state.controller.in_flight().is_in_flight(&id),
            }
        };

        match scheduler.wait_for_turn(eligibility).await {
            FlowDecision::Fire => {}
            FlowDecision::Ineligible => {
                if !json {
                    println!(
                        "  {} auto-flow needs an arena with at least two assistants",
                        style("ℹ").blue()
                    );
                }
                break;
            }
            FlowDecision::Cancelled => {
                if !json {
                    println!("  {} auto-flow stopped", style("ℹ").blue());
                }
                break;
            }
        }

        let outcome = respond_once(state, &mut document, id, None, !json).await?;
        report(&outcome, json)?;
        completed += 1;

        let failed = outcome.message().is_none_or(|m| m.is_error);
        if failed {
            tracing::info!(conversation_id = %id, completed, "auto-flow halted after failed turn");
            break;
        }
    }

    scheduler.disable();
    interrupt.abort();
    tracing::debug!(conversation_id = %id, completed, "auto-flow finished");
    Ok(())
}

/// One orchestrated reply, appended and persisted.
async fn respond_once(
    state: &AppState,
    document: &mut ChatDocument,
    id: Uuid,
    pin: Option<Uuid>,
    show_spinner: bool,
) -> Result<RespondOutcome> {
    let roster = document.roster();
    let chat = chat_mut(document, &id)?;

    let span = tracing::info_span!(
        "respond",
        otel.name = %span_name(OP_RESPOND, &chat.model_name),
        gen_ai.operation.name = OP_RESPOND,
        conversation.id = %id,
        multi_party = chat.is_multi_party(),
    );

    let spinner = show_spinner.then(|| waiting_spinner(&chat.name));
    let outcome = state
        .controller
        .respond_and_append(chat, &roster, pin, &state.context)
        .instrument(span)
        .await;
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }

    if matches!(outcome, RespondOutcome::Commit(_)) {
        state.save(document).await?;
    }
    Ok(outcome)
}

fn report(outcome: &RespondOutcome, json: bool) -> Result<()> {
    match outcome {
        RespondOutcome::Commit(message) => {
            if json {
                println!("{}", serde_json::to_string_pretty(message)?);
            } else {
                print_message(message);
            }
        }
        RespondOutcome::NoResponder => {
            if json {
                println!("{}", serde_json::json!({ "responded": false }));
            }
        }
        RespondOutcome::Busy => {
            if json {
                println!("{}", serde_json::json!({ "responded": false, "busy": true }));
            } else {
                println!("  {} a reply is already in progress", style("ℹ").blue());
            }
        }
        RespondOutcome::EmptyHistory => {
            if json {
                println!("{}", serde_json::json!({ "responded": false, "reason": "empty" }));
            } else {
                println!(
                    "  {} nothing to respond to yet; send a message first",
                    style("ℹ").blue()
                );
            }
        }
    }
    Ok(())
}

fn waiting_spinner(name: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(spinner_style) = ProgressStyle::default_spinner().template("  {spinner:.cyan} {msg}") {
        spinner.set_style(spinner_style);
    }
    spinner.set_message(format!("{name} is thinking..."));
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner
}

fn chat_mut<'a>(document: &'a mut ChatDocument, id: &Uuid) -> Result<&'a mut Chat> {
    document
        .find_mut(id)
        .with_context(|| format!("conversation {id} vanished"))
}

// Only system banners (or nothing) so far.
fn awaits_first_message(chat: &Chat) -> bool {
    chat.messages.iter().all(|m| m.sender == Sender::System)
}

/// "me" pins the human slot; anything else names a persona's conversation.
fn resolve_pin(document: &ChatDocument, reference: &str) -> Result<Uuid> {
    if reference.trim().eq_ignore_ascii_case("me") {
        return Ok(Responder::ME_ID);
    }
    resolve_chat(document, reference)
}

#[cfg(test)]
mod tests {
    use super::*;
    use confab_types::llm::ProviderKind;

    #[test]
    fn test_resolve_pin_me_is_human_slot() {
        let document = ChatDocument::default();
        assert_eq!(resolve_pin(&document, "Me").unwrap(), Responder::ME_ID);
    }

    #[test]
    fn test_resolve_pin_by_persona_name() {
        let chat = Chat::new_assistant("Sage", ProviderKind::OpenAi, "gpt-4o", "", 0.7);
        let id = chat.id;
        let document = ChatDocument {
            chats: vec![chat],
            ..Default::default()
        };
        assert_eq!(resolve_pin(&document, "sage").unwrap(), id);
        assert!(resolve_pin(&document, "nobody").is_err());
    }

    #[test]
    fn test_awaits_first_message_ignores_system_banners() {
        let mut arena = Chat::new_assistant("Host", ProviderKind::Gemini, "gemini-2.5-flash", "", 0.5);
        assert!(awaits_first_message(&arena));

        arena.append(Message::system_error("earlier failure"));
        assert!(awaits_first_message(&arena));

        arena.append(Message::user("Debate!"));
        assert!(!awaits_first_message(&arena));
    }
}
