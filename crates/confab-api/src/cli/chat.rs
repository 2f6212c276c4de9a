//! Conversation lifecycle commands: create, list, show, branch, duplicate,
//! reparent, archive and delete.

use anyhow::{Context, Result, bail};
use console::style;
use dialoguer::Confirm;
use uuid::Uuid;

use confab_core::chat::tree;
use confab_types::chat::Chat;
use confab_types::llm::ProviderKind;

use super::render::{chat_table, kind_label, print_message, short_id};
use super::resolve_chat;
use crate::state::AppState;

/// Persona settings shared by `new assistant` and `new arena`.
pub struct PersonaArgs {
    pub name: String,
    pub provider: ProviderKind,
    pub model: String,
    pub system: String,
    pub temperature: f64,
}

impl PersonaArgs {
    fn into_chat(self) -> Chat {
        Chat::new_assistant(
            self.name,
            self.provider,
            self.model,
            self.system,
            self.temperature,
        )
    }
}

/// Create a direct conversation bound to a new persona.
pub async fn create_assistant(state: &AppState, persona: PersonaArgs, json: bool) -> Result<()> {
    let mut document = state.load().await?;
    let chat = persona.into_chat();
    document.chats.push(chat.clone());
    state.save(&document).await?;

    tracing::info!(chat_id = %chat.id, provider = %chat.provider, "assistant created");
    print_created(&chat, json)
}

/// Create an arena rotating between existing personas.
pub async fn create_arena(
    state: &AppState,
    persona: PersonaArgs,
    participants: &[String],
    json: bool,
) -> Result<()> {
    let mut document = state.load().await?;

    let mut chat = persona.into_chat();
    chat.is_group = true;
    for reference in participants {
        let id = resolve_chat(&document, reference)?;
        chat.add_participant(id)?;
    }
    document.chats.push(chat.clone());
    state.save(&document).await?;

    tracing::info!(chat_id = %chat.id, participants = chat.participant_ids.len(), "arena created");
    print_created(&chat, json)
}

fn print_created(chat: &Chat, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(chat)?);
        return Ok(());
    }
    println!();
    println!(
        "  {} {} '{}' created",
        style("✓").green().bold(),
        kind_label(chat),
        style(&chat.name).cyan().bold()
    );
    println!("  {} {}", style("Id:").dim(), chat.id);
    println!(
        "  {} {} / {}",
        style("Model:").dim(),
        chat.provider.display_name(),
        chat.model_name
    );
    println!();
    Ok(())
}

/// List active (or archived) conversations.
pub async fn list_chats(state: &AppState, archived: bool, json: bool) -> Result<()> {
    let document = state.load().await?;
    let chats: Vec<&Chat> = document
        .chats
        .iter()
        .filter(|c| c.is_archived() == archived)
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&chats)?);
        return Ok(());
    }

    if chats.is_empty() {
        println!();
        if archived {
            println!("  No archived conversations.");
        } else {
            println!("  No conversations yet. Create one with:");
            println!(
                "  {} confab new assistant --name Sage --provider gemini --model gemini-2.5-flash",
                style("$").dim()
            );
        }
        println!();
        return Ok(());
    }

    println!("{}", chat_table(&chats));
    Ok(())
}

/// Show a conversation's persona, tree position and message log.
pub async fn show_chat(state: &AppState, reference: &str, json: bool) -> Result<()> {
    let document = state.load().await?;
    let id = resolve_chat(&document, reference)?;
    let chat = document
        .find(&id)
        .with_context(|| format!("conversation {id} vanished"))?;

    if json {
        println!("{}", serde_json::to_string_pretty(chat)?);
        return Ok(());
    }

    println!();
    println!(
        "  {} {}",
        style(&chat.name).cyan().bold(),
        style(format!("({})", kind_label(chat))).dim()
    );
    println!("  {} {}", style("Id:").dim(), chat.id);
    println!(
        "  {} {} / {} (temperature {})",
        style("Model:").dim(),
        chat.provider.display_name(),
        chat.model_name,
        chat.temperature
    );
    if !chat.system_prompt.is_empty() {
        println!("  {} {}", style("Prompt:").dim(), chat.system_prompt);
    }
    if let Some(parent) = chat.parent_id.and_then(|p| document.find(&p)) {
        println!("  {} {}", style("Parent:").dim(), parent.name);
    }
    let children = tree::children_of(&document.chats, &chat.id);
    if !children.is_empty() {
        let names: Vec<&str> = children.iter().map(|c| c.name.as_str()).collect();
        println!("  {} {}", style("Children:").dim(), names.join(", "));
    }
    if chat.is_multi_party() {
        let names: Vec<String> = chat
            .participant_ids
            .iter()
            .map(|p| {
                document
                    .find(p)
                    .map(|c| c.name.clone())
                    .unwrap_or_else(|| format!("{p} (missing)"))
            })
            .collect();
        println!("  {} {}", style("Participants:").dim(), names.join(", "));
    }
    if chat.is_archived() {
        println!("  {}", style("Archived").yellow());
    }
    println!();

    for message in &chat.messages {
        print_message(message);
    }
    Ok(())
}

/// Branch at a message into a new child conversation.
pub async fn branch_chat(state: &AppState, reference: &str, message: &str, json: bool) -> Result<()> {
    let mut document = state.load().await?;
    let id = resolve_chat(&document, reference)?;
    let chat = document
        .find(&id)
        .with_context(|| format!("conversation {id} vanished"))?;
    let message_id = resolve_message(chat, message)?;

    let branch = tree::branch_from_message(chat, &message_id)?;
    document.chats.push(branch.clone());
    state.save(&document).await?;

    tracing::info!(parent = %id, branch = %branch.id, "conversation branched");
    print_created(&branch, json)
}

/// Copy a conversation under a new id.
pub async fn duplicate_chat(state: &AppState, reference: &str, json: bool) -> Result<()> {
    let mut document = state.load().await?;
    let id = resolve_chat(&document, reference)?;
    let chat = document
        .find(&id)
        .with_context(|| format!("conversation {id} vanished"))?;

    let copy = tree::duplicate(chat);
    document.chats.push(copy.clone());
    state.save(&document).await?;
    print_created(&copy, json)
}

/// Move a conversation under `parent`, or detach it when `parent` is None.
pub async fn reparent_chat(
    state: &AppState,
    reference: &str,
    parent: Option<&str>,
    json: bool,
) -> Result<()> {
    let mut document = state.load().await?;
    let child = resolve_chat(&document, reference)?;
    let parent = parent.map(|p| resolve_chat(&document, p)).transpose()?;

    tree::set_parent(&mut document.chats, child, parent)?;
    state.save(&document).await?;

    if json {
        println!(
            "{}",
            serde_json::json!({ "id": child, "parentId": parent })
        );
    } else if let Some(parent) = parent {
        println!("  {} moved under {parent}", style("✓").green().bold());
    } else {
        println!("  {} detached", style("✓").green().bold());
    }
    Ok(())
}

/// Toggle the archived tag.
pub async fn archive_chat(state: &AppState, reference: &str, restore: bool, json: bool) -> Result<()> {
    let mut document = state.load().await?;
    let id = resolve_chat(&document, reference)?;
    let chat = document
        .find_mut(&id)
        .with_context(|| format!("conversation {id} vanished"))?;

    if restore {
        chat.unarchive();
    } else {
        chat.archive();
    }
    let name = chat.name.clone();
    state.save(&document).await?;

    if json {
        println!("{}", serde_json::json!({ "id": id, "archived": !restore }));
    } else {
        let verb = if restore { "restored" } else { "archived" };
        println!("  {} '{}' {verb}", style("✓").green().bold(), name);
    }
    Ok(())
}

/// Permanently delete a conversation after confirmation.
pub async fn delete_chat(state: &AppState, reference: &str, force: bool, json: bool) -> Result<()> {
    let mut document = state.load().await?;
    let id = resolve_chat(&document, reference)?;

    if !force && !json {
        let name = document.find(&id).map(|c| c.name.clone()).unwrap_or_default();
        let confirmed = Confirm::new()
            .with_prompt(format!("Delete '{name}' and its messages permanently?"))
            .default(false)
            .interact()?;
        if !confirmed {
            println!("  Cancelled.");
            return Ok(());
        }
    }

    let removed = tree::remove(&mut document.chats, &id)?;
    state.save(&document).await?;

    if json {
        println!("{}", serde_json::json!({ "id": id, "deleted": true }));
    } else {
        println!(
            "  {} '{}' ({}) deleted",
            style("✓").green().bold(),
            removed.name,
            short_id(&removed)
        );
    }
    Ok(())
}

/// Resolve a message by full id or unique id prefix.
fn resolve_message(chat: &Chat, reference: &str) -> Result<Uuid> {
    let reference = reference.trim().to_lowercase();
    if let Ok(id) = reference.parse::<Uuid>() {
        return Ok(id);
    }
    let matches: Vec<Uuid> = chat
        .messages
        .iter()
        .filter(|m| !reference.is_empty() && m.id.to_string().starts_with(&reference))
        .map(|m| m.id)
        .collect();
    match matches.as_slice() {
        [id] => Ok(*id),
        [] => bail!("no message matches '{reference}'"),
        many => bail!("'{reference}' is ambiguous ({} messages)", many.len()),
    }
}
