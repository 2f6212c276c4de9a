//! Message log -> normalized turn sequence.
//!
//! Every request is rebuilt from the raw log: system banners are dropped,
//! the tail of the log is windowed to a fixed size and character budget,
//! each message is wrapped in author tags, roles are mapped to the target
//! provider's vocabulary, and same-role runs are merged. Chat-completion
//! providers additionally get strict user/assistant alternation.

use confab_types::llm::{NormalizedTurn, ProviderKind, TurnRole};
use confab_types::message::{Message, Sender};

/// Most messages considered for a single request.
pub const MAX_HISTORY_MESSAGES: usize = 40;

/// Character budget for the windowed history (Unicode scalar values).
pub const MAX_HISTORY_CHARS: usize = 12_000;

const MERGE_SEPARATOR: &str = "\n\n";

/// Build the turn sequence for `target` from a conversation history.
///
/// Total: never fails. Empty input yields empty output; any non-empty
/// input yields at least one non-empty turn. For non-Gemini targets the
/// result starts with `user`, alternates strictly and ends with `user`.
pub fn normalize(history: &[Message], target: ProviderKind) -> Vec<NormalizedTurn> {
    let window = window(history);
    if window.is_empty() {
        return Vec::new();
    }

    let mut turns: Vec<NormalizedTurn> = Vec::with_capacity(window.len());
    for message in window {
        let role = map_role(message.sender, target);
        let content = tag(message);
        match turns.last_mut() {
            Some(last) if last.role == role => {
                last.content.push_str(MERGE_SEPARATOR);
                last.content.push_str(&content);
            }
            _ => turns.push(NormalizedTurn::new(role, content)),
        }
    }

    if !target.is_gemini() {
        repair_alternation(&mut turns);
    }
    turns
}

/// Non-system messages that fit the count and character budgets, oldest first.
fn window(history: &[Message]) -> Vec<&Message> {
    let conversational: Vec<&Message> = history
        .iter()
        .filter(|m| m.sender != Sender::System)
        .collect();
    let start = conversational.len().saturating_sub(MAX_HISTORY_MESSAGES);
    let recent = &conversational[start..];

    let mut used = 0usize;
    let mut keep = 0usize;
    for message in recent.iter().rev() {
        let chars = message.text.chars().count();
        if keep > 0 && used + chars > MAX_HISTORY_CHARS {
            break;
        }
        used += chars;
        keep += 1;
    }
    recent[recent.len() - keep..].to_vec()
}

fn map_role(sender: Sender, target: ProviderKind) -> TurnRole {
    match sender {
        Sender::User => TurnRole::User,
        _ if target.is_gemini() => TurnRole::Model,
        _ => TurnRole::Assistant,
    }
}

fn author_label(message: &Message) -> String {
    let label = match message.author_name.as_deref().map(str::trim) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => match message.sender {
            Sender::User => "User".to_string(),
            _ => "Assistant".to_string(),
        },
    };
    label.to_uppercase()
}

fn tag(message: &Message) -> String {
    let author = author_label(message);
    format!("--- SOURCE: {author} ---\n{}\n--- END {author} ---", message.text)
}

/// Enforce `user, assistant, ..., user` on an already merged sequence.
///
/// Merging guarantees adjacent turns differ in role, so only the two ends
/// need fixing. Content is wrapped rather than dropped.
fn repair_alternation(turns: &mut Vec<NormalizedTurn>) {
    if turns.len() == 1 && turns[0].role == TurnRole::Assistant {
        let only = &mut turns[0];
        only.role = TurnRole::User;
        only.content = format!("[DIALOGUE CONTEXT]\n{}", only.content);
        return;
    }

    if turns.first().is_some_and(|t| t.role == TurnRole::Assistant) {
        let context = format!("[PREVIOUS CONTEXT]\n{}", turns[0].content);
        turns.insert(0, NormalizedTurn::new(TurnRole::User, context));
    }

    if turns.last().is_some_and(|t| t.role == TurnRole::Assistant) {
        if let Some(trailing) = turns.pop() {
            if let Some(last_user) = turns.last_mut() {
                last_user.content.push_str("\n\n[FOLLOW-UP RESPONSE]\n");
                last_user.content.push_str(&trailing.content);
            }
        }
    }
}
