//! Turn selection for direct and multi-party conversations.

use uuid::Uuid;

use confab_types::chat::{Chat, Persona};
use confab_types::message::{Message, Sender};

/// One slot in a conversation's responder list.
#[derive(Debug, Clone, PartialEq)]
pub enum Responder {
    /// The human. Pinning it means nobody answers.
    Me,
    Assistant(Persona),
}

impl Responder {
    /// Id used when pinning the human slot.
    pub const ME_ID: Uuid = Uuid::nil();

    pub fn id(&self) -> Uuid {
        match self {
            Responder::Me => Self::ME_ID,
            Responder::Assistant(persona) => persona.id,
        }
    }

    pub fn as_persona(&self) -> Option<&Persona> {
        match self {
            Responder::Me => None,
            Responder::Assistant(persona) => Some(persona),
        }
    }
}

/// Assistants eligible to answer in `chat`, in rotation order.
///
/// The conversation's own persona comes first, followed by each listed
/// participant found in `roster`. Unknown participant ids are skipped.
pub fn assistants_for(chat: &Chat, roster: &[Persona]) -> Vec<Persona> {
    let mut assistants = vec![chat.persona()];
    for participant in &chat.participant_ids {
        if let Some(persona) = roster.iter().find(|p| &p.id == participant) {
            if !assistants.iter().any(|a| a.id == persona.id) {
                assistants.push(persona.clone());
            }
        }
    }
    assistants
}

/// The full responder list: the human slot followed by every assistant.
pub fn responders_for(chat: &Chat, roster: &[Persona]) -> Vec<Responder> {
    std::iter::once(Responder::Me)
        .chain(assistants_for(chat, roster).into_iter().map(Responder::Assistant))
        .collect()
}

/// Pick the assistant that answers next.
///
/// An explicit `pin` wins: it resolves to that assistant, or to nobody when
/// it names the human slot or an unknown id. Without a pin a direct
/// conversation uses its sole assistant, and a multi-party conversation
/// rotates to the assistant after the most recent assistant author.
pub fn select_responder(
    responders: &[Responder],
    history: &[Message],
    multi_party: bool,
    pin: Option<Uuid>,
) -> Option<Persona> {
    let assistants: Vec<&Persona> = responders.iter().filter_map(Responder::as_persona).collect();

    if let Some(pinned) = pin {
        return assistants.into_iter().find(|p| p.id == pinned).cloned();
    }

    let first = assistants.first().copied()?;
    if !multi_party {
        return Some(first.clone());
    }

    let Some(last) = history.iter().rev().find(|m| m.sender == Sender::Assistant) else {
        return Some(first.clone());
    };

    let by_id = last
        .author_id
        .and_then(|id| assistants.iter().position(|p| p.id == id));
    let position = by_id.or_else(|| {
        let name = last.author_name.as_deref()?;
        assistants.iter().position(|p| p.name == name)
    });

    match position {
        Some(i) => Some(assistants[(i + 1) % assistants.len()].clone()),
        None => Some(first.clone()),
    }
}
