//! Conversation tree helpers.
//!
//! Conversations form a forest through `parent_id` back-references. Child
//! lookup is a linear scan over the caller's list; the core keeps no index.

use std::collections::HashSet;

use tracing::debug;
use uuid::Uuid;

use confab_types::chat::Chat;
use confab_types::error::ChatError;

/// Direct children of `parent`, in list order.
pub fn children_of<'a>(chats: &'a [Chat], parent: &Uuid) -> Vec<&'a Chat> {
    chats
        .iter()
        .filter(|c| c.parent_id.as_ref() == Some(parent))
        .collect()
}

/// Set or clear `child`'s parent.
///
/// Rejects unknown ids, self-parenting and any link that would make
/// `child` its own ancestor.
pub fn set_parent(chats: &mut [Chat], child: Uuid, parent: Option<Uuid>) -> Result<(), ChatError> {
    if !chats.iter().any(|c| c.id == child) {
        return Err(ChatError::NotFound(child));
    }
    if let Some(parent) = parent {
        if !chats.iter().any(|c| c.id == parent) {
            return Err(ChatError::UnknownParent(parent));
        }
        if parent == child || is_ancestor(chats, child, parent) {
            return Err(ChatError::Cycle { child, parent });
        }
    }

    let chat = chats
        .iter_mut()
        .find(|c| c.id == child)
        .ok_or(ChatError::NotFound(child))?;
    chat.parent_id = parent;
    debug!(%child, parent = ?parent, "parent updated");
    Ok(())
}

/// Whether `ancestor` is reached by walking up from `start`.
fn is_ancestor(chats: &[Chat], ancestor: Uuid, start: Uuid) -> bool {
    let mut seen = HashSet::new();
    let mut current = Some(start);
    while let Some(id) = current {
        if id == ancestor {
            return true;
        }
        if !seen.insert(id) {
            return false;
        }
        current = chats.iter().find(|c| c.id == id).and_then(|c| c.parent_id);
    }
    false
}

/// New conversation holding the history up to and including `message_id`.
///
/// The branch keeps the persona and participants, gets fresh ids and points
/// back at `chat` as its parent.
pub fn branch_from_message(chat: &Chat, message_id: &Uuid) -> Result<Chat, ChatError> {
    let cut = chat
        .messages
        .iter()
        .position(|m| &m.id == message_id)
        .ok_or(ChatError::MessageNotFound(*message_id))?;

    let mut branch = duplicate(chat);
    branch.messages.truncate(cut + 1);
    branch.name = format!("{} (branch)", chat.name);
    branch.parent_id = Some(chat.id);
    Ok(branch)
}

/// Deep copy with a new conversation id, new message ids and no parent.
pub fn duplicate(chat: &Chat) -> Chat {
    let mut copy = chat.clone();
    copy.id = Uuid::now_v7();
    copy.name = format!("{} (copy)", chat.name);
    copy.parent_id = None;
    for message in &mut copy.messages {
        message.id = Uuid::now_v7();
        // Own replies now belong to the copy's persona.
        if message.author_id == Some(chat.id) {
            message.author_id = Some(copy.id);
        }
    }
    copy
}

/// Remove `id` and detach its children. Returns the removed conversation.
///
/// Participants referencing the removed persona are dropped from arenas.
pub fn remove(chats: &mut Vec<Chat>, id: &Uuid) -> Result<Chat, ChatError> {
    let index = chats
        .iter()
        .position(|c| &c.id == id)
        .ok_or(ChatError::NotFound(*id))?;
    let removed = chats.remove(index);
    for chat in chats.iter_mut() {
        if chat.parent_id.as_ref() == Some(id) {
            chat.parent_id = None;
        }
        chat.remove_participant(id);
    }
    Ok(removed)
}
