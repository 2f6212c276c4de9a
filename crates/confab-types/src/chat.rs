//! Conversation and persona types for Confab.
//!
//! A [`Chat`] doubles as an assistant persona: its provider, model, system
//! prompt and temperature describe "the assistant" of a direct conversation.
//! Arenas list other chats as participants and rotate between them.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ChatError;
use crate::llm::ProviderKind;
use crate::message::Message;

/// Tag used for soft deletion.
pub const ARCHIVED_TAG: &str = "archived";

/// A conversation with its bound persona and message log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chat {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub avatar: String,
    pub provider: ProviderKind,
    pub model_name: String,
    #[serde(default)]
    pub system_prompt: String,
    pub temperature: f64,
    #[serde(default)]
    pub messages: Vec<Message>,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    /// Ordered; the order is the arena's rotation order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub participant_ids: Vec<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_group: bool,
}

impl Chat {
    /// Create a direct conversation bound to a new assistant persona.
    pub fn new_assistant(
        name: impl Into<String>,
        provider: ProviderKind,
        model_name: impl Into<String>,
        system_prompt: impl Into<String>,
        temperature: f64,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            name: name.into(),
            avatar: String::new(),
            provider,
            model_name: model_name.into(),
            system_prompt: system_prompt.into(),
            temperature,
            messages: Vec::new(),
            tags: BTreeSet::new(),
            participant_ids: Vec::new(),
            parent_id: None,
            is_group: false,
        }
    }

    /// Whether replies rotate among several assistants.
    pub fn is_multi_party(&self) -> bool {
        self.is_group || !self.participant_ids.is_empty()
    }

    /// The assistant identity bound to this conversation.
    pub fn persona(&self) -> Persona {
        Persona {
            id: self.id,
            name: self.name.clone(),
            provider: self.provider,
            model: self.model_name.clone(),
            system_prompt: self.system_prompt.clone(),
            temperature: self.temperature,
        }
    }

    /// Add another conversation's persona to this arena.
    ///
    /// Re-adding an existing participant is a no-op.
    pub fn add_participant(&mut self, participant: Uuid) -> Result<(), ChatError> {
        if participant == self.id {
            return Err(ChatError::SelfParticipant(self.id));
        }
        if !self.participant_ids.contains(&participant) {
            self.participant_ids.push(participant);
        }
        Ok(())
    }

    pub fn remove_participant(&mut self, participant: &Uuid) {
        self.participant_ids.retain(|id| id != participant);
    }

    pub fn append(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Delete a message by id. Returns whether anything was removed.
    pub fn delete_message(&mut self, message_id: &Uuid) -> bool {
        let before = self.messages.len();
        self.messages.retain(|m| &m.id != message_id);
        self.messages.len() != before
    }

    pub fn is_archived(&self) -> bool {
        self.tags.contains(ARCHIVED_TAG)
    }

    pub fn archive(&mut self) {
        self.tags.insert(ARCHIVED_TAG.to_string());
    }

    pub fn unarchive(&mut self) {
        self.tags.remove(ARCHIVED_TAG);
    }
}

/// An assistant identity: who answers, with which backend and settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Persona {
    pub id: Uuid,
    pub name: String,
    pub provider: ProviderKind,
    pub model: String,
    pub system_prompt: String,
    pub temperature: f64,
}
