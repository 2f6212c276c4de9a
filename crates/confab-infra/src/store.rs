//! JSON document store for conversations.
//!
//! The whole conversation list lives in one JSON document that is read on
//! startup and rewritten atomically (temp file + rename) on every save.
//! Settings stay in `config.toml`.

use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use confab_types::chat::{Chat, Persona};
use confab_types::error::StoreError;

/// Current on-disk document version.
pub const DOCUMENT_VERSION: u32 = 1;

/// The persisted conversation list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatDocument {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub chats: Vec<Chat>,
}

fn default_version() -> u32 {
    DOCUMENT_VERSION
}

impl Default for ChatDocument {
    fn default() -> Self {
        Self {
            version: DOCUMENT_VERSION,
            chats: Vec::new(),
        }
    }
}

impl ChatDocument {
    pub fn find(&self, id: &Uuid) -> Option<&Chat> {
        self.chats.iter().find(|c| &c.id == id)
    }

    pub fn find_mut(&mut self, id: &Uuid) -> Option<&mut Chat> {
        self.chats.iter_mut().find(|c| &c.id == id)
    }

    /// Personas of every conversation, for arena participant lookup.
    pub fn roster(&self) -> Vec<Persona> {
        self.chats.iter().map(Chat::persona).collect()
    }
}

// Older exports are a bare array of conversations.
#[derive(Deserialize)]
#[serde(untagged)]
enum OnDisk {
    Document(ChatDocument),
    Bare(Vec<Chat>),
}

/// Reads and atomically writes a [`ChatDocument`] at a fixed path.
#[derive(Debug, Clone)]
pub struct JsonDocumentStore {
    path: PathBuf,
}

impl JsonDocumentStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Load the document. A missing file is an empty document.
    pub async fn load(&self) -> Result<ChatDocument, StoreError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No chat document at {}, starting empty", self.path.display());
                return Ok(ChatDocument::default());
            }
            Err(err) => return Err(err.into()),
        };
        parse_document(&content)
    }

    /// Write the document via a temp file in the same directory, then rename.
    pub async fn save(&self, document: &ChatDocument) -> Result<(), StoreError> {
        let json = serde_json::to_vec_pretty(document)
            .map_err(|e| StoreError::Malformed(e.to_string()))?;
        let path = self.path.clone();

        tokio::task::spawn_blocking(move || write_atomic(&path, &json))
            .await
            .map_err(|e| StoreError::Io(std::io::Error::other(e)))??;

        tracing::debug!(chats = document.chats.len(), "chat document saved");
        Ok(())
    }
}

pub fn parse_document(content: &str) -> Result<ChatDocument, StoreError> {
    if content.trim().is_empty() {
        return Ok(ChatDocument::default());
    }
    match serde_json::from_str::<OnDisk>(content) {
        Ok(OnDisk::Document(document)) => Ok(document),
        Ok(OnDisk::Bare(chats)) => Ok(ChatDocument {
            version: DOCUMENT_VERSION,
            chats,
        }),
        Err(e) => Err(StoreError::Malformed(e.to_string())),
    }
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(dir)?;
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| StoreError::Io(e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use confab_types::llm::ProviderKind;
    use confab_types::message::Message;
    use tempfile::TempDir;

    fn sample_chat() -> Chat {
        let mut chat = Chat::new_assistant("Sage", ProviderKind::DeepSeek, "deepseek-chat", "Be wise.", 0.7);
        chat.append(Message::user("hello"));
        chat
    }

    #[tokio::test]
    async fn test_missing_file_loads_empty_document() {
        let tmp = TempDir::new().unwrap();
        let store = JsonDocumentStore::new(tmp.path().join("chats.json"));
        let document = store.load().await.unwrap();
        assert!(document.chats.is_empty());
        assert_eq!(document.version, DOCUMENT_VERSION);
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let tmp = TempDir::new().unwrap();
        let store = JsonDocumentStore::new(tmp.path().join("nested").join("chats.json"));
        let document = ChatDocument {
            version: DOCUMENT_VERSION,
            chats: vec![sample_chat()],
        };

        store.save(&document).await.unwrap();
        let loaded = store.load().await.unwrap();
        assert_eq!(loaded, document);
    }

    #[tokio::test]
    async fn test_save_overwrites_and_leaves_no_temp_files() {
        let tmp = TempDir::new().unwrap();
        let store = JsonDocumentStore::new(tmp.path().join("chats.json"));
        store.save(&ChatDocument::default()).await.unwrap();
        let document = ChatDocument {
            version: DOCUMENT_VERSION,
            chats: vec![sample_chat(), sample_chat()],
        };
        store.save(&document).await.unwrap();

        assert_eq!(store.load().await.unwrap().chats.len(), 2);
        let entries = std::fs::read_dir(tmp.path()).unwrap().count();
        assert_eq!(entries, 1);
    }

    #[tokio::test]
    async fn test_malformed_file_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("chats.json");
        tokio::fs::write(&path, "{not json").await.unwrap();
        let err = JsonDocumentStore::new(path).load().await.unwrap_err();
        assert!(matches!(err, StoreError::Malformed(_)));
    }

    #[test]
    fn test_bare_array_is_accepted() {
        let chat = sample_chat();
        let json = serde_json::to_string(&vec![chat.clone()]).unwrap();
        let document = parse_document(&json).unwrap();
        assert_eq!(document.chats, vec![chat]);
    }

    #[test]
    fn test_roster_and_lookup() {
        let chat = sample_chat();
        let id = chat.id;
        let mut document = ChatDocument {
            version: DOCUMENT_VERSION,
            chats: vec![chat],
        };
        assert_eq!(document.roster()[0].name, "Sage");
        assert!(document.find(&id).is_some());
        document.find_mut(&id).unwrap().archive();
        assert!(document.find(&id).unwrap().is_archived());
    }
}
