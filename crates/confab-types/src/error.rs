use thiserror::Error;
use uuid::Uuid;

/// Errors related to conversation structure and lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChatError {
    #[error("conversation {0} not found")]
    NotFound(Uuid),

    #[error("message {0} not found")]
    MessageNotFound(Uuid),

    #[error("conversation {0} cannot be its own participant")]
    SelfParticipant(Uuid),

    #[error("parent conversation {0} does not exist")]
    UnknownParent(Uuid),

    #[error("making {parent} the parent of {child} would create a cycle")]
    Cycle { child: Uuid, parent: Uuid },
}

/// Errors from the conversation document store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed document: {0}")]
    Malformed(String),
}
