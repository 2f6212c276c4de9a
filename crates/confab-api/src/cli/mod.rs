//! CLI command definitions for the `confab` binary.
//!
//! Uses clap derive macros for argument parsing. Conversations are
//! addressed by id, unique id prefix, or name.

pub mod chat;
pub mod converse;
pub mod render;

use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use clap_complete::Shell;
use uuid::Uuid;

use confab_infra::store::ChatDocument;
use confab_types::llm::ProviderKind;

/// Talk to AI personas, one at a time or in arenas.
#[derive(Parser)]
#[command(name = "confab", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Export spans to stdout through OpenTelemetry.
    #[arg(long, global = true, env = "CONFAB_OTEL")]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a new conversation.
    New {
        #[command(subcommand)]
        resource: NewResource,
    },

    /// List conversations.
    #[command(alias = "ls")]
    List {
        /// Show archived conversations instead of active ones.
        #[arg(long)]
        archived: bool,
    },

    /// Show a conversation's settings and messages.
    Show {
        /// Conversation id, id prefix or name.
        chat: String,
    },

    /// Send a message and let the next responder answer.
    Send {
        /// Conversation id, id prefix or name.
        chat: String,

        /// Message text. Empty sends nothing and only asks for a reply.
        #[arg(default_value = "")]
        text: String,

        /// Pin the responder: a persona's conversation id/name, or "me".
        #[arg(long = "as")]
        responder: Option<String>,
    },

    /// Let an arena's assistants talk among themselves.
    Flow {
        /// Arena id, id prefix or name.
        chat: String,

        /// Number of unattended turns.
        #[arg(long, default_value = "4")]
        rounds: u32,
    },

    /// Branch a conversation at a message into a new child conversation.
    Branch {
        chat: String,

        /// Id (or unique prefix) of the last message to keep.
        message: String,
    },

    /// Copy a conversation with fresh ids.
    Duplicate { chat: String },

    /// Move a conversation under a parent, or detach it.
    Parent {
        chat: String,

        /// New parent. Omit to detach.
        parent: Option<String>,
    },

    /// Archive (soft-delete) a conversation.
    Archive {
        chat: String,

        /// Restore instead of archiving.
        #[arg(long)]
        restore: bool,
    },

    /// Permanently delete a conversation.
    #[command(alias = "rm")]
    Delete {
        chat: String,

        /// Skip the confirmation prompt.
        #[arg(long, short)]
        force: bool,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum NewResource {
    /// A direct conversation bound to a new assistant persona.
    Assistant {
        #[arg(long)]
        name: String,

        /// openai, deepseek or gemini.
        #[arg(long, value_parser = parse_provider)]
        provider: ProviderKind,

        #[arg(long)]
        model: String,

        /// Persona system prompt.
        #[arg(long, default_value = "")]
        system: String,

        #[arg(long, default_value = "0.7")]
        temperature: f64,
    },

    /// A multi-party arena rotating between existing personas.
    Arena {
        #[arg(long)]
        name: String,

        /// Participating persona (repeatable).
        #[arg(long = "participant", required = true)]
        participants: Vec<String>,

        /// Provider of the arena's own host persona.
        #[arg(long, value_parser = parse_provider, default_value = "gemini")]
        provider: ProviderKind,

        #[arg(long, default_value = "gemini-2.5-flash")]
        model: String,

        /// Host persona system prompt.
        #[arg(long, default_value = "")]
        system: String,

        #[arg(long, default_value = "0.7")]
        temperature: f64,
    },
}

fn parse_provider(s: &str) -> Result<ProviderKind, String> {
    s.parse()
}

/// Resolve a conversation reference: full id, unique id prefix, or name.
pub fn resolve_chat(document: &ChatDocument, reference: &str) -> Result<Uuid> {
    let reference = reference.trim();
    if let Ok(id) = reference.parse::<Uuid>() {
        if document.find(&id).is_some() {
            return Ok(id);
        }
        bail!("no conversation with id {id}");
    }

    let by_name: Vec<Uuid> = document
        .chats
        .iter()
        .filter(|c| c.name.eq_ignore_ascii_case(reference))
        .map(|c| c.id)
        .collect();
    if let [id] = by_name.as_slice() {
        return Ok(*id);
    }
    if by_name.len() > 1 {
        bail!("'{reference}' matches {} conversations; use an id", by_name.len());
    }

    let lowered = reference.to_lowercase();
    let by_prefix: Vec<Uuid> = document
        .chats
        .iter()
        .filter(|c| !lowered.is_empty() && c.id.to_string().starts_with(&lowered))
        .map(|c| c.id)
        .collect();
    match by_prefix.as_slice() {
        [id] => Ok(*id),
        [] => bail!("no conversation matches '{reference}'"),
        many => bail!("'{reference}' is ambiguous ({} matches)", many.len()),
    }
}
