//! Confab CLI entry point.
//!
//! Binary name: `confab`
//!
//! Parses CLI arguments, sets up tracing, loads settings and the
//! conversation store, then dispatches to the command handler.

mod cli;
mod state;

use clap::Parser;
use clap_complete::generate;

use cli::chat::PersonaArgs;
use cli::{Cli, Commands, NewResource};
use confab_observe::tracing_setup::{TracingOptions, init_tracing, shutdown_tracing};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut tracing_options = TracingOptions::from_verbosity(cli.verbose);
    if cli.quiet && cli.verbose == 0 {
        tracing_options.default_filter = "error".to_string();
    }
    tracing_options.json = cli.log_json;
    tracing_options.otel = cli.otel;
    if let Err(e) = init_tracing(&tracing_options) {
        eprintln!("warning: tracing setup failed: {e}");
    }

    // Shell completions don't need app state
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "confab", &mut std::io::stdout());
        return Ok(());
    }

    let state = AppState::init().await?;
    let result = dispatch(&state, cli).await;

    shutdown_tracing();
    result
}

async fn dispatch(state: &AppState, cli: Cli) -> anyhow::Result<()> {
    let json = cli.json;
    match cli.command {
        Commands::New { resource } => match resource {
            NewResource::Assistant {
                name,
                provider,
                model,
                system,
                temperature,
            } => {
                let persona = PersonaArgs {
                    name,
                    provider,
                    model,
                    system,
                    temperature,
                };
                cli::chat::create_assistant(state, persona, json).await
            }
            NewResource::Arena {
                name,
                participants,
                provider,
                model,
                system,
                temperature,
            } => {
                let persona = PersonaArgs {
                    name,
                    provider,
                    model,
                    system,
                    temperature,
                };
                cli::chat::create_arena(state, persona, &participants, json).await
            }
        },

        Commands::List { archived } => cli::chat::list_chats(state, archived, json).await,

        Commands::Show { chat } => cli::chat::show_chat(state, &chat, json).await,

        Commands::Send {
            chat,
            text,
            responder,
        } => cli::converse::send_message(state, &chat, &text, responder.as_deref(), json).await,

        Commands::Flow { chat, rounds } => cli::converse::run_flow(state, &chat, rounds, json).await,

        Commands::Branch { chat, message } => {
            cli::chat::branch_chat(state, &chat, &message, json).await
        }

        Commands::Duplicate { chat } => cli::chat::duplicate_chat(state, &chat, json).await,

        Commands::Parent { chat, parent } => {
            cli::chat::reparent_chat(state, &chat, parent.as_deref(), json).await
        }

        Commands::Archive { chat, restore } => {
            cli::chat::archive_chat(state, &chat, restore, json).await
        }

        Commands::Delete { chat, force } => cli::chat::delete_chat(state, &chat, force, json).await,

        // Handled before state initialization
        Commands::Completions { .. } => Ok(()),
    }
}
