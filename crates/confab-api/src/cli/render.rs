//! Terminal rendering for conversations and messages.

use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;

use confab_types::chat::Chat;
use confab_types::message::{Message, Sender};

/// Print one message as a styled block.
pub fn print_message(message: &Message) {
    let time = message.timestamp.format("%H:%M");
    match message.sender {
        Sender::User => {
            println!("  {} {}", style("You").green().bold(), style(time).dim());
        }
        Sender::Assistant => {
            let author = message.author_name.as_deref().unwrap_or("Assistant");
            println!("  {} {}", style(author).cyan().bold(), style(time).dim());
        }
        Sender::System if message.is_error => {
            println!("  {} {}", style("✗").red().bold(), style(&message.text).red());
            println!();
            return;
        }
        Sender::System => {
            println!("  {} {}", style("ℹ").blue(), style(&message.text).dim());
            println!();
            return;
        }
    }
    for line in message.text.lines() {
        println!("    {line}");
    }
    println!();
}

/// One-line kind label for a conversation.
pub fn kind_label(chat: &Chat) -> &'static str {
    if chat.is_multi_party() { "arena" } else { "direct" }
}

/// Conversation list as a table.
pub fn chat_table(chats: &[&Chat]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Name").fg(Color::Cyan),
            Cell::new("Kind").fg(Color::Cyan),
            Cell::new("Provider").fg(Color::Cyan),
            Cell::new("Model").fg(Color::Cyan),
            Cell::new("Messages").fg(Color::Cyan),
            Cell::new("Id").fg(Color::Cyan),
        ]);

    for chat in chats {
        let kind_color = if chat.is_multi_party() {
            Color::Magenta
        } else {
            Color::White
        };
        table.add_row(vec![
            Cell::new(&chat.name),
            Cell::new(kind_label(chat)).fg(kind_color),
            Cell::new(chat.provider.to_string()),
            Cell::new(&chat.model_name),
            Cell::new(chat.messages.len()),
            Cell::new(short_id(chat)).fg(Color::DarkGrey),
        ]);
    }
    table
}

/// First segment of the id; enough to address a conversation.
pub fn short_id(chat: &Chat) -> String {
    chat.id.to_string().chars().take(13).collect()
}
