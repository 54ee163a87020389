//! Command handler implementations (/start, /help)

use indoc::formatdoc;
use teloxide::prelude::*;
use teloxide::types::Message;

use super::types::{HandlerDeps, HandlerError};
use crate::telegram::Bot;

/// Reply to free text without a link
pub const NO_URL_HINT: &str = "🔗 Send me a link (http or https) and I'll fetch the media for you.";

pub fn start_text() -> String {
    formatdoc! {"
        👋 Hi! I download media from links.

        Send a YouTube or X/Twitter link to pick the quality, or any other link
        (Pinterest, Instagram, direct files) to get it right away.

        /help shows what is supported."}
}

pub fn help_text(max_file_size_mb: u64) -> String {
    formatdoc! {"
        ℹ️ Supported links

        • YouTube: quality picker with an audio-only option
        • X / Twitter: quality picker
        • Pinterest, Instagram: best available quality
        • Anything else: best effort, direct file links included

        Files larger than {} MB are rejected.
        Downloaded files are deleted from the server after a couple of minutes.",
        max_file_size_mb
    }
}

/// Handle /start command
pub(super) async fn handle_start_command(bot: &Bot, msg: &Message) -> Result<(), HandlerError> {
    log::info!("/start from chat {}", msg.chat.id);
    bot.send_message(msg.chat.id, start_text()).await?;
    Ok(())
}

/// Handle /help command
pub(super) async fn handle_help_command(bot: &Bot, msg: &Message, deps: &HandlerDeps) -> Result<(), HandlerError> {
    bot.send_message(msg.chat.id, help_text(deps.config.max_file_size_mb))
        .await?;
    Ok(())
}
