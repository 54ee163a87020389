//! Dispatcher schema and handler chain builders

use teloxide::dispatching::{UpdateFilterExt, UpdateHandler};
use teloxide::prelude::*;
use teloxide::types::Message;

use super::commands::{handle_help_command, handle_start_command};
use super::selection::{handle_selection_callback, handle_url_message};
use super::types::{sender_id, HandlerDeps, HandlerError};
use crate::telegram::admin::{
    handle_clean_command, handle_pause_command, handle_resume_command, handle_status_command, pause_gate,
};
use crate::telegram::bot::Command;
use crate::telegram::keyboard::CALLBACK_PREFIX;
use crate::telegram::Bot;

/// Creates the main dispatcher schema for the Telegram bot.
///
/// Branch order matters: the pause gate sees every message and callback first,
/// then commands, then free text, then keyboard callbacks.
pub fn schema(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    let deps_gate_message = deps.clone();
    let deps_gate_callback = deps.clone();
    let deps_commands = deps.clone();
    let deps_messages = deps.clone();
    let deps_callback = deps;

    dptree::entry()
        // Pause gate must be first
        .branch(paused_message_handler(deps_gate_message))
        .branch(paused_callback_handler(deps_gate_callback))
        .branch(command_handler(deps_commands))
        .branch(message_handler(deps_messages))
        .branch(callback_handler(deps_callback))
}

/// Swallows messages from non-admins while paused, replying with the pause notice
fn paused_message_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message()
        .filter_map_async(move |msg: Message| {
            let deps = deps.clone();
            async move { pause_gate(&deps, sender_id(&msg)).await }
        })
        .endpoint(|bot: Bot, msg: Message, notice: String| async move {
            log::info!("Paused: rejecting message from chat {}", msg.chat.id);
            bot.send_message(msg.chat.id, notice).await?;
            Ok::<(), HandlerError>(())
        })
}

/// Answers callbacks from non-admins while paused with the pause notice
fn paused_callback_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_callback_query()
        .filter_map_async(move |q: CallbackQuery| {
            let deps = deps.clone();
            async move {
                let user_id = i64::try_from(q.from.id.0).unwrap_or(0);
                pause_gate(&deps, user_id).await
            }
        })
        .endpoint(|bot: Bot, q: CallbackQuery, notice: String| async move {
            log::info!("Paused: rejecting callback from user {}", q.from.id);
            bot.answer_callback_query(q.id.clone()).text(notice).show_alert(true).await?;
            Ok::<(), HandlerError>(())
        })
}

/// Handler for bot commands (/start, /help, /status, /pause, /resume, /clean)
fn command_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message().branch(dptree::entry().filter_command::<Command>().endpoint(
        move |bot: Bot, msg: Message, cmd: Command| {
            let deps = deps.clone();
            async move {
                let user_id = sender_id(&msg);
                log::info!("⚡ Command {:?} from user {}", cmd, user_id);

                match cmd {
                    Command::Start => {
                        handle_start_command(&bot, &msg).await?;
                    }
                    Command::Help => {
                        handle_help_command(&bot, &msg, &deps).await?;
                    }
                    Command::Status => {
                        handle_status_command(&bot, msg.chat.id, user_id, &deps).await?;
                    }
                    Command::Pause(hours) => {
                        handle_pause_command(&bot, msg.chat.id, user_id, &hours, &deps).await?;
                    }
                    Command::Resume => {
                        handle_resume_command(&bot, msg.chat.id, user_id, &deps).await?;
                    }
                    Command::Clean => {
                        handle_clean_command(&bot, msg.chat.id, user_id, &deps).await?;
                    }
                }
                Ok::<(), HandlerError>(())
            }
        },
    ))
}

/// Handler for regular messages (URLs, text)
fn message_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message()
        .filter(|msg: Message| msg.text().is_some())
        .endpoint(move |bot: Bot, msg: Message| {
            let deps = deps.clone();
            async move {
                if let Err(err) = handle_url_message(bot, msg, deps).await {
                    log::error!("Error handling message: {:?}", err);
                }
                Ok(())
            }
        })
}

/// Handler for callback queries (selection keyboard)
fn callback_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_callback_query()
        .filter(|q: CallbackQuery| {
            q.data
                .as_deref()
                .map(|data| data.starts_with(CALLBACK_PREFIX))
                .unwrap_or(false)
        })
        .endpoint(move |bot: Bot, q: CallbackQuery| {
            let deps = deps.clone();
            async move { handle_selection_callback(bot, q, deps).await }
        })
}
