//! URL messages and quality selection callbacks.

use teloxide::prelude::*;
use teloxide::types::Message;

use super::commands::NO_URL_HINT;
use super::types::{HandlerDeps, HandlerError};
use crate::download::platform::find_url;
use crate::download::{classify, fetch_catalog, FormatSpec};
use crate::telegram::delivery::TelegramDelivery;
use crate::telegram::keyboard::{selection_keyboard, selection_options, SelectionChoice};
use crate::telegram::state::{Session, SessionLookup};
use crate::telegram::Bot;

/// Edited into the keyboard message when the session is gone
pub const SESSION_MISSING: &str = "❌ URL not found, please send the link again.";

/// Edited into a keyboard that was superseded by a newer link
pub const STALE_KEYBOARD: &str = "⌛ This menu is outdated, use the one for your latest link.";

/// Edited into the keyboard message on cancel
pub const CANCELLED: &str = "Cancelled.";

const CHOOSE_QUALITY: &str = "🎬 Choose quality:";

/// Handles a text message: either presents the quality picker or starts a direct download.
///
/// Network work runs in a spawned task so the dispatcher is never blocked.
pub(super) async fn handle_url_message(bot: Bot, msg: Message, deps: HandlerDeps) -> Result<(), HandlerError> {
    let Some(text) = msg.text() else {
        return Ok(());
    };
    let Some(url) = find_url(text) else {
        bot.send_message(msg.chat.id, NO_URL_HINT).await?;
        return Ok(());
    };

    let url = url.to_string();
    let platform = classify(&url);
    let chat_id = msg.chat.id;
    let user_id = msg.from.as_ref().map(|u| u.id.0);
    log::info!("📩 URL from chat {}: {} ({})", chat_id, url, platform);

    if !platform.has_format_picker() {
        tokio::spawn(async move {
            let delivery = TelegramDelivery::new(bot, chat_id);
            deps.pipeline.run_generic(&url, &delivery).await;
        });
        return Ok(());
    }

    let Some(user_id) = user_id else {
        log::warn!("URL message without sender in chat {}, skipping picker", chat_id);
        return Ok(());
    };

    tokio::spawn(async move {
        if let Err(e) = present_selection(&bot, chat_id, user_id, &url, &deps).await {
            log::error!("Failed to present formats for {}: {}", url, e);
        }
    });
    Ok(())
}

async fn present_selection(
    bot: &Bot,
    chat_id: ChatId,
    user_id: u64,
    url: &str,
    deps: &HandlerDeps,
) -> ResponseResult<()> {
    let platform = classify(url);
    let formats = fetch_catalog(deps.pipeline.backend(), url, deps.pipeline.max_size_mb()).await;
    let options = selection_options(&formats, platform);
    log::debug!("Offering {} options for {}", options.len(), url);

    let sent = bot
        .send_message(chat_id, CHOOSE_QUALITY)
        .reply_markup(selection_keyboard(&options))
        .await?;

    deps.sessions.remember(
        user_id,
        Session {
            url: url.to_string(),
            platform,
            keyboard_message: Some(sent.id),
        },
    );
    Ok(())
}

/// Handles a press on the selection keyboard.
pub(super) async fn handle_selection_callback(bot: Bot, q: CallbackQuery, deps: HandlerDeps) -> Result<(), HandlerError> {
    let Some(choice) = q.data.as_deref().and_then(SelectionChoice::parse) else {
        bot.answer_callback_query(q.id.clone()).await?;
        return Ok(());
    };

    let chat_id = q.message.as_ref().map(|m| m.chat().id);
    let message_id = q.message.as_ref().map(|m| m.id());
    let user_id = q.from.id.0;

    bot.answer_callback_query(q.id.clone()).await?;

    let (Some(chat_id), Some(message_id)) = (chat_id, message_id) else {
        log::warn!("Selection callback from user {} without a message", user_id);
        return Ok(());
    };

    let session = match deps.sessions.take_for_keyboard(user_id, message_id) {
        SessionLookup::Found(session) => session,
        SessionLookup::Missing => {
            log::warn!("No session for user {}", user_id);
            bot.edit_message_text(chat_id, message_id, SESSION_MISSING).await?;
            return Ok(());
        }
        SessionLookup::Stale => {
            log::info!("User {} pressed an outdated keyboard {}", user_id, message_id.0);
            bot.edit_message_text(chat_id, message_id, STALE_KEYBOARD).await?;
            return Ok(());
        }
    };

    let spec: FormatSpec = match choice {
        SelectionChoice::Cancel => {
            log::info!("User {} cancelled {}", user_id, session.url);
            bot.edit_message_text(chat_id, message_id, CANCELLED).await?;
            return Ok(());
        }
        SelectionChoice::Fetch(spec) => spec,
    };

    log::info!("User {} selected {} for {}", user_id, spec, session.url);
    tokio::spawn(async move {
        let delivery = TelegramDelivery::editing(bot, chat_id, message_id);
        deps.pipeline.run(&session.url, &spec, &delivery).await;
    });
    Ok(())
}
