//! Telegram implementation of the pipeline's delivery channel.

use async_trait::async_trait;
use std::path::Path;
use teloxide::prelude::*;
use teloxide::types::{InputFile, MessageId};
use tokio::sync::Mutex;

use crate::core::error::AppError;
use crate::download::{Delivery, MediaKind};
use crate::telegram::Bot;

/// Delivers into one chat, using a single message as the status indicator.
///
/// Created with [`TelegramDelivery::editing`] for callbacks, so the keyboard
/// message turns into the status line; otherwise the first status is sent as a
/// new message and edited afterwards.
pub struct TelegramDelivery {
    bot: Bot,
    chat_id: ChatId,
    status_message: Mutex<Option<MessageId>>,
}

impl TelegramDelivery {
    pub fn new(bot: Bot, chat_id: ChatId) -> Self {
        Self {
            bot,
            chat_id,
            status_message: Mutex::new(None),
        }
    }

    pub fn editing(bot: Bot, chat_id: ChatId, message_id: MessageId) -> Self {
        Self {
            bot,
            chat_id,
            status_message: Mutex::new(Some(message_id)),
        }
    }
}

#[async_trait]
impl Delivery for TelegramDelivery {
    async fn status(&self, text: &str) -> Result<(), AppError> {
        let mut status_message = self.status_message.lock().await;
        match *status_message {
            Some(message_id) => {
                self.bot.edit_message_text(self.chat_id, message_id, text).await?;
            }
            None => {
                let sent = self.bot.send_message(self.chat_id, text).await?;
                *status_message = Some(sent.id);
            }
        }
        Ok(())
    }

    async fn send_media(&self, kind: MediaKind, path: &Path, caption: &str) -> Result<(), AppError> {
        let file = InputFile::file(path.to_path_buf());
        match kind {
            MediaKind::Audio => {
                self.bot.send_audio(self.chat_id, file).caption(caption).await?;
            }
            MediaKind::Video => {
                self.bot
                    .send_video(self.chat_id, file)
                    .caption(caption)
                    .supports_streaming(true)
                    .await?;
            }
            MediaKind::Image => {
                self.bot.send_photo(self.chat_id, file).caption(caption).await?;
            }
            MediaKind::Document => {
                self.bot.send_document(self.chat_id, file).caption(caption).await?;
            }
        }
        log::info!("Sent {} to chat {}", kind, self.chat_id);
        Ok(())
    }
}
