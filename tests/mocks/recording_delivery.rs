//! Delivery channel that records everything instead of talking to Telegram

#![allow(dead_code)]

use async_trait::async_trait;
use mediadrop::core::AppError;
use mediadrop::download::{Delivery, MediaKind};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub struct SentMedia {
    pub kind: MediaKind,
    pub path: PathBuf,
    pub caption: String,
    /// File content as read at send time
    pub bytes: Vec<u8>,
}

#[derive(Default)]
pub struct RecordingDelivery {
    statuses: Mutex<Vec<String>>,
    sent: Mutex<Vec<SentMedia>>,
    fail_sends: bool,
    send_delay: Option<Duration>,
}

impl RecordingDelivery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every `send_media` call fails, as if Telegram rejected the upload
    pub fn failing() -> Self {
        Self {
            fail_sends: true,
            ..Self::default()
        }
    }

    /// Waits `delay` before reading the file, like a slow upload
    pub fn slow(delay: Duration) -> Self {
        Self {
            send_delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn statuses(&self) -> Vec<String> {
        self.statuses.lock().unwrap().clone()
    }

    pub fn sent(&self) -> Vec<SentMedia> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Delivery for RecordingDelivery {
    async fn status(&self, text: &str) -> Result<(), AppError> {
        self.statuses.lock().unwrap().push(text.to_string());
        Ok(())
    }

    async fn send_media(&self, kind: MediaKind, path: &Path, caption: &str) -> Result<(), AppError> {
        if self.fail_sends {
            return Err(AppError::Validation("upload rejected".to_string()));
        }
        if let Some(delay) = self.send_delay {
            tokio::time::sleep(delay).await;
        }
        let bytes = tokio::fs::read(path).await?;
        self.sent.lock().unwrap().push(SentMedia {
            kind,
            path: path.to_path_buf(),
            caption: caption.to_string(),
            bytes,
        });
        Ok(())
    }
}
