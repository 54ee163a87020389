//! Handler types and shared dependencies

use std::sync::Arc;

use teloxide::types::Message;

use crate::core::config::BotConfig;
use crate::download::Pipeline;
use crate::telegram::state::{PauseState, SessionStore};

/// Error type for handlers
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Dependencies required by handlers
#[derive(Clone)]
pub struct HandlerDeps {
    pub config: Arc<BotConfig>,
    pub pipeline: Pipeline,
    pub sessions: Arc<SessionStore>,
    pub pause: Arc<PauseState>,
}

impl HandlerDeps {
    /// Create new handler dependencies with empty sessions and no pause
    pub fn new(config: Arc<BotConfig>, pipeline: Pipeline) -> Self {
        Self {
            config,
            pipeline,
            sessions: Arc::new(SessionStore::new()),
            pause: Arc::new(PauseState::new()),
        }
    }
}

/// Telegram user id of the message author, 0 when unknown (channel posts)
pub fn sender_id(msg: &Message) -> i64 {
    msg.from.as_ref().and_then(|u| i64::try_from(u.id.0).ok()).unwrap_or(0)
}
