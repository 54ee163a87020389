//! Telegram bot integration and handlers

pub mod admin;
pub mod bot;
pub mod delivery;
pub mod handlers;
pub mod keyboard;
pub mod state;

use teloxide::types::InlineKeyboardButton;

pub use teloxide::Bot;

// Re-exports for convenience
pub use bot::{create_bot, setup_bot_commands, Command};
pub use delivery::TelegramDelivery;
pub use handlers::{schema, HandlerDeps, HandlerError};
pub use state::{PauseState, Session, SessionLookup, SessionStore};

/// Shorthand for a callback button
pub fn cb(text: impl Into<String>, data: impl Into<String>) -> InlineKeyboardButton {
    InlineKeyboardButton::callback(text, data)
}
