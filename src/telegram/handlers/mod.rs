//! Telegram bot handler tree configuration
//!
//! This module provides the main dispatcher schema for the Telegram bot.

mod commands;
mod schema;
mod selection;
mod types;

pub use commands::{help_text, start_text, NO_URL_HINT};
pub use schema::schema;
pub use selection::{CANCELLED, SESSION_MISSING, STALE_KEYBOARD};
pub use types::{sender_id, HandlerDeps, HandlerError};
