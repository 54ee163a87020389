//! mediadrop - Telegram bot that downloads media from links and sends it back
//!
//! # Module Structure
//!
//! - `core`: Configuration, errors, logging and small helpers
//! - `download`: Platform classification, format catalog, fetching, delivery pipeline and retention
//! - `telegram`: Telegram bot integration and handlers

pub mod core;
pub mod download;
pub mod telegram;

// Re-export commonly used types for convenience
pub use crate::core::{config, AppError, BotConfig};
pub use download::{Pipeline, RetentionManager};
pub use telegram::{schema, HandlerDeps};
