//! Admin control plane: `/status`, `/pause`, `/resume`, `/clean` and the pause gate.

use chrono::{Duration, Utc};
use teloxide::prelude::*;

use crate::core::utils::{bytes_to_mb, format_remaining};
use crate::download::retention::{directory_usage, purge_directory};
use crate::telegram::handlers::HandlerDeps;
use crate::telegram::state::{hours_to_duration, parse_hours};
use crate::telegram::Bot;

/// Reply to non-admins invoking an admin command
pub const ADMIN_ONLY: &str = "⛔ Admin only.";

/// Notice shown to non-admins while paused
pub fn pause_notice(remaining: Duration) -> String {
    format!("⏸ Bot is paused. Back in {}.", format_remaining(remaining))
}

/// Returns the pause notice when `user_id` must be turned away.
///
/// Admins are never gated.
pub async fn pause_gate(deps: &HandlerDeps, user_id: i64) -> Option<String> {
    if deps.config.is_admin(user_id) {
        return None;
    }
    let remaining = deps.pause.remaining().await?;
    log::debug!("User {} gated by pause ({}s left)", user_id, remaining.num_seconds());
    Some(pause_notice(remaining))
}

/// Text of the `/status` report
pub fn status_report(file_count: usize, total_bytes: u64, limit_mb: u64, pause: Option<Duration>) -> String {
    let pause_line = match pause {
        Some(remaining) => format!("⏸ Paused, {} left", format_remaining(remaining)),
        None => "▶️ Running".to_string(),
    };
    format!(
        "📊 Status\n\nFiles: {}\nSize: {:.1} MB\nLimit: {} MB\n{}",
        file_count,
        bytes_to_mb(total_bytes),
        limit_mb,
        pause_line
    )
}

async fn ensure_admin(bot: &Bot, chat_id: ChatId, user_id: i64, deps: &HandlerDeps) -> ResponseResult<bool> {
    if deps.config.is_admin(user_id) {
        return Ok(true);
    }
    log::warn!("User {} tried to use an admin command", user_id);
    bot.send_message(chat_id, ADMIN_ONLY).await?;
    Ok(false)
}

pub async fn handle_status_command(bot: &Bot, chat_id: ChatId, user_id: i64, deps: &HandlerDeps) -> ResponseResult<()> {
    if !ensure_admin(bot, chat_id, user_id, deps).await? {
        return Ok(());
    }

    let dir = deps.pipeline.download_dir();
    let text = match directory_usage(dir).await {
        Ok((count, bytes)) => status_report(count, bytes, deps.config.max_file_size_mb, deps.pause.remaining().await),
        Err(e) => {
            log::error!("Failed to read {}: {}", dir.display(), e);
            format!("❌ Cannot read download directory: {}", e)
        }
    };
    bot.send_message(chat_id, text).await?;
    Ok(())
}

pub async fn handle_pause_command(
    bot: &Bot,
    chat_id: ChatId,
    user_id: i64,
    arg: &str,
    deps: &HandlerDeps,
) -> ResponseResult<()> {
    if !ensure_admin(bot, chat_id, user_id, deps).await? {
        return Ok(());
    }

    let hours = match parse_hours(arg) {
        Ok(hours) => hours,
        Err(e) => {
            bot.send_message(chat_id, format!("❌ {}\nUsage: /pause [hours]", e)).await?;
            return Ok(());
        }
    };

    let duration = hours_to_duration(hours);
    let text = match deps.pause.pause_until(Utc::now(), duration).await {
        Ok(resume_at) => {
            log::info!("Admin {} paused the bot for {}h", user_id, hours);
            format!(
                "⏸ Paused for {} (until {} UTC).",
                format_remaining(duration),
                resume_at.format("%Y-%m-%d %H:%M")
            )
        }
        Err(e) => format!("❌ {}", e),
    };
    bot.send_message(chat_id, text).await?;
    Ok(())
}

pub async fn handle_resume_command(bot: &Bot, chat_id: ChatId, user_id: i64, deps: &HandlerDeps) -> ResponseResult<()> {
    if !ensure_admin(bot, chat_id, user_id, deps).await? {
        return Ok(());
    }

    let was_paused = deps.pause.resume().await;
    log::info!("Admin {} resumed the bot (was paused: {})", user_id, was_paused);
    bot.send_message(chat_id, "▶️ Resumed.").await?;
    Ok(())
}

pub async fn handle_clean_command(bot: &Bot, chat_id: ChatId, user_id: i64, deps: &HandlerDeps) -> ResponseResult<()> {
    if !ensure_admin(bot, chat_id, user_id, deps).await? {
        return Ok(());
    }

    let dir = deps.pipeline.download_dir();
    let text = match purge_directory(dir).await {
        Ok(removed) => {
            log::info!("Admin {} cleaned {} ({} files)", user_id, dir.display(), removed);
            format!("🧹 Deleted {} files.", removed)
        }
        Err(e) => {
            log::error!("Failed to clean {}: {}", dir.display(), e);
            format!("❌ Cleanup failed: {}", e)
        }
    };
    bot.send_message(chat_id, text).await?;
    Ok(())
}
