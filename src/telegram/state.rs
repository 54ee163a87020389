//! In-memory shared state: per-user sessions and the global pause switch.
//!
//! Neither survives a restart.

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use std::time::{Duration as StdDuration, Instant};
use teloxide::types::MessageId;
use tokio::sync::RwLock;

use crate::core::config;
use crate::core::error::AppError;
use crate::download::Platform;

/// Upper bound accepted by `/pause`, ten years
const MAX_PAUSE_HOURS: f64 = 24.0 * 365.0 * 10.0;

/// Last URL a user submitted, waiting for a quality selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub url: String,
    pub platform: Platform,
    /// Message carrying the keyboard offered for this URL
    pub keyboard_message: Option<MessageId>,
}

/// Result of resolving a keyboard press to a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionLookup {
    Found(Session),
    /// The user has no live session
    Missing,
    /// The user has a session, but for a newer keyboard than the one pressed
    Stale,
}

#[derive(Debug)]
struct Entry {
    session: Session,
    created_at: Instant,
}

/// Sessions keyed by Telegram user id.
#[derive(Debug)]
pub struct SessionStore {
    // Expired entries are dropped on every insert, so at most one entry per
    // user active within `ttl` is held.
    sessions: DashMap<u64, Entry>,
    ttl: StdDuration,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::with_ttl(StdDuration::from_secs(config::limits::SESSION_TTL_SECS))
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ttl(ttl: StdDuration) -> Self {
        Self {
            sessions: DashMap::new(),
            ttl,
        }
    }

    /// Stores `session` for `user_id`, replacing any previous one.
    pub fn remember(&self, user_id: u64, session: Session) {
        self.remember_at(user_id, session, Instant::now());
    }

    pub fn remember_at(&self, user_id: u64, session: Session, now: Instant) {
        let pruned = self.prune(now);
        if pruned > 0 {
            log::debug!("Dropped {} expired sessions", pruned);
        }

        let entry = Entry {
            session,
            created_at: now,
        };
        if let Some(previous) = self.sessions.insert(user_id, entry) {
            log::debug!("Session of user {} replaced (was {})", user_id, previous.session.url);
        }
    }

    /// Removes and returns the live session of `user_id`, whatever keyboard it belongs to.
    pub fn take(&self, user_id: u64) -> Option<Session> {
        let now = Instant::now();
        self.sessions
            .remove(&user_id)
            .filter(|(_, entry)| self.is_live(entry, now))
            .map(|(_, entry)| entry.session)
    }

    /// Consumes the session of `user_id` only when it was offered on `keyboard`.
    ///
    /// A press on an older keyboard leaves the newer session in place.
    pub fn take_for_keyboard(&self, user_id: u64, keyboard: MessageId) -> SessionLookup {
        let now = Instant::now();
        let removed = self.sessions.remove_if(&user_id, |_, entry| {
            entry.session.keyboard_message.is_none_or(|id| id == keyboard)
        });

        match removed {
            Some((_, entry)) if self.is_live(&entry, now) => SessionLookup::Found(entry.session),
            Some(_) => SessionLookup::Missing,
            None => match self.sessions.get(&user_id) {
                Some(entry) if self.is_live(&entry, now) => SessionLookup::Stale,
                _ => SessionLookup::Missing,
            },
        }
    }

    /// Drops sessions older than the TTL. Returns how many were removed.
    pub fn prune(&self, now: Instant) -> usize {
        let mut removed = 0;
        self.sessions.retain(|_, entry| {
            let live = now.saturating_duration_since(entry.created_at) < self.ttl;
            if !live {
                removed += 1;
            }
            live
        });
        removed
    }

    fn is_live(&self, entry: &Entry, now: Instant) -> bool {
        now.saturating_duration_since(entry.created_at) < self.ttl
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Pause {
    paused: bool,
    resume_at: Option<DateTime<Utc>>,
}

/// Process-wide pause switch toggled by admins.
#[derive(Debug, Default)]
pub struct PauseState {
    inner: RwLock<Pause>,
}

impl PauseState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pauses until `now + duration`; returns the resume time.
    pub async fn pause_until(&self, now: DateTime<Utc>, duration: Duration) -> Result<DateTime<Utc>, AppError> {
        let resume_at = now
            .checked_add_signed(duration)
            .ok_or_else(|| AppError::Validation("pause duration is out of range".to_string()))?;

        let mut pause = self.inner.write().await;
        *pause = Pause {
            paused: true,
            resume_at: Some(resume_at),
        };
        log::info!("⏸ Bot paused until {}", resume_at);
        Ok(resume_at)
    }

    /// Clears the pause unconditionally. Returns whether it was active.
    pub async fn resume(&self) -> bool {
        let mut pause = self.inner.write().await;
        let was_paused = pause.paused;
        *pause = Pause::default();
        if was_paused {
            log::info!("▶️ Bot resumed");
        }
        was_paused
    }

    /// Time left until the pause ends, `None` when not paused.
    ///
    /// An expired pause is cleared here.
    pub async fn remaining_at(&self, now: DateTime<Utc>) -> Option<Duration> {
        {
            let pause = self.inner.read().await;
            if !pause.paused {
                return None;
            }
            if let Some(resume_at) = pause.resume_at {
                if resume_at > now {
                    return Some(resume_at - now);
                }
            }
        }

        let mut pause = self.inner.write().await;
        // Another admin may have paused again between the two locks
        match pause.resume_at {
            Some(resume_at) if pause.paused && resume_at > now => Some(resume_at - now),
            _ => {
                if pause.paused {
                    log::info!("Pause expired, resuming");
                }
                *pause = Pause::default();
                None
            }
        }
    }

    pub async fn remaining(&self) -> Option<Duration> {
        self.remaining_at(Utc::now()).await
    }
}

/// Parses the `/pause` argument: a positive decimal number of hours, 1 when empty.
pub fn parse_hours(arg: &str) -> Result<f64, AppError> {
    let arg = arg.trim();
    if arg.is_empty() {
        return Ok(1.0);
    }

    let hours: f64 = arg
        .replace(',', ".")
        .parse()
        .map_err(|_| AppError::Validation(format!("'{}' is not a number of hours", arg)))?;

    if !hours.is_finite() || hours <= 0.0 || hours > MAX_PAUSE_HOURS {
        return Err(AppError::Validation(format!(
            "hours must be greater than 0 and at most {}",
            MAX_PAUSE_HOURS
        )));
    }
    Ok(hours)
}

/// Converts fractional hours into a duration, rounded to the second.
pub fn hours_to_duration(hours: f64) -> Duration {
    Duration::seconds((hours * 3600.0).round() as i64)
}
