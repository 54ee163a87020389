use std::path::PathBuf;
use thiserror::Error;

/// Centralized error type for the application
///
/// Every fallible operation in the crate returns this enum. Pipeline code never
/// lets it reach the dispatcher: it is converted into a user-facing status message
/// at the pipeline boundary.
#[derive(Error, Debug)]
pub enum AppError {
    /// Telegram API errors
    #[error("Telegram error: {0}")]
    Telegram(#[from] teloxide::RequestError),

    /// Extraction backend (yt-dlp) errors
    #[error("Backend error: {0}")]
    Backend(String),

    /// HTTP/Fetch errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// HTTP status code errors
    #[error("HTTP request failed with status: {0}")]
    HttpStatus(reqwest::StatusCode),

    /// Download exceeded the size ceiling; carries the byte count seen so far
    #[error("file exceeds the size limit ({0} bytes)")]
    FileTooLarge(u64),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON errors (backend output)
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing errors
    #[error("URL parsing error: {0}")]
    Url(#[from] url::ParseError),

    /// Configuration errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Type alias for Result with AppError
pub type AppResult<T> = Result<T, AppError>;

/// Errors raised while loading the JSON configuration. All of them are fatal at startup.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config file {0} did not exist; a default was written, fill in the bot token and restart")]
    Created(PathBuf),

    #[error("bot token is missing or still the placeholder")]
    PlaceholderToken,

    #[error("failed to access config file {0}: {1}")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("invalid config JSON: {0}")]
    Parse(#[source] serde_json::Error),
}

impl From<String> for AppError {
    fn from(err: String) -> Self {
        AppError::Backend(err)
    }
}

impl From<&str> for AppError {
    fn from(err: &str) -> Self {
        AppError::Backend(err.to_string())
    }
}
