use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::core::error::ConfigError;

/// Process-level knobs, read once from the environment.
/// Cached yt-dlp binary path
/// Read once at startup from YTDL_BIN environment variable or defaults to "yt-dlp"
pub static YTDL_BIN: Lazy<String> = Lazy::new(|| env::var("YTDL_BIN").unwrap_or_else(|_| "yt-dlp".to_string()));

/// Path of the JSON configuration file
/// Read from CONFIG_PATH environment variable
/// Default: config.json
pub static CONFIG_PATH: Lazy<String> = Lazy::new(|| env::var("CONFIG_PATH").unwrap_or_else(|_| "config.json".to_string()));

/// Log file path
/// Read from LOG_FILE_PATH environment variable
/// Default: mediadrop.log
pub static LOG_FILE_PATH: Lazy<String> =
    Lazy::new(|| env::var("LOG_FILE_PATH").unwrap_or_else(|_| "mediadrop.log".to_string()));

/// Custom Bot API server (e.g. a local telegram-bot-api instance that lifts the 50 MB upload cap)
pub static BOT_API_URL: Lazy<Option<String>> = Lazy::new(|| env::var("BOT_API_URL").ok());

/// Token written into a freshly generated config file. The bot refuses to start with it.
pub const PLACEHOLDER_TOKEN: &str = "YOUR_BOT_TOKEN_HERE";

/// Retention configuration
pub mod retention {
    use super::Duration;

    /// Age after which a downloaded file is deleted (in seconds)
    pub const DELETE_DELAY_SECS: u64 = 120;

    /// Interval between sweeps of the download directory (in seconds)
    pub const SWEEP_INTERVAL_SECS: u64 = 60;

    /// Deferred deletion delay
    pub fn delete_delay() -> Duration {
        Duration::from_secs(DELETE_DELAY_SECS)
    }

    /// Sweep interval duration
    pub fn sweep_interval() -> Duration {
        Duration::from_secs(SWEEP_INTERVAL_SECS)
    }
}

/// Network configuration
pub mod network {
    use super::Duration;

    /// Request timeout for Bot API calls (in seconds)
    /// Large uploads through a local Bot API server can take a while
    pub const REQUEST_TIMEOUT_SECS: u64 = 900;

    /// Connect timeout for the raw HTTP fallback (in seconds)
    pub const FALLBACK_CONNECT_TIMEOUT_SECS: u64 = 30;

    /// Per-read timeout for the raw HTTP fallback (in seconds)
    pub const FALLBACK_READ_TIMEOUT_SECS: u64 = 30;

    pub fn timeout() -> Duration {
        Duration::from_secs(REQUEST_TIMEOUT_SECS)
    }

    pub fn fallback_connect_timeout() -> Duration {
        Duration::from_secs(FALLBACK_CONNECT_TIMEOUT_SECS)
    }

    pub fn fallback_read_timeout() -> Duration {
        Duration::from_secs(FALLBACK_READ_TIMEOUT_SECS)
    }
}

/// Limits applied to catalog, captions and status messages
pub mod limits {
    /// Maximum number of formats offered to the user
    pub const MAX_CATALOG_ENTRIES: usize = 5;

    /// Maximum display width of a format button label
    pub const MAX_BUTTON_LABEL_CHARS: usize = 40;

    /// Maximum length of the title part of a caption
    pub const MAX_CAPTION_TITLE_CHARS: usize = 100;

    /// Maximum length of an error message shown to the user
    pub const MAX_ERROR_CHARS: usize = 200;

    /// Maximum number of characters of the title used in the output filename
    pub const MAX_FILENAME_TITLE_CHARS: usize = 50;

    /// How long a pending quality selection stays valid (in seconds)
    pub const SESSION_TTL_SECS: u64 = 24 * 60 * 60;
}

fn default_max_file_size_mb() -> u64 {
    2000
}

fn default_download_dir() -> PathBuf {
    PathBuf::from("downloads")
}

/// Bot configuration persisted as JSON.
///
/// ```json
/// {
///   "token": "123:abc",
///   "admin_ids": [12345],
///   "max_file_size_mb": 2000,
///   "download_dir": "downloads"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BotConfig {
    pub token: String,
    #[serde(default)]
    pub admin_ids: Vec<i64>,
    #[serde(default = "default_max_file_size_mb")]
    pub max_file_size_mb: u64,
    #[serde(default = "default_download_dir")]
    pub download_dir: PathBuf,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            token: PLACEHOLDER_TOKEN.to_string(),
            admin_ids: Vec::new(),
            max_file_size_mb: default_max_file_size_mb(),
            download_dir: default_download_dir(),
        }
    }
}

impl BotConfig {
    /// Loads the configuration from `path`.
    ///
    /// When the file does not exist a default one is written in its place and
    /// [`ConfigError::Created`] is returned, so the operator can fill in the token.
    /// A placeholder or empty token is rejected with [`ConfigError::PlaceholderToken`].
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            let default = Self::default();
            let json = serde_json::to_string_pretty(&default).map_err(ConfigError::Parse)?;
            std::fs::write(path, json).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
            log::warn!("Config file {} not found, wrote a default one", path.display());
            return Err(ConfigError::Created(path.to_path_buf()));
        }

        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        let config: Self = serde_json::from_str(&raw).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let token = self.token.trim();
        if token.is_empty() || token == PLACEHOLDER_TOKEN {
            return Err(ConfigError::PlaceholderToken);
        }
        Ok(())
    }

    /// Whether `user_id` is on the admin allow-list
    pub fn is_admin(&self, user_id: i64) -> bool {
        self.admin_ids.contains(&user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[test]
    fn test_missing_config_writes_default_and_refuses() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");

        let err = BotConfig::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Created(_)));
        assert!(path.exists());

        // The generated file still carries the placeholder
        let err = BotConfig::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::PlaceholderToken));
    }

    #[test]
    fn test_load_applies_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"token": "123:abc", "admin_ids": [42]}"#).unwrap();

        let config = BotConfig::load(&path).unwrap();
        assert_eq!(config.token, "123:abc");
        assert_eq!(config.admin_ids, vec![42]);
        assert_eq!(config.max_file_size_mb, 2000);
        assert_eq!(config.download_dir, PathBuf::from("downloads"));
        assert!(config.is_admin(42));
        assert!(!config.is_admin(7));
    }

    #[test]
    fn test_empty_token_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"token": "  "}"#).unwrap();

        assert!(matches!(
            BotConfig::load(&path).unwrap_err(),
            ConfigError::PlaceholderToken
        ));
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();

        assert!(matches!(BotConfig::load(&path).unwrap_err(), ConfigError::Parse(_)));
    }
}
