use std::path::Path;
use strum::Display;

/// Delivery channel for a downloaded file, chosen from its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "lowercase")]
pub enum MediaKind {
    Audio,
    Video,
    Image,
    /// Anything unrecognised goes out as a plain document
    Document,
}

impl MediaKind {
    /// Classifies by lower-cased extension. Unknown or missing extension → [`MediaKind::Document`].
    pub fn from_extension(ext: &str) -> Self {
        match ext.trim_start_matches('.').to_ascii_lowercase().as_str() {
            "mp3" | "m4a" | "aac" | "ogg" | "oga" | "opus" | "flac" | "wav" => MediaKind::Audio,
            "mp4" | "mkv" | "webm" | "mov" | "avi" | "m4v" => MediaKind::Video,
            "jpg" | "jpeg" | "png" | "gif" | "webp" => MediaKind::Image,
            _ => MediaKind::Document,
        }
    }

    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(Self::from_extension)
            .unwrap_or(MediaKind::Document)
    }
}
