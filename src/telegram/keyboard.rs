//! Quality selection keyboard and its callback data.
//!
//! Callback data layout:
//! - `sel:f:<format_id>`: a catalog entry, token passed through to the backend
//! - `sel:x:<expr>`: a selector expression (audio-only and the fallbacks)
//! - `sel:cancel`

use teloxide::types::InlineKeyboardMarkup;

use crate::core::config;
use crate::core::utils::truncate_chars;
use crate::download::{FormatDescriptor, FormatSpec, Platform};

/// Prefix shared by every selection callback
pub const CALLBACK_PREFIX: &str = "sel:";

/// Telegram rejects callback data longer than this
pub const CALLBACK_DATA_LIMIT: usize = 64;

/// Selector for the audio-only option
pub const AUDIO_ONLY_SPEC: &str = "bestaudio[ext=m4a]/bestaudio";

const CANCEL_DATA: &str = "sel:cancel";

/// What pressing a selection button asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionChoice {
    Fetch(FormatSpec),
    Cancel,
}

impl SelectionChoice {
    pub fn callback_data(&self) -> String {
        match self {
            SelectionChoice::Cancel => CANCEL_DATA.to_string(),
            SelectionChoice::Fetch(FormatSpec::Token(id)) => format!("{}f:{}", CALLBACK_PREFIX, id),
            SelectionChoice::Fetch(spec) => format!("{}x:{}", CALLBACK_PREFIX, spec.as_backend_spec()),
        }
    }

    /// Inverse of [`SelectionChoice::callback_data`]; `None` for foreign or malformed data.
    pub fn parse(data: &str) -> Option<Self> {
        let rest = data.strip_prefix(CALLBACK_PREFIX)?;
        if rest == "cancel" {
            return Some(SelectionChoice::Cancel);
        }

        let (kind, value) = rest.split_once(':')?;
        if value.is_empty() {
            return None;
        }
        let spec = match kind {
            "f" => FormatSpec::Token(value.to_string()),
            "x" if value == "best" => FormatSpec::Best,
            "x" => FormatSpec::Expression(value.to_string()),
            _ => return None,
        };
        Some(SelectionChoice::Fetch(spec))
    }
}

/// One button of the selection keyboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionOption {
    pub label: String,
    pub choice: SelectionChoice,
}

impl SelectionOption {
    fn new(label: impl Into<String>, choice: SelectionChoice) -> Self {
        Self {
            label: label.into(),
            choice,
        }
    }
}

/// Builds the ordered option list for `formats` of a URL on `platform`.
///
/// With an empty catalog the user still gets best / ≤720p / ≤480p, so a failed
/// format listing never blocks a download.
pub fn selection_options(formats: &[FormatDescriptor], platform: Platform) -> Vec<SelectionOption> {
    let mut options: Vec<SelectionOption> = Vec::with_capacity(formats.len() + 2);

    if formats.is_empty() {
        options.push(SelectionOption::new(
            "🏆 Best quality",
            SelectionChoice::Fetch(FormatSpec::Best),
        ));
        options.push(SelectionOption::new(
            "📺 720p",
            SelectionChoice::Fetch(FormatSpec::Expression("best[height<=720]".to_string())),
        ));
        options.push(SelectionOption::new(
            "📱 480p",
            SelectionChoice::Fetch(FormatSpec::Expression("best[height<=480]".to_string())),
        ));
    } else {
        options.extend(formats.iter().map(|format| {
            SelectionOption::new(
                truncate_chars(&format.label(), config::limits::MAX_BUTTON_LABEL_CHARS),
                SelectionChoice::Fetch(FormatSpec::Token(format.format_id.clone())),
            )
        }));
        if platform == Platform::VideoHost {
            options.push(SelectionOption::new(
                "🎵 Audio only",
                SelectionChoice::Fetch(FormatSpec::Expression(AUDIO_ONLY_SPEC.to_string())),
            ));
        }
    }

    options.push(SelectionOption::new("❌ Cancel", SelectionChoice::Cancel));
    options
}

/// Renders options one per row. Options whose callback data exceeds Telegram's limit are skipped.
pub fn selection_keyboard(options: &[SelectionOption]) -> InlineKeyboardMarkup {
    let rows: Vec<_> = options
        .iter()
        .filter_map(|option| {
            let data = option.choice.callback_data();
            if data.len() > CALLBACK_DATA_LIMIT {
                log::warn!(
                    "Dropping option '{}': callback data is {} bytes (limit {})",
                    option.label,
                    data.len(),
                    CALLBACK_DATA_LIMIT
                );
                return None;
            }
            Some(vec![crate::telegram::cb(option.label.clone(), data)])
        })
        .collect();

    InlineKeyboardMarkup::new(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use teloxide::types::InlineKeyboardButtonKind;

    fn descriptor(id: &str, resolution: &str, size_mb: f64) -> FormatDescriptor {
        FormatDescriptor {
            format_id: id.to_string(),
            resolution: resolution.to_string(),
            note: String::new(),
            ext: "mp4".to_string(),
            size_mb,
        }
    }

    #[test]
    fn test_empty_catalog_gets_fallbacks() {
        let options = selection_options(&[], Platform::VideoHost);
        let choices: Vec<_> = options.iter().map(|o| o.choice.clone()).collect();

        assert_eq!(
            choices,
            vec![
                SelectionChoice::Fetch(FormatSpec::Best),
                SelectionChoice::Fetch(FormatSpec::Expression("best[height<=720]".into())),
                SelectionChoice::Fetch(FormatSpec::Expression("best[height<=480]".into())),
                SelectionChoice::Cancel,
            ]
        );
    }

    #[test]
    fn test_audio_only_for_video_host() {
        let formats = vec![descriptor("137", "1920x1080", 50.0), descriptor("22", "1280x720", 20.0)];

        let video = selection_options(&formats, Platform::VideoHost);
        assert_eq!(video.len(), 4);
        assert_eq!(video[0].label, "1920x1080 • 50.0 MB");
        assert_eq!(video[2].label, "🎵 Audio only");
        assert_eq!(video[3].choice, SelectionChoice::Cancel);

        let microblog = selection_options(&formats, Platform::Microblog);
        assert_eq!(microblog.len(), 3);
        assert!(microblog.iter().all(|o| o.label != "🎵 Audio only"));
    }

    #[test]
    fn test_long_label_is_truncated() {
        let formats = vec![descriptor("1", &"9".repeat(60), 1.0)];
        let options = selection_options(&formats, Platform::Microblog);
        assert!(options[0].label.chars().count() <= config::limits::MAX_BUTTON_LABEL_CHARS);
        assert!(options[0].label.ends_with('…'));
    }

    #[test]
    fn test_callback_data_parse() {
        for choice in [
            SelectionChoice::Cancel,
            SelectionChoice::Fetch(FormatSpec::Best),
            SelectionChoice::Fetch(FormatSpec::Token("hls-1080p".into())),
            SelectionChoice::Fetch(FormatSpec::Expression(AUDIO_ONLY_SPEC.into())),
        ] {
            assert_eq!(SelectionChoice::parse(&choice.callback_data()), Some(choice));
        }

        assert_eq!(SelectionChoice::parse("dl:mp3:abc"), None);
        assert_eq!(SelectionChoice::parse("sel:f:"), None);
        assert_eq!(SelectionChoice::parse("sel:z:1"), None);
    }

    #[test]
    fn test_keyboard_skips_oversized_data() {
        let formats = vec![descriptor(&"a".repeat(80), "1280x720", 5.0), descriptor("18", "640x360", 2.0)];
        let options = selection_options(&formats, Platform::Microblog);
        let keyboard = selection_keyboard(&options);

        assert_eq!(keyboard.inline_keyboard.len(), 2);
        let data: Vec<_> = keyboard
            .inline_keyboard
            .iter()
            .flatten()
            .map(|button| match &button.kind {
                InlineKeyboardButtonKind::CallbackData(data) => data.clone(),
                other => panic!("unexpected button kind {:?}", other),
            })
            .collect();
        assert_eq!(data, vec!["sel:f:18".to_string(), "sel:cancel".to_string()]);
    }
}
