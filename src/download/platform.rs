//! URL → platform classification by host name.

use strum::Display;
use url::Url;

/// Coarse platform tag deciding which flow a URL takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "snake_case")]
pub enum Platform {
    /// YouTube: quality picker with an audio-only option
    VideoHost,
    /// Twitter / X: quality picker without audio-only
    Microblog,
    Pinterest,
    Instagram,
    /// Anything else, fetched directly with the default format
    Generic,
}

impl Platform {
    /// Platforms that go through the format catalog and the quality picker
    pub fn has_format_picker(self) -> bool {
        matches!(self, Platform::VideoHost | Platform::Microblog)
    }
}

/// Ordered host fragments, first match wins.
const HOST_FRAGMENTS: &[(&str, Platform)] = &[
    ("youtube.com", Platform::VideoHost),
    ("youtu.be", Platform::VideoHost),
    ("twitter.com", Platform::Microblog),
    ("x.com", Platform::Microblog),
    ("pinterest.com", Platform::Pinterest),
    ("pin.it", Platform::Pinterest),
    ("instagram.com", Platform::Instagram),
];

fn host_matches(host: &str, fragment: &str) -> bool {
    host == fragment || host.strip_suffix(fragment).is_some_and(|rest| rest.ends_with('.'))
}

/// Classifies a raw URL string. Never fails; unknown hosts are [`Platform::Generic`].
///
/// Matching is done on the host so that `dropbox.com` is not mistaken for `x.com`.
/// Strings without a parseable host (e.g. `youtube.com/watch?v=..` with no scheme)
/// are searched as plain lower-cased text instead.
pub fn classify(raw: &str) -> Platform {
    let lowered = raw.trim().to_lowercase();

    match Url::parse(&lowered).ok().and_then(|u| u.host_str().map(str::to_string)) {
        Some(host) => HOST_FRAGMENTS
            .iter()
            .find(|(fragment, _)| host_matches(&host, fragment))
            .map(|(_, platform)| *platform)
            .unwrap_or(Platform::Generic),
        None => HOST_FRAGMENTS
            .iter()
            .find(|(fragment, _)| lowered.contains(fragment))
            .map(|(_, platform)| *platform)
            .unwrap_or(Platform::Generic),
    }
}

/// Extracts the first http(s) URL from free text, if any.
pub fn find_url(text: &str) -> Option<&str> {
    text.split_whitespace()
        .find(|word| {
            let lower = word.to_ascii_lowercase();
            lower.starts_with("http://") || lower.starts_with("https://")
        })
        .map(|word| word.trim_end_matches([')', ']', '>', ',', '.']))
}
