use std::time::{SystemTime, UNIX_EPOCH};

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Converts a byte count to megabytes (1 MB = 1024² bytes).
pub fn bytes_to_mb(bytes: u64) -> f64 {
    bytes as f64 / BYTES_PER_MB
}

/// Truncates `text` to at most `max_chars` characters, appending `…` when cut.
///
/// Counts chars rather than bytes so multi-byte titles never split mid-character.
///
/// # Example
///
/// ```
/// use mediadrop::core::utils::truncate_chars;
///
/// assert_eq!(truncate_chars("hello", 10), "hello");
/// assert_eq!(truncate_chars("hello world", 6), "hello…");
/// ```
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    if max_chars == 0 {
        return String::new();
    }
    let mut out: String = text.chars().take(max_chars - 1).collect();
    out.push('…');
    out
}

/// Replaces characters that are unsafe in file names.
///
/// Path separators, characters reserved on Windows and control characters become `_`;
/// leading and trailing dots and whitespace are stripped. Returns `None` when nothing
/// usable is left.
///
/// # Example
///
/// ```
/// use mediadrop::core::utils::escape_filename;
///
/// assert_eq!(escape_filename("cat/pic*.png").as_deref(), Some("cat_pic_.png"));
/// assert_eq!(escape_filename(" .. "), None);
/// ```
pub fn escape_filename(filename: &str) -> Option<String> {
    let mut result = String::with_capacity(filename.len());

    for c in filename.chars() {
        match c {
            '/' | '\\' => result.push('_'),
            ':' | '*' | '?' | '<' | '>' | '|' | '"' => result.push('_'),
            c if c.is_control() => result.push('_'),
            _ => result.push(c),
        }
    }

    let result = result.trim_matches(|c: char| c.is_whitespace() || c == '.');
    if result.is_empty() {
        None
    } else {
        Some(result.to_string())
    }
}

/// Seconds since the Unix epoch, 0 if the clock is before it.
pub fn unix_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Formats a remaining duration as `"{h}h {m}m"`, rounding minutes up so that
/// a pause with 30 seconds left does not read as `0h 0m`.
pub fn format_remaining(remaining: chrono::Duration) -> String {
    let total_secs = remaining.num_seconds().max(0);
    let total_minutes = (total_secs + 59) / 60;
    format!("{}h {}m", total_minutes / 60, total_minutes % 60)
}
