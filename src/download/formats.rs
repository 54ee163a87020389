//! Format catalog: the curated list of qualities offered to the user.

use crate::core::config;
use crate::core::utils::bytes_to_mb;
use crate::download::backend::{ExtractionBackend, RawFormat};
use std::cmp::Ordering;

/// One downloadable encoding, as presented to the user.
#[derive(Debug, Clone, PartialEq)]
pub struct FormatDescriptor {
    /// Opaque backend token, passed back unmodified on selection
    pub format_id: String,
    pub resolution: String,
    pub note: String,
    pub ext: String,
    pub size_mb: f64,
}

impl FormatDescriptor {
    /// Human label combining resolution and size, e.g. `1920x1080 • 50.0 MB`
    pub fn label(&self) -> String {
        format!("{} • {:.1} MB", self.resolution, self.size_mb)
    }

    /// Width parsed from the resolution label, see [`parse_width`]
    pub fn width(&self) -> Option<u32> {
        parse_width(&self.resolution)
    }
}

/// Parses a numeric width out of a resolution label.
///
/// `1920x1080` → 1920; labels without an `x` fall back to their leading digits, so
/// `720p` → 720. Returns `None` for labels such as `audio only`.
pub fn parse_width(resolution: &str) -> Option<u32> {
    let head = match resolution.split_once('x') {
        Some((width, _)) => width.trim(),
        None => resolution.trim(),
    };
    let digits: String = head.chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse().ok()
}

/// Width descending (unparseable last), then size descending.
fn rank(a: &FormatDescriptor, b: &FormatDescriptor) -> Ordering {
    let by_width = match (a.width(), b.width()) {
        (Some(wa), Some(wb)) => wb.cmp(&wa),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };
    by_width.then_with(|| b.size_mb.total_cmp(&a.size_mb))
}

/// Filters, ranks and truncates raw backend records.
///
/// Records without a known size, audio-only records and records above
/// `max_size_mb` are dropped. At most [`config::limits::MAX_CATALOG_ENTRIES`] remain.
pub fn build_catalog(raw: &[RawFormat], max_size_mb: f64) -> Vec<FormatDescriptor> {
    let mut formats: Vec<FormatDescriptor> = raw
        .iter()
        .filter(|f| !f.is_audio_only())
        .filter_map(|f| {
            let size_mb = bytes_to_mb(f.size_bytes()?);
            if size_mb > max_size_mb {
                return None;
            }
            Some(FormatDescriptor {
                format_id: f.format_id.clone(),
                resolution: f
                    .resolution
                    .clone()
                    .filter(|r| !r.is_empty())
                    .unwrap_or_else(|| "unknown".to_string()),
                note: f.format_note.clone().unwrap_or_default(),
                ext: f.ext.clone().unwrap_or_default(),
                size_mb,
            })
        })
        .collect();

    formats.sort_by(rank);
    formats.truncate(config::limits::MAX_CATALOG_ENTRIES);
    formats
}

/// Queries the backend and builds the catalog for `url`.
///
/// Any backend failure yields an empty list: callers treat that as "no curated
/// formats" and offer the generic fallbacks instead.
pub async fn fetch_catalog(backend: &dyn ExtractionBackend, url: &str, max_size_mb: u64) -> Vec<FormatDescriptor> {
    match backend.list_formats(url).await {
        Ok(raw) => {
            let catalog = build_catalog(&raw, max_size_mb as f64);
            log::info!(
                "📋 {} format(s) listed for {}, {} kept after filtering",
                raw.len(),
                url,
                catalog.len()
            );
            catalog
        }
        Err(e) => {
            log::warn!("Format listing via {} failed for {}: {}", backend.name(), url, e);
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const MB: u64 = 1024 * 1024;

    fn raw(id: &str, resolution: &str, size: Option<u64>) -> RawFormat {
        RawFormat {
            format_id: id.to_string(),
            resolution: Some(resolution.to_string()),
            ext: Some("mp4".to_string()),
            filesize: size,
            vcodec: Some("avc1".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_parse_width() {
        assert_eq!(parse_width("1920x1080"), Some(1920));
        assert_eq!(parse_width("720p"), Some(720));
        assert_eq!(parse_width("audio only"), None);
        assert_eq!(parse_width("unknown"), None);
        assert_eq!(parse_width(""), None);
    }

    #[test]
    fn test_three_qualifying_formats_in_order() {
        let catalog = build_catalog(
            &[
                raw("480", "854x480", Some(10 * MB)),
                raw("1080", "1920x1080", Some(50 * MB)),
                raw("720", "1280x720", Some(20 * MB)),
            ],
            2000.0,
        );
        let ids: Vec<&str> = catalog.iter().map(|f| f.format_id.as_str()).collect();
        assert_eq!(ids, vec!["1080", "720", "480"]);
        assert_eq!(catalog[1].size_mb, 20.0);
        assert_eq!(catalog[1].label(), "1280x720 • 20.0 MB");
    }

    #[test]
    fn test_sizeless_and_audio_only_excluded() {
        let mut audio = raw("140", "audio only", Some(3 * MB));
        audio.vcodec = Some("none".to_string());
        let catalog = build_catalog(&[raw("a", "1280x720", None), audio, raw("b", "640x360", Some(MB))], 2000.0);

        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog[0].format_id, "b");
    }

    #[test]
    fn test_filesize_approx_counts_as_size() {
        let mut approx = raw("a", "1280x720", None);
        approx.filesize_approx = Some(2 * MB);
        let catalog = build_catalog(&[approx], 2000.0);
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn test_ceiling_filters_and_is_inclusive() {
        let catalog = build_catalog(
            &[raw("big", "3840x2160", Some(60 * MB)), raw("edge", "1920x1080", Some(50 * MB))],
            50.0,
        );
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog[0].format_id, "edge");
        assert!(catalog.iter().all(|f| f.size_mb <= 50.0));
    }

    #[test]
    fn test_ties_broken_by_size_and_unparseable_last() {
        let catalog = build_catalog(
            &[
                raw("nores", "unknown", Some(90 * MB)),
                raw("small720", "1280x720", Some(10 * MB)),
                raw("big720", "1280x720", Some(30 * MB)),
            ],
            2000.0,
        );
        let ids: Vec<&str> = catalog.iter().map(|f| f.format_id.as_str()).collect();
        assert_eq!(ids, vec!["big720", "small720", "nores"]);
    }

    #[test]
    fn test_truncated_to_five_and_sorted() {
        let raw_formats: Vec<RawFormat> = (1..=9)
            .map(|i| raw(&format!("f{}", i), &format!("{}x{}", i * 100, i * 50), Some(i * MB)))
            .collect();
        let catalog = build_catalog(&raw_formats, 2000.0);

        assert_eq!(catalog.len(), 5);
        for pair in catalog.windows(2) {
            let (a, b) = (pair[0].width().unwrap_or(0), pair[1].width().unwrap_or(0));
            assert!(a > b || (a == b && pair[0].size_mb >= pair[1].size_mb));
        }
        assert_eq!(catalog[0].format_id, "f9");
    }
}
