//! Extraction backend abstraction.
//!
//! The pipeline and the format catalog only talk to [`ExtractionBackend`]; the
//! production implementation is [`crate::download::ytdlp::YtDlpBackend`], tests
//! plug in their own.

use crate::core::error::AppError;
use async_trait::async_trait;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// One format record as reported by the backend, before any filtering.
///
/// Field names follow yt-dlp's `-J` output so the struct deserializes directly.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawFormat {
    pub format_id: String,
    #[serde(default)]
    pub resolution: Option<String>,
    #[serde(default)]
    pub format_note: Option<String>,
    #[serde(default)]
    pub ext: Option<String>,
    #[serde(default, deserialize_with = "size_from_number")]
    pub filesize: Option<u64>,
    #[serde(default, deserialize_with = "size_from_number")]
    pub filesize_approx: Option<u64>,
    #[serde(default)]
    pub vcodec: Option<String>,
}

/// yt-dlp occasionally reports `filesize_approx` as a float.
fn size_from_number<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<f64>::deserialize(deserializer)?;
    Ok(value.filter(|v| v.is_finite() && *v >= 0.0).map(|v| v.round() as u64))
}

impl RawFormat {
    /// Exact size if known, otherwise the backend's estimate
    pub fn size_bytes(&self) -> Option<u64> {
        self.filesize.or(self.filesize_approx)
    }

    /// True when the record carries no video track
    pub fn is_audio_only(&self) -> bool {
        self.vcodec.as_deref() == Some("none")
    }
}

/// Result of a successful backend fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedMedia {
    /// Path the backend reports for the final file. It may not exist (e.g. a
    /// post-processor renamed it), which the pipeline reports as "file not found".
    pub path: PathBuf,
    pub title: String,
}

/// External media extraction service.
#[async_trait]
pub trait ExtractionBackend: Send + Sync {
    /// Human-readable name used in logs
    fn name(&self) -> &str;

    /// Lists the available formats for `url` without downloading anything.
    async fn list_formats(&self, url: &str) -> Result<Vec<RawFormat>, AppError>;

    /// Downloads `url` in `format_spec` into `output_dir`.
    ///
    /// `format_spec` is passed to the backend unmodified: either an opaque format id
    /// from [`list_formats`](Self::list_formats) or a selector expression such as
    /// `best[height<=720]`. The produced file name must start with `run_id` so
    /// concurrent runs sharing `output_dir` never write to the same path.
    async fn fetch(
        &self,
        url: &str,
        format_spec: &str,
        output_dir: &Path,
        run_id: &str,
    ) -> Result<FetchedMedia, AppError>;
}
