//! Fetch-and-deliver pipeline.
//!
//! Transport-agnostic orchestration of a single request:
//!   status → fetch (backend, or raw HTTP for generic links) → existence check
//!   → size gate → classify → deliver → terminal status → schedule deletion
//!
//! Every run ends with exactly one terminal status message; no error escapes
//! [`Pipeline::run`] or [`Pipeline::run_generic`].

use crate::core::config;
use crate::core::error::AppError;
use crate::core::utils::{bytes_to_mb, truncate_chars};
use crate::download::backend::{ExtractionBackend, FetchedMedia};
use crate::download::http::HttpFetcher;
use crate::download::media::MediaKind;
use crate::download::retention::{remove_if_exists, RetentionManager};
use async_trait::async_trait;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use uuid::Uuid;

/// Status shown while a request is in flight
pub const IN_PROGRESS_STATUS: &str = "⏳ Downloading…";

/// Where the pipeline reports to. Implemented over Telegram in production.
#[async_trait]
pub trait Delivery: Send + Sync {
    /// Shows or updates the status indicator of this request
    async fn status(&self, text: &str) -> Result<(), AppError>;

    /// Sends the file through the channel matching `kind`
    async fn send_media(&self, kind: MediaKind, path: &Path, caption: &str) -> Result<(), AppError>;
}

/// Format requested from the backend, passed through unmodified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatSpec {
    /// Opaque format id from the catalog
    Token(String),
    /// Selector expression, e.g. `best[height<=720]`
    Expression(String),
    Best,
}

impl FormatSpec {
    pub fn as_backend_spec(&self) -> &str {
        match self {
            FormatSpec::Token(token) => token,
            FormatSpec::Expression(expr) => expr,
            FormatSpec::Best => "best",
        }
    }
}

impl fmt::Display for FormatSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_backend_spec())
    }
}

/// Terminal result of one pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Delivered { path: PathBuf, kind: MediaKind, size_mb: f64 },
    TooLarge { size_mb: f64, limit_mb: u64 },
    NotFound,
    Failed(String),
}

impl Outcome {
    /// Text of the terminal status message
    pub fn status_text(&self) -> String {
        match self {
            Outcome::Delivered { size_mb, .. } => format!("✅ Done ({:.1} MB)", size_mb),
            Outcome::TooLarge { size_mb, limit_mb } => {
                format!("❌ File too large ({:.1} MB, limit {} MB).", size_mb, limit_mb)
            }
            Outcome::NotFound => "❌ File not found.".to_string(),
            Outcome::Failed(message) => format!(
                "❌ Error: {}",
                truncate_chars(message, config::limits::MAX_ERROR_CHARS)
            ),
        }
    }
}

/// Caption attached to a delivered file
pub fn media_caption(title: &str, size_mb: f64) -> String {
    format!(
        "{} ({:.1} MB)",
        truncate_chars(title, config::limits::MAX_CAPTION_TITLE_CHARS),
        size_mb
    )
}

/// File name prefix unique to one run, so runs sharing the download directory
/// never resolve to the same path.
fn new_run_id() -> String {
    let mut id = Uuid::new_v4().simple().to_string();
    id.truncate(12);
    id
}

/// Shared, cheap-to-clone pipeline state.
#[derive(Clone)]
pub struct Pipeline {
    backend: Arc<dyn ExtractionBackend>,
    http: HttpFetcher,
    retention: RetentionManager,
    max_size_mb: u64,
}

impl Pipeline {
    pub fn new(
        backend: Arc<dyn ExtractionBackend>,
        http: HttpFetcher,
        retention: RetentionManager,
        max_size_mb: u64,
    ) -> Self {
        Self {
            backend,
            http,
            retention,
            max_size_mb,
        }
    }

    pub fn backend(&self) -> &dyn ExtractionBackend {
        self.backend.as_ref()
    }

    pub fn max_size_mb(&self) -> u64 {
        self.max_size_mb
    }

    pub fn download_dir(&self) -> &Path {
        self.retention.dir()
    }

    fn max_size_bytes(&self) -> u64 {
        self.max_size_mb.saturating_mul(1024 * 1024)
    }

    /// Fetches `url` in the user-selected `spec` and delivers it.
    pub async fn run(&self, url: &str, spec: &FormatSpec, delivery: &dyn Delivery) -> Outcome {
        self.execute(url, spec, false, delivery).await
    }

    /// Best-effort fetch for links without a quality picker, with the raw HTTP fallback.
    pub async fn run_generic(&self, url: &str, delivery: &dyn Delivery) -> Outcome {
        self.execute(url, &FormatSpec::Best, true, delivery).await
    }

    async fn execute(&self, url: &str, spec: &FormatSpec, generic: bool, delivery: &dyn Delivery) -> Outcome {
        log::info!("▶️ Pipeline start: url={} spec={} generic={}", url, spec, generic);

        if let Err(e) = delivery.status(IN_PROGRESS_STATUS).await {
            log::warn!("Failed to show progress status for {}: {}", url, e);
        }

        let outcome = match self.fetch_and_deliver(url, spec, generic, delivery).await {
            Ok(outcome) => outcome,
            Err(e) => {
                log::error!("Pipeline failed for {}: {}", url, e);
                Outcome::Failed(e.to_string())
            }
        };

        log::info!("⏹️ Pipeline end: url={} outcome={:?}", url, outcome);
        if let Err(e) = delivery.status(&outcome.status_text()).await {
            log::warn!("Failed to show terminal status for {}: {}", url, e);
        }

        outcome
    }

    async fn fetch(&self, url: &str, spec: &FormatSpec, generic: bool) -> Result<FetchedMedia, AppError> {
        let dir = self.download_dir();
        let run_id = new_run_id();
        if !generic {
            return self.backend.fetch(url, spec.as_backend_spec(), dir, &run_id).await;
        }

        match self.backend.fetch(url, spec.as_backend_spec(), dir, &run_id).await {
            Ok(media) => Ok(media),
            Err(e) => {
                log::info!(
                    "{} could not handle {} ({}), falling back to raw HTTP",
                    self.backend.name(),
                    url,
                    e
                );
                self.http.fetch(url, dir, &run_id, self.max_size_bytes()).await
            }
        }
    }

    async fn fetch_and_deliver(
        &self,
        url: &str,
        spec: &FormatSpec,
        generic: bool,
        delivery: &dyn Delivery,
    ) -> Result<Outcome, AppError> {
        let media = match self.fetch(url, spec, generic).await {
            Ok(media) => media,
            Err(AppError::FileTooLarge(bytes)) => {
                return Ok(Outcome::TooLarge {
                    size_mb: bytes_to_mb(bytes),
                    limit_mb: self.max_size_mb,
                })
            }
            Err(e) => return Err(e),
        };

        let metadata = match tokio::fs::metadata(&media.path).await {
            Ok(metadata) if metadata.is_file() => metadata,
            Ok(_) => return Ok(Outcome::NotFound),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::warn!("Downloaded file missing: {}", media.path.display());
                return Ok(Outcome::NotFound);
            }
            Err(e) => return Err(e.into()),
        };

        let size_mb = bytes_to_mb(metadata.len());
        if size_mb > self.max_size_mb as f64 {
            log::warn!(
                "File too large: {} ({:.1} MB > {} MB), deleting",
                media.path.display(),
                size_mb,
                self.max_size_mb
            );
            if let Err(e) = remove_if_exists(&media.path).await {
                log::warn!("Failed to delete oversized {}: {}", media.path.display(), e);
            }
            return Ok(Outcome::TooLarge {
                size_mb,
                limit_mb: self.max_size_mb,
            });
        }

        let kind = MediaKind::from_path(&media.path);
        let caption = media_caption(&media.title, size_mb);
        log::info!("📤 Sending {} as {} ({:.1} MB)", media.path.display(), kind, size_mb);

        let sent = delivery.send_media(kind, &media.path, &caption).await;
        self.retention.schedule(media.path.clone());
        sent?;

        Ok(Outcome::Delivered {
            path: media.path,
            kind,
            size_mb,
        })
    }
}
