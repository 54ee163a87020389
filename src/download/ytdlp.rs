//! yt-dlp powered extraction backend.
//!
//! Runs the yt-dlp binary as a child process. Format listing uses `-J` (single JSON
//! document on stdout); fetching uses `--print after_move:...` so the final title and
//! path come back on stdout once post-processing is done. No timeout is applied to
//! either call.

use crate::core::config;
use crate::core::error::AppError;
use crate::download::backend::{ExtractionBackend, FetchedMedia, RawFormat};
use async_trait::async_trait;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tokio::process::Command as TokioCommand;

/// Extraction backend driving the yt-dlp command-line tool.
pub struct YtDlpBackend {
    bin: String,
}

impl Default for YtDlpBackend {
    fn default() -> Self {
        Self::new(config::YTDL_BIN.clone())
    }
}

impl YtDlpBackend {
    pub fn new(bin: impl Into<String>) -> Self {
        Self { bin: bin.into() }
    }

    async fn run(&self, args: &[String]) -> Result<String, AppError> {
        log::debug!("yt-dlp command: {} {}", self.bin, args.join(" "));

        let output = TokioCommand::new(&self.bin)
            .args(args)
            .output()
            .await
            .map_err(|e| AppError::Backend(format!("Failed to execute {}: {}", self.bin, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AppError::Backend(summarize_stderr(&stderr)));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[async_trait]
impl ExtractionBackend for YtDlpBackend {
    fn name(&self) -> &str {
        "yt-dlp"
    }

    async fn list_formats(&self, url: &str) -> Result<Vec<RawFormat>, AppError> {
        let stdout = self.run(&list_formats_args(url)).await?;
        parse_formats_json(&stdout)
    }

    async fn fetch(
        &self,
        url: &str,
        format_spec: &str,
        output_dir: &Path,
        run_id: &str,
    ) -> Result<FetchedMedia, AppError> {
        let stdout = self.run(&fetch_args(url, format_spec, output_dir, run_id)).await?;
        parse_fetch_output(&stdout)
            .ok_or_else(|| AppError::Backend("yt-dlp did not report the downloaded file".to_string()))
    }
}

pub(crate) fn list_formats_args(url: &str) -> Vec<String> {
    ["-J", "--no-playlist", "--skip-download", "--no-warnings", url]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

pub(crate) fn fetch_args(url: &str, format_spec: &str, output_dir: &Path, run_id: &str) -> Vec<String> {
    let template = output_dir.join(format!(
        "{}_%(title).{}s.%(ext)s",
        run_id,
        config::limits::MAX_FILENAME_TITLE_CHARS
    ));

    vec![
        "-f".to_string(),
        format_spec.to_string(),
        "--no-playlist".to_string(),
        "--no-progress".to_string(),
        // Keep the download time as mtime so the retention sweep measures age from it
        "--no-mtime".to_string(),
        "-o".to_string(),
        template.to_string_lossy().into_owned(),
        "--print".to_string(),
        "after_move:title".to_string(),
        "--print".to_string(),
        "after_move:filepath".to_string(),
        url.to_string(),
    ]
}

/// Extracts the `formats` array of a `yt-dlp -J` document.
///
/// Individual records that fail to deserialize are skipped rather than failing the
/// whole listing.
pub(crate) fn parse_formats_json(stdout: &str) -> Result<Vec<RawFormat>, AppError> {
    let json: Value = serde_json::from_str(stdout.trim())?;
    let formats = match json.get("formats").and_then(|v| v.as_array()) {
        Some(formats) => formats,
        None => return Ok(Vec::new()),
    };

    Ok(formats
        .iter()
        .filter_map(|f| match serde_json::from_value::<RawFormat>(f.clone()) {
            Ok(format) => Some(format),
            Err(e) => {
                log::debug!("Skipping unparsable format record: {}", e);
                None
            }
        })
        .collect())
}

/// The last two non-empty stdout lines are the title and the final file path.
pub(crate) fn parse_fetch_output(stdout: &str) -> Option<FetchedMedia> {
    let lines: Vec<&str> = stdout.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
    let [.., title, path] = lines.as_slice() else {
        return None;
    };

    Some(FetchedMedia {
        path: PathBuf::from(*path),
        title: title.to_string(),
    })
}

/// Keeps the `ERROR:` lines of yt-dlp's stderr, or its last line when there are none.
fn summarize_stderr(stderr: &str) -> String {
    let errors: Vec<&str> = stderr
        .lines()
        .map(str::trim)
        .filter(|l| l.starts_with("ERROR:"))
        .collect();

    if !errors.is_empty() {
        return errors.join("\n");
    }

    stderr
        .lines()
        .map(str::trim)
        .rfind(|l| !l.is_empty())
        .unwrap_or("yt-dlp exited with an error")
        .to_string()
}
