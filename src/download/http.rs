//! Raw HTTP fallback for URLs the extraction backend cannot handle.
//!
//! Streams the response body straight to disk. Only used for generic links after
//! the backend gave up, e.g. a direct `.png` link.

use crate::core::config;
use crate::core::error::AppError;
use crate::core::utils::{escape_filename, unix_timestamp};
use crate::download::backend::FetchedMedia;
use crate::download::retention::remove_if_exists;
use futures_util::StreamExt;
use reqwest::{Client, Response};
use std::path::Path;
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use url::Url;

/// Direct HTTP downloader with fixed connect/read timeouts.
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self, AppError> {
        let client = Client::builder()
            .user_agent(concat!("Mozilla/5.0 (compatible; mediadrop/", env!("CARGO_PKG_VERSION"), ")"))
            .connect_timeout(config::network::fallback_connect_timeout())
            .read_timeout(config::network::fallback_read_timeout())
            .build()?;

        Ok(Self { client })
    }

    /// Downloads `url` into `output_dir` as `<run_id>_<name>`, where the name comes
    /// from the URL path.
    ///
    /// Fails with [`AppError::FileTooLarge`] as soon as the body is known to exceed
    /// `max_bytes`, either from `Content-Length` or while streaming. No partial file
    /// is left behind on any error.
    pub async fn fetch(
        &self,
        url: &str,
        output_dir: &Path,
        run_id: &str,
        max_bytes: u64,
    ) -> Result<FetchedMedia, AppError> {
        let parsed = Url::parse(url)?;
        let filename = filename_from_url(&parsed).unwrap_or_else(|| format!("file_{}", unix_timestamp()));
        let path = output_dir.join(format!("{}_{}", run_id, filename));

        log::info!("📥 HTTP fallback download: {} → {}", url, path.display());

        let response = self.client.get(parsed).send().await?;
        if !response.status().is_success() {
            return Err(AppError::HttpStatus(response.status()));
        }

        if let Some(length) = response.content_length() {
            if length > max_bytes {
                log::warn!("Refusing {}: Content-Length {} exceeds {} bytes", url, length, max_bytes);
                return Err(AppError::FileTooLarge(length));
            }
        }

        // create_new: never reuse a path another run is writing to
        let file = OpenOptions::new().write(true).create_new(true).open(&path).await?;

        let downloaded = match stream_to_file(response, file, max_bytes).await {
            Ok(downloaded) => downloaded,
            Err(e) => {
                if let Err(rm) = remove_if_exists(&path).await {
                    log::warn!("Failed to remove partial download {}: {}", path.display(), rm);
                }
                return Err(e);
            }
        };

        log::info!("✅ HTTP download complete: {} ({} bytes)", path.display(), downloaded);

        let title = Path::new(&filename)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or(filename);

        Ok(FetchedMedia { path, title })
    }
}

/// Copies the response body into `file`, stopping once more than `max_bytes` arrived.
async fn stream_to_file(response: Response, mut file: File, max_bytes: u64) -> Result<u64, AppError> {
    let mut stream = response.bytes_stream();
    let mut downloaded: u64 = 0;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        downloaded += chunk.len() as u64;
        if downloaded > max_bytes {
            return Err(AppError::FileTooLarge(downloaded));
        }
        file.write_all(&chunk).await?;
    }
    file.flush().await?;

    Ok(downloaded)
}

/// Last non-empty path segment, URL-decoded and made filesystem-safe.
pub(crate) fn filename_from_url(url: &Url) -> Option<String> {
    let segment = url
        .path_segments()
        .and_then(|mut segments| segments.rfind(|s| !s.is_empty()))?;
    let decoded = urlencoding::decode(segment)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| segment.to_string());
    escape_filename(&decoded)
}
