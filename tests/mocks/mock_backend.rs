//! Mock extraction backend
//!
//! Serves a canned format list and "downloads" by writing a file of a chosen size.

#![allow(dead_code)]

use async_trait::async_trait;
use mediadrop::core::AppError;
use mediadrop::download::{ExtractionBackend, FetchedMedia, RawFormat};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// What a fetch does
#[derive(Debug, Clone)]
pub enum MockFetch {
    /// Writes `bytes` zero bytes to `output_dir/<run_id>_name`
    File { name: String, bytes: usize },
    /// Reports `output_dir/name` without creating it
    Missing { name: String },
    /// Fails with a backend error
    Fail(String),
}

impl MockFetch {
    pub fn file(name: &str, bytes: usize) -> Self {
        MockFetch::File {
            name: name.to_string(),
            bytes,
        }
    }
}

pub struct MockBackend {
    formats: Result<Vec<RawFormat>, String>,
    fetch: MockFetch,
    /// `(url, format_spec)` of every fetch call
    fetch_calls: Mutex<Vec<(String, String)>>,
    list_calls: AtomicUsize,
}

impl MockBackend {
    pub fn new(fetch: MockFetch) -> Self {
        Self {
            formats: Ok(Vec::new()),
            fetch,
            fetch_calls: Mutex::new(Vec::new()),
            list_calls: AtomicUsize::new(0),
        }
    }

    pub fn with_formats(mut self, formats: Vec<RawFormat>) -> Self {
        self.formats = Ok(formats);
        self
    }

    pub fn with_listing_error(mut self, message: &str) -> Self {
        self.formats = Err(message.to_string());
        self
    }

    pub fn fetch_calls(&self) -> Vec<(String, String)> {
        self.fetch_calls.lock().unwrap().clone()
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ExtractionBackend for MockBackend {
    fn name(&self) -> &str {
        "mock"
    }

    async fn list_formats(&self, _url: &str) -> Result<Vec<RawFormat>, AppError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.formats.clone().map_err(AppError::Backend)
    }

    async fn fetch(
        &self,
        url: &str,
        format_spec: &str,
        output_dir: &Path,
        run_id: &str,
    ) -> Result<FetchedMedia, AppError> {
        self.fetch_calls
            .lock()
            .unwrap()
            .push((url.to_string(), format_spec.to_string()));

        match &self.fetch {
            MockFetch::File { name, bytes } => {
                let path = output_dir.join(format!("{}_{}", run_id, name));
                tokio::fs::write(&path, vec![0u8; *bytes]).await?;
                Ok(FetchedMedia {
                    path,
                    title: "Mock title".to_string(),
                })
            }
            MockFetch::Missing { name } => Ok(FetchedMedia {
                path: output_dir.join(name),
                title: "Ghost".to_string(),
            }),
            MockFetch::Fail(message) => Err(AppError::Backend(message.clone())),
        }
    }
}

/// A raw record with a video track and a known size in MB
pub fn video_format(id: &str, resolution: &str, size_mb: u64) -> RawFormat {
    RawFormat {
        format_id: id.to_string(),
        resolution: Some(resolution.to_string()),
        ext: Some("mp4".to_string()),
        filesize: Some(size_mb * 1024 * 1024),
        vcodec: Some("avc1".to_string()),
        ..Default::default()
    }
}
