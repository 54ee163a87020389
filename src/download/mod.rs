//! Download management: classification, format catalog, fetching, delivery and retention

pub mod backend;
pub mod formats;
pub mod http;
pub mod media;
pub mod pipeline;
pub mod platform;
pub mod retention;
pub mod ytdlp;

// Re-exports for convenience
pub use backend::{ExtractionBackend, FetchedMedia, RawFormat};
pub use formats::{build_catalog, fetch_catalog, FormatDescriptor};
pub use http::HttpFetcher;
pub use media::MediaKind;
pub use pipeline::{Delivery, FormatSpec, Outcome, Pipeline};
pub use platform::{classify, Platform};
pub use retention::RetentionManager;
pub use ytdlp::YtDlpBackend;
