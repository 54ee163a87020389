//! Mock implementations shared by the integration tests
//!
//! Stand-ins for the extraction backend and the Telegram delivery channel, so the
//! pipeline can be driven end to end without yt-dlp or network access to Telegram.

pub mod mock_backend;
pub mod recording_delivery;

pub use mock_backend::{MockBackend, MockFetch};
pub use recording_delivery::RecordingDelivery;
