//! Fetch, transcode, and store pipeline for degradation passes.

use thiserror::Error;

pub mod codec;
pub mod fetch;
pub mod mime_detect;
pub mod pipeline;
pub mod store;
pub mod transient;

pub use codec::transcode_to_jpeg;
pub use fetch::{Fetcher, HttpFetcher};
pub use mime_detect::{detect_mime_type, extension_for_mime, is_degradable};
pub use pipeline::{ImagePipeline, ProcessOutcome};
pub use store::MediaDirs;
pub use transient::TransientFile;

/// Errors raised while obtaining or transcoding an image.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("download failed: {0}")]
    Download(#[from] reqwest::Error),

    #[error("download of {url} returned HTTP {status}")]
    HttpStatus { status: u16, url: String },

    #[error("download exceeds the {limit} byte limit")]
    TooLarge { limit: u64 },

    #[error("no stored artifact for {0}")]
    MissingArtifact(String),

    #[error("image codec error: {0}")]
    Codec(#[from] image::ImageError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("codec task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}
