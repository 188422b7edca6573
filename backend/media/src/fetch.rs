//! Network download of URL-origin candidates.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};
use url::Url;
use uuid::Uuid;

use logging::redact_sensitive_data;

use crate::MediaError;
use crate::mime_detect::extension_for_mime;
use crate::transient::TransientFile;

/// Extension used when neither the URL nor the response names a type.
const UNKNOWN_EXTENSION: &str = "bin";

/// Downloads a URL into a directory and returns the written file.
///
/// The returned file's extension reflects what was fetched; the pipeline uses
/// it to decide whether the content is an image at all.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str, dest_dir: &Path) -> Result<PathBuf, MediaError>;
}

/// `reqwest`-backed fetcher with a request timeout and a body size cap.
pub struct HttpFetcher {
    client: reqwest::Client,
    max_bytes: u64,
}

impl HttpFetcher {
    pub fn new(timeout: Option<Duration>, max_bytes: u64) -> Result<Self, MediaError> {
        let mut builder =
            reqwest::Client::builder().user_agent(concat!("morejpeg/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            max_bytes,
        })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str, dest_dir: &Path) -> Result<PathBuf, MediaError> {
        let shown = redact_sensitive_data(url);
        info!(url = %shown, "Downloading");

        let mut response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(MediaError::HttpStatus {
                status: status.as_u16(),
                url: shown,
            });
        }
        if response.content_length().is_some_and(|len| len > self.max_bytes) {
            return Err(MediaError::TooLarge {
                limit: self.max_bytes,
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        let extension = extension_from_url(url)
            .or_else(|| content_type.as_deref().and_then(extension_for_mime).map(str::to_owned))
            .unwrap_or_else(|| UNKNOWN_EXTENSION.to_string());

        let dest = TransientFile::new(dest_dir.join(format!("{}.{extension}", Uuid::new_v4())));
        let mut file = tokio::fs::File::create(dest.path()).await?;
        let mut written: u64 = 0;
        while let Some(chunk) = response.chunk().await? {
            written += chunk.len() as u64;
            if written > self.max_bytes {
                return Err(MediaError::TooLarge {
                    limit: self.max_bytes,
                });
            }
            file.write_all(&chunk).await?;
        }
        file.flush().await?;

        debug!(url = %shown, bytes = written, path = %dest.path().display(), "Download complete");
        Ok(dest.keep())
    }
}

/// Lower-cased extension of the last path segment of `url`, if it has one.
pub fn extension_from_url(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let last = parsed.path_segments()?.last()?;
    let (stem, ext) = last.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() || ext.len() > 5 {
        return None;
    }
    if !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}
