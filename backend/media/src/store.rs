//! On-disk layout: one directory for transient downloads, one for finished artifacts.

use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{debug, warn};
use uuid::Uuid;

use morejpeg_core::MediaRecord;

use crate::MediaError;

#[derive(Debug, Clone)]
pub struct MediaDirs {
    downloads: PathBuf,
    artifacts: PathBuf,
}

impl MediaDirs {
    pub fn new(downloads: impl Into<PathBuf>, artifacts: impl Into<PathBuf>) -> Self {
        Self {
            downloads: downloads.into(),
            artifacts: artifacts.into(),
        }
    }

    pub fn downloads(&self) -> &Path {
        &self.downloads
    }

    pub fn artifacts(&self) -> &Path {
        &self.artifacts
    }

    /// Create both directories if they do not exist.
    pub async fn ensure(&self) -> Result<(), MediaError> {
        fs::create_dir_all(&self.downloads).await?;
        fs::create_dir_all(&self.artifacts).await?;
        Ok(())
    }

    /// A fresh, globally unique artifact path (`<uuid>.jpg`).
    pub fn fresh_artifact_path(&self) -> PathBuf {
        self.artifacts.join(format!("{}.jpg", Uuid::new_v4()))
    }

    /// Delete the artifacts owned by records that left the cache.
    pub async fn discard_artifacts(&self, records: &[MediaRecord]) {
        for path in records.iter().filter_map(|r| r.stored_path.as_ref()) {
            match fs::remove_file(path).await {
                Ok(()) => debug!(path = %path.display(), "Discarded artifact"),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => warn!(path = %path.display(), error = %e, "Failed to discard artifact"),
            }
        }
    }
}
