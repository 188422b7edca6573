//! One degradation pass: obtain bytes, re-encode at the scheduled quality, store.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, warn};

use logging::redact_sensitive_data;
use morejpeg_core::{MediaOrigin, MediaRecord};

use crate::MediaError;
use crate::codec::transcode_to_jpeg;
use crate::fetch::Fetcher;
use crate::mime_detect::{detect_mime_type, is_degradable};
use crate::store::MediaDirs;
use crate::transient::TransientFile;

/// What a pass produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessOutcome {
    /// A new artifact at the scheduled quality. The record should adopt it.
    Produced(PathBuf),
    /// The fetched content is not a degradable image. Nothing was written and
    /// the record must stay as it is.
    Unsupported { mime: &'static str },
}

/// The bytes a pass works from.
enum PassInput {
    /// Freshly downloaded; removed on every exit path.
    Downloaded(TransientFile),
    /// The record's current artifact; removed only once superseded.
    Stored(PathBuf),
}

impl PassInput {
    fn path(&self) -> &Path {
        match self {
            PassInput::Downloaded(file) => file.path(),
            PassInput::Stored(path) => path,
        }
    }

    /// Release the input after a successful pass.
    async fn consume(self) {
        match self {
            PassInput::Downloaded(file) => drop(file),
            PassInput::Stored(path) => match tokio::fs::remove_file(&path).await {
                Ok(()) => debug!(path = %path.display(), "Removed superseded artifact"),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => warn!(path = %path.display(), error = %e, "Failed to remove superseded artifact"),
            },
        }
    }
}

pub struct ImagePipeline {
    dirs: MediaDirs,
    fetcher: Arc<dyn Fetcher>,
}

impl ImagePipeline {
    pub fn new(dirs: MediaDirs, fetcher: Arc<dyn Fetcher>) -> Self {
        Self { dirs, fetcher }
    }

    pub fn dirs(&self) -> &MediaDirs {
        &self.dirs
    }

    /// Run one pass for `record` at `quality`.
    ///
    /// The record itself is not modified; on `Produced` the caller updates it.
    /// Downloads and half-written outputs never survive this call. The record's
    /// previous artifact is deleted only when a new one replaces it, so a failed
    /// pass can be retried.
    pub async fn process(
        &self,
        record: &MediaRecord,
        quality: u8,
    ) -> Result<ProcessOutcome, MediaError> {
        let input = self.obtain_input(record).await?;

        if !is_degradable(input.path()) {
            let mime = detect_mime_type(input.path());
            info!(
                identifier = %redact_sensitive_data(&record.identifier),
                mime,
                "Content is not a degradable image"
            );
            return Ok(ProcessOutcome::Unsupported { mime });
        }

        let output = TransientFile::new(self.dirs.fresh_artifact_path());
        let src = input.path().to_path_buf();
        let dst = output.path().to_path_buf();
        tokio::task::spawn_blocking(move || transcode_to_jpeg(&src, &dst, quality)).await??;

        let produced = output.keep();
        input.consume().await;
        info!(
            identifier = %redact_sensitive_data(&record.identifier),
            quality,
            path = %produced.display(),
            "Degradation pass complete"
        );
        Ok(ProcessOutcome::Produced(produced))
    }

    async fn obtain_input(&self, record: &MediaRecord) -> Result<PassInput, MediaError> {
        if let Some(path) = &record.stored_path {
            if tokio::fs::try_exists(path).await? {
                return Ok(PassInput::Stored(path.clone()));
            }
            warn!(path = %path.display(), "Stored artifact is missing");
        }
        match record.origin {
            MediaOrigin::Url => {
                let path = self
                    .fetcher
                    .fetch(&record.identifier, self.dirs.downloads())
                    .await?;
                Ok(PassInput::Downloaded(TransientFile::new(path)))
            }
            MediaOrigin::UploadedPhoto => Err(MediaError::MissingArtifact(record.identifier.clone())),
        }
    }
}
