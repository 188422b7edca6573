//! Drop guard for files that must not outlive the pass that created them.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

/// Deletes the file at `path` when dropped, unless [`TransientFile::keep`] was called.
///
/// Used for downloads and for output files that are still being written, so
/// every early return or `?` removes them.
#[derive(Debug)]
pub struct TransientFile {
    path: PathBuf,
    armed: bool,
}

impl TransientFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            armed: true,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Disarm the guard and hand the path over to the caller.
    pub fn keep(mut self) -> PathBuf {
        self.armed = false;
        std::mem::take(&mut self.path)
    }
}

impl Drop for TransientFile {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!(path = %self.path.display(), "Removed transient file"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = %self.path.display(), error = %e, "Failed to remove transient file"),
        }
    }
}
