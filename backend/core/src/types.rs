use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::PathBuf;

use chrono::{DateTime, Duration, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

/// Opaque key distinguishing one conversation from another.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct ChatId(pub i64);

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for ChatId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// Where a cached candidate came from, and therefore how its bytes are obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaOrigin {
    /// A link posted as text; must be fetched over the network.
    Url,
    /// A photo uploaded to the chat; already materialized on local storage.
    UploadedPhoto,
}

impl fmt::Display for MediaOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaOrigin::Url => write!(f, "url"),
            MediaOrigin::UploadedPhoto => write!(f, "uploaded_photo"),
        }
    }
}

/// One cached degradation candidate.
///
/// Identity is the `identifier` alone: two records with the same identifier are
/// the same candidate regardless of their quality or timestamps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaRecord {
    /// URL for text-origin candidates, transport file id for photos.
    pub identifier: String,
    pub origin: MediaOrigin,
    pub created_at: DateTime<Utc>,
    pub last_touched_at: DateTime<Utc>,
    /// Most recent artifact on local storage. The record owns this file.
    pub stored_path: Option<PathBuf>,
    /// Encode quality of `stored_path`; never increases.
    pub quality: u8,
}

impl MediaRecord {
    /// A candidate extracted from a text message. Nothing is on disk yet.
    pub fn from_url(url: impl Into<String>, now: DateTime<Utc>, quality: u8) -> Self {
        let now = now.trunc_subsecs(0);
        Self {
            identifier: url.into(),
            origin: MediaOrigin::Url,
            created_at: now,
            last_touched_at: now,
            stored_path: None,
            quality,
        }
    }

    /// A candidate for an uploaded photo whose original was already saved to
    /// `stored_path`. The original counts as generation 0.
    pub fn from_photo(
        file_id: impl Into<String>,
        stored_path: PathBuf,
        now: DateTime<Utc>,
        quality: u8,
    ) -> Self {
        let now = now.trunc_subsecs(0);
        Self {
            identifier: file_id.into(),
            origin: MediaOrigin::UploadedPhoto,
            created_at: now,
            last_touched_at: now,
            stored_path: Some(stored_path),
            quality,
        }
    }

    /// Whether the record is still eligible for degradation at `now`.
    pub fn is_active(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        self.created_at + ttl > now
    }

    /// Record a successful degradation pass.
    ///
    /// Returns the superseded artifact so the caller can delete it. A quality
    /// above the current one is clamped: quality never goes back up.
    pub fn apply_degradation(
        &mut self,
        new_path: PathBuf,
        quality: u8,
        now: DateTime<Utc>,
    ) -> Option<PathBuf> {
        self.quality = quality.min(self.quality);
        self.last_touched_at = now.trunc_subsecs(0);
        self.stored_path.replace(new_path)
    }
}

impl PartialEq for MediaRecord {
    fn eq(&self, other: &Self) -> bool {
        self.identifier == other.identifier
    }
}

impl Eq for MediaRecord {}

impl Hash for MediaRecord {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identifier.hash(state);
    }
}
