//! Media Event Logger
//!
//! One structured event per cache mutation or degradation outcome, emitted on
//! the `media_events` target so it can be filtered into its own stream.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::redact::redact_sensitive_data;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MediaEvent {
    /// New candidates replaced whatever the chat had cached.
    Cached { origin: String, count: usize },
    /// A record was re-encoded and sent back.
    Degraded { identifier: String, quality: u8 },
    /// Every active record was already at the minimum quality.
    Exhausted,
    /// Degrade requested with nothing active.
    EmptyCache,
    /// Fetched content was not an image; record left untouched.
    Unsupported { identifier: String, mime: String },
    /// Download or codec failure.
    Failed { identifier: String, error: String },
}

#[derive(Debug, Serialize)]
pub struct EventLogEntry {
    pub chat_id: String,
    pub timestamp: DateTime<Utc>,
    pub event: MediaEvent,
}

impl EventLogEntry {
    /// Build an entry stamped now, with identifiers and error text redacted.
    pub fn new(chat_id: impl ToString, mut event: MediaEvent) -> Self {
        match &mut event {
            MediaEvent::Degraded { identifier, .. } | MediaEvent::Unsupported { identifier, .. } => {
                *identifier = redact_sensitive_data(identifier);
            }
            MediaEvent::Failed { identifier, error } => {
                *identifier = redact_sensitive_data(identifier);
                *error = redact_sensitive_data(error);
            }
            MediaEvent::Cached { .. } | MediaEvent::Exhausted | MediaEvent::EmptyCache => {}
        }

        Self {
            chat_id: chat_id.to_string(),
            timestamp: Utc::now(),
            event,
        }
    }
}

pub struct EventLogger;

impl EventLogger {
    pub fn log_event(chat_id: impl ToString, event: MediaEvent) {
        let entry = EventLogEntry::new(chat_id, event);
        info!(target: "media_events", event = ?entry, "Media event");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_event_is_redacted() {
        let entry = EventLogEntry::new(
            -42,
            MediaEvent::Failed {
                identifier: "https://me:pw@example.com/a.png".into(),
                error: "GET https://me:pw@example.com/a.png timed out".into(),
            },
        );
        assert_eq!(entry.chat_id, "-42");
        let MediaEvent::Failed { identifier, error } = &entry.event else {
            panic!("event kind changed");
        };
        assert!(!identifier.contains("pw"));
        assert!(!error.contains("pw"));
    }

    #[test]
    fn cached_event_is_untouched() {
        let entry = EventLogEntry::new(
            7,
            MediaEvent::Cached {
                origin: "url".into(),
                count: 3,
            },
        );
        assert!(matches!(entry.event, MediaEvent::Cached { count: 3, .. }));
    }
}
