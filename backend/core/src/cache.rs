//! Per-chat media cache.
//!
//! Each chat owns a small set of [`MediaRecord`]s keyed by identifier. Expiry is
//! a visibility filter: records past their TTL stay stored but are never
//! returned by [`ChatCache::active_records`], and are reclaimed on the next
//! clear or replace for that chat.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use tracing::debug;

use crate::types::{ChatId, MediaRecord};

/// Default time-to-live for cached candidates.
pub const DEFAULT_TTL_SECS: i64 = 120;

type RecordSet = BTreeMap<String, MediaRecord>;

/// Process-wide cache shared by every chat worker.
///
/// Backed by a sharded concurrent map, so inserting a new chat never blocks or
/// disturbs other chats' entries. Operations on a single chat are expected to
/// be sequenced by that chat's worker.
#[derive(Debug)]
pub struct ChatCache {
    entries: DashMap<ChatId, RecordSet>,
    ttl: Duration,
}

impl ChatCache {
    pub fn new() -> Self {
        Self::with_ttl(Duration::seconds(DEFAULT_TTL_SECS))
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Insert a record, replacing any record with the same identifier.
    ///
    /// Returns the replaced record, if any. Co-resident records are untouched.
    pub fn put(&self, chat_id: ChatId, record: MediaRecord) -> Option<MediaRecord> {
        let mut set = self.entries.entry(chat_id).or_default();
        set.insert(record.identifier.clone(), record)
    }

    /// Clear the chat's set and insert `records` in one step.
    ///
    /// Duplicate identifiers among `records` collapse to the last one given.
    /// Returns everything that was stored before, expired or not.
    pub fn replace_all(
        &self,
        chat_id: ChatId,
        records: impl IntoIterator<Item = MediaRecord>,
    ) -> Vec<MediaRecord> {
        let fresh: RecordSet = records
            .into_iter()
            .map(|r| (r.identifier.clone(), r))
            .collect();
        debug!(chat_id = %chat_id, count = fresh.len(), "Replacing cached records");
        let mut set = self.entries.entry(chat_id).or_default();
        std::mem::replace(&mut *set, fresh).into_values().collect()
    }

    /// Empty the chat's set and return what it held.
    pub fn clear(&self, chat_id: ChatId) -> Vec<MediaRecord> {
        match self.entries.get_mut(&chat_id) {
            Some(mut set) => {
                debug!(chat_id = %chat_id, count = set.len(), "Clearing cached records");
                std::mem::take(&mut *set).into_values().collect()
            }
            None => Vec::new(),
        }
    }

    /// Records of `chat_id` still within their TTL at `now`, in identifier order.
    ///
    /// Does not mutate the stored set.
    pub fn active_records(&self, chat_id: ChatId, now: DateTime<Utc>) -> Vec<MediaRecord> {
        self.entries
            .get(&chat_id)
            .map(|set| {
                set.values()
                    .filter(|r| r.is_active(now, self.ttl))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Look up one record regardless of expiry.
    pub fn get(&self, chat_id: ChatId, identifier: &str) -> Option<MediaRecord> {
        self.entries
            .get(&chat_id)
            .and_then(|set| set.get(identifier).cloned())
    }

    /// Number of stored records for a chat, including expired ones.
    pub fn stored_len(&self, chat_id: ChatId) -> usize {
        self.entries.get(&chat_id).map(|set| set.len()).unwrap_or(0)
    }

    /// Number of chats that have ever been written to.
    pub fn chat_count(&self) -> usize {
        self.entries.len()
    }
}

impl Default for ChatCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::sync::Arc;

    fn url(n: usize) -> String {
        format!("https://example.com/{n}.jpg")
    }

    #[test]
    fn put_replaces_same_identifier() {
        let cache = ChatCache::new();
        let chat = ChatId(1);
        let now = Utc::now();
        cache.put(chat, MediaRecord::from_url(url(1), now, 50));
        let mut updated = MediaRecord::from_url(url(1), now, 40);
        updated.stored_path = Some(PathBuf::from("/tmp/1.jpg"));
        let old = cache.put(chat, updated);

        assert_eq!(old.map(|r| r.quality), Some(50));
        assert_eq!(cache.stored_len(chat), 1);
        assert_eq!(cache.get(chat, &url(1)).map(|r| r.quality), Some(40));
    }

    #[test]
    fn put_keeps_co_resident_timestamps() {
        let cache = ChatCache::new();
        let chat = ChatId(1);
        let t0 = Utc::now() - Duration::seconds(60);
        cache.put(chat, MediaRecord::from_url(url(1), t0, 50));
        cache.put(chat, MediaRecord::from_url(url(2), Utc::now(), 50));
        let first = cache.get(chat, &url(1)).map(|r| r.created_at);
        assert_eq!(first, Some(chrono::SubsecRound::trunc_subsecs(t0, 0)));
    }

    #[test]
    fn ttl_boundary() {
        let cache = ChatCache::new();
        let chat = ChatId(7);
        let t = chrono::SubsecRound::trunc_subsecs(Utc::now(), 0);
        cache.put(chat, MediaRecord::from_url(url(1), t, 50));

        let ttl = cache.ttl();
        assert_eq!(cache.active_records(chat, t + ttl - Duration::seconds(1)).len(), 1);
        assert!(cache.active_records(chat, t + ttl).is_empty());
        assert!(cache.active_records(chat, t + ttl + Duration::seconds(1)).is_empty());
    }

    #[test]
    fn expiry_does_not_evict() {
        let cache = ChatCache::new();
        let chat = ChatId(7);
        let t = Utc::now();
        cache.put(chat, MediaRecord::from_url(url(1), t, 50));
        let later = t + Duration::seconds(DEFAULT_TTL_SECS + 10);
        assert!(cache.active_records(chat, later).is_empty());
        assert_eq!(cache.stored_len(chat), 1);
    }

    #[test]
    fn replace_all_leaves_only_new_candidates() {
        let cache = ChatCache::new();
        let chat = ChatId(3);
        let now = Utc::now();
        for n in 0..5 {
            cache.put(chat, MediaRecord::from_url(url(n), now, 50));
        }
        let evicted = cache.replace_all(chat, vec![MediaRecord::from_url(url(99), now, 50)]);

        assert_eq!(evicted.len(), 5);
        let active = cache.active_records(chat, now);
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].identifier, url(99));
    }

    #[test]
    fn replace_all_collapses_duplicates() {
        let cache = ChatCache::new();
        let chat = ChatId(3);
        let now = Utc::now();
        cache.replace_all(
            chat,
            vec![
                MediaRecord::from_url(url(1), now, 50),
                MediaRecord::from_url(url(1), now, 50),
                MediaRecord::from_url(url(2), now, 50),
            ],
        );
        assert_eq!(cache.stored_len(chat), 2);
    }

    #[test]
    fn clear_empties_chat() {
        let cache = ChatCache::new();
        let chat = ChatId(3);
        cache.put(chat, MediaRecord::from_url(url(1), Utc::now(), 50));
        assert_eq!(cache.clear(chat).len(), 1);
        assert_eq!(cache.stored_len(chat), 0);
        assert!(cache.clear(ChatId(404)).is_empty());
    }

    #[test]
    fn chats_are_isolated_under_interleaving() {
        let cache = Arc::new(ChatCache::new());
        let now = Utc::now();

        std::thread::scope(|s| {
            for chat in 0..8i64 {
                let cache = Arc::clone(&cache);
                s.spawn(move || {
                    for round in 0..200usize {
                        let id = format!("https://chat{chat}.example.com/{round}.png");
                        cache.replace_all(ChatId(chat), vec![MediaRecord::from_url(id, now, 50)]);
                        let active = cache.active_records(ChatId(chat), now);
                        assert_eq!(active.len(), 1);
                        assert!(active[0].identifier.contains(&format!("chat{chat}.")));
                    }
                });
            }
        });

        assert_eq!(cache.chat_count(), 8);
        for chat in 0..8i64 {
            let active = cache.active_records(ChatId(chat), now);
            assert_eq!(active.len(), 1);
            assert!(active[0].identifier.ends_with("/199.png"));
        }
    }
}
