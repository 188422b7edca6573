//! Per-chat message handling.

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use tracing::{debug, info, warn};

use logging::{EventLogger, MediaEvent};
use media::{ImagePipeline, ProcessOutcome, TransientFile};
use morejpeg_core::{
    next_quality, BotError, ChatCache, ChatId, ChatTransport, IncomingMessage, MediaOrigin,
    MediaRecord, NextQuality, PhotoVariant, BASELINE_QUALITY, DEFAULT_TRIGGER_PHRASE,
};

use crate::classify::{classify, Intent};

#[derive(Debug, Clone)]
pub struct HandlerSettings {
    pub trigger_phrase: String,
    /// Quality assigned to every new candidate.
    pub baseline_quality: u8,
}

impl Default for HandlerSettings {
    fn default() -> Self {
        Self {
            trigger_phrase: DEFAULT_TRIGGER_PHRASE.to_string(),
            baseline_quality: BASELINE_QUALITY,
        }
    }
}

/// What handling one message amounted to.
#[derive(Debug)]
pub enum HandlerOutcome {
    /// Nothing to do for this message.
    Ignored,
    /// The chat's candidates were replaced by `count` new ones.
    Cached { count: usize },
    /// A degrade command ran over the active candidates.
    Degraded {
        sent: usize,
        unsupported: usize,
        failed: usize,
    },
    /// A degrade command hit a terminal condition; the cache was cleared.
    Rejected(BotError),
}

/// Classifies incoming messages and drives the cache and the pipeline.
///
/// One instance serves every chat. Calls for the same chat must be sequenced
/// by the caller; [`crate::SessionManager`] does that.
pub struct ChatSessionHandler {
    cache: Arc<ChatCache>,
    pipeline: Arc<ImagePipeline>,
    transport: Arc<dyn ChatTransport>,
    settings: HandlerSettings,
}

impl ChatSessionHandler {
    pub fn new(
        cache: Arc<ChatCache>,
        pipeline: Arc<ImagePipeline>,
        transport: Arc<dyn ChatTransport>,
        settings: HandlerSettings,
    ) -> Self {
        Self {
            cache,
            pipeline,
            transport,
            settings,
        }
    }

    pub fn cache(&self) -> &Arc<ChatCache> {
        &self.cache
    }

    pub async fn on_message(&self, msg: IncomingMessage) -> Result<HandlerOutcome> {
        let chat_id = msg.chat_id;
        match classify(&msg, &self.settings.trigger_phrase) {
            Intent::Photo(variant) => self.cache_photo(chat_id, variant).await,
            Intent::Urls(urls) => self.cache_urls(chat_id, urls).await,
            Intent::Degrade => self.degrade(chat_id).await,
            Intent::Ignore => Ok(HandlerOutcome::Ignored),
        }
    }

    async fn cache_photo(&self, chat_id: ChatId, variant: &PhotoVariant) -> Result<HandlerOutcome> {
        let dest = TransientFile::new(self.pipeline.dirs().fresh_artifact_path());
        self.transport
            .download_file(&variant.file_id, dest.path())
            .await
            .with_context(|| format!("Failed to download photo {}", variant.file_id))?;

        let record = MediaRecord::from_photo(
            variant.file_id.clone(),
            dest.keep(),
            Utc::now(),
            self.settings.baseline_quality,
        );
        info!(
            chat_id = %chat_id,
            width = variant.width,
            height = variant.height,
            "Cached uploaded photo"
        );
        self.replace_candidates(chat_id, vec![record], MediaOrigin::UploadedPhoto)
            .await
    }

    async fn cache_urls(&self, chat_id: ChatId, urls: Vec<String>) -> Result<HandlerOutcome> {
        let now = Utc::now();
        let records = urls
            .into_iter()
            .map(|url| MediaRecord::from_url(url, now, self.settings.baseline_quality))
            .collect();
        self.replace_candidates(chat_id, records, MediaOrigin::Url)
            .await
    }

    async fn replace_candidates(
        &self,
        chat_id: ChatId,
        records: Vec<MediaRecord>,
        origin: MediaOrigin,
    ) -> Result<HandlerOutcome> {
        let count = records.len();
        let evicted = self.cache.replace_all(chat_id, records);
        self.pipeline.dirs().discard_artifacts(&evicted).await;
        EventLogger::log_event(
            chat_id,
            MediaEvent::Cached {
                origin: origin.to_string(),
                count,
            },
        );
        Ok(HandlerOutcome::Cached { count })
    }

    async fn degrade(&self, chat_id: ChatId) -> Result<HandlerOutcome> {
        let active = self.cache.active_records(chat_id, Utc::now());
        if active.is_empty() {
            return self.reject(chat_id, BotError::EmptyCache).await;
        }

        // Produced and failed records count as advanced; failures stay retryable.
        let (mut advanced, mut sent, mut unsupported, mut failed) = (0, 0, 0, 0);
        for record in active {
            let NextQuality::Next(quality) = next_quality(record.quality) else {
                debug!(chat_id = %chat_id, quality = record.quality, "Record already at minimum quality");
                continue;
            };

            match self.pipeline.process(&record, quality).await {
                Ok(ProcessOutcome::Produced(path)) => {
                    let mut updated = record.clone();
                    updated.apply_degradation(path.clone(), quality, Utc::now());
                    self.cache.put(chat_id, updated);
                    EventLogger::log_event(
                        chat_id,
                        MediaEvent::Degraded {
                            identifier: record.identifier.clone(),
                            quality,
                        },
                    );
                    advanced += 1;
                    match self.transport.send_photo(chat_id, &path).await {
                        Ok(()) => sent += 1,
                        Err(e) => warn!(
                            chat_id = %chat_id,
                            identifier = %record.identifier,
                            error = %e,
                            "Failed to send degraded photo"
                        ),
                    }
                }
                Ok(ProcessOutcome::Unsupported { mime }) => {
                    let err = BotError::UnsupportedContent(mime.to_string());
                    debug!(chat_id = %chat_id, error = %err, "Skipping record");
                    EventLogger::log_event(
                        chat_id,
                        MediaEvent::Unsupported {
                            identifier: record.identifier.clone(),
                            mime: mime.to_string(),
                        },
                    );
                    unsupported += 1;
                }
                Err(e) => {
                    let err = BotError::PipelineFailure(e.to_string());
                    warn!(chat_id = %chat_id, error = %err, "Degradation pass failed");
                    EventLogger::log_event(
                        chat_id,
                        MediaEvent::Failed {
                            identifier: record.identifier.clone(),
                            error: e.to_string(),
                        },
                    );
                    if let Some(reply) = err.user_message() {
                        self.transport
                            .send_text(chat_id, reply)
                            .await
                            .context("Failed to send error reply")?;
                    }
                    advanced += 1;
                    failed += 1;
                }
            }
        }

        if advanced == 0 {
            return self.reject(chat_id, BotError::QualityExhausted).await;
        }
        Ok(HandlerOutcome::Degraded {
            sent,
            unsupported,
            failed,
        })
    }

    /// Clear the chat, tell the user why, and report the terminal condition.
    async fn reject(&self, chat_id: ChatId, err: BotError) -> Result<HandlerOutcome> {
        debug_assert!(err.clears_cache());
        let cleared = self.cache.clear(chat_id);
        self.pipeline.dirs().discard_artifacts(&cleared).await;

        let event = match err {
            BotError::QualityExhausted => MediaEvent::Exhausted,
            _ => MediaEvent::EmptyCache,
        };
        EventLogger::log_event(chat_id, event);
        info!(chat_id = %chat_id, reason = %err, "Degrade request rejected");

        if let Some(reply) = err.user_message() {
            self.transport
                .send_text(chat_id, reply)
                .await
                .context("Failed to send rejection reply")?;
        }
        Ok(HandlerOutcome::Rejected(err))
    }
}
