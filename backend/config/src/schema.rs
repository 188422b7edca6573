//! morejpeg runtime configuration schema.
//!
//! Every field is optional on disk; [`crate::apply_all_defaults`] fills the
//! gaps after loading, and the accessor methods fall back to the same defaults.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::defaults::{
    DEFAULT_BASELINE_QUALITY, DEFAULT_DOWNLOAD_TIMEOUT_SECS, DEFAULT_LOG_LEVEL,
    DEFAULT_MAX_DOWNLOAD_BYTES, DEFAULT_TRIGGER_PHRASE, DEFAULT_TTL_SECS,
};

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoreJpegConfig {
    /// Telegram Bot API credentials
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub telegram: Option<TelegramConfig>,

    /// Chat-facing behaviour
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bot: Option<BotConfig>,

    /// Per-chat media cache
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache: Option<CacheConfig>,

    /// Download and artifact storage
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media: Option<MediaConfig>,

    /// Logging configuration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TelegramConfig {
    /// Usually `${TELEGRAM_BOT_TOKEN}`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BotConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger_phrase: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl_secs: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub baseline_quality: Option<u8>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub downloads_dir: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifacts_dir: Option<PathBuf>,
    /// 0 disables the timeout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download_timeout_secs: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_download_bytes: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggingConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
    /// JSON console output instead of human-readable lines.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub json: Option<bool>,
}

// ---------------------------------------------------------------------------
// Effective values
// ---------------------------------------------------------------------------

impl MoreJpegConfig {
    pub fn token(&self) -> Option<&str> {
        self.telegram
            .as_ref()
            .and_then(|t| t.token.as_deref())
            .filter(|t| !t.trim().is_empty())
    }

    pub fn trigger_phrase(&self) -> &str {
        self.bot
            .as_ref()
            .and_then(|b| b.trigger_phrase.as_deref())
            .unwrap_or(DEFAULT_TRIGGER_PHRASE)
    }

    pub fn ttl_secs(&self) -> u64 {
        self.cache
            .as_ref()
            .and_then(|c| c.ttl_secs)
            .unwrap_or(DEFAULT_TTL_SECS)
    }

    pub fn baseline_quality(&self) -> u8 {
        self.cache
            .as_ref()
            .and_then(|c| c.baseline_quality)
            .unwrap_or(DEFAULT_BASELINE_QUALITY)
    }

    pub fn downloads_dir(&self) -> Option<&PathBuf> {
        self.media.as_ref().and_then(|m| m.downloads_dir.as_ref())
    }

    pub fn artifacts_dir(&self) -> Option<&PathBuf> {
        self.media.as_ref().and_then(|m| m.artifacts_dir.as_ref())
    }

    /// `None` when the timeout is disabled.
    pub fn download_timeout_secs(&self) -> Option<u64> {
        let secs = self
            .media
            .as_ref()
            .and_then(|m| m.download_timeout_secs)
            .unwrap_or(DEFAULT_DOWNLOAD_TIMEOUT_SECS);
        (secs > 0).then_some(secs)
    }

    pub fn max_download_bytes(&self) -> u64 {
        self.media
            .as_ref()
            .and_then(|m| m.max_download_bytes)
            .unwrap_or(DEFAULT_MAX_DOWNLOAD_BYTES)
    }

    pub fn log_level(&self) -> &str {
        self.logging
            .as_ref()
            .and_then(|l| l.level.as_deref())
            .unwrap_or(DEFAULT_LOG_LEVEL)
    }

    pub fn log_dir(&self) -> Option<&PathBuf> {
        self.logging.as_ref().and_then(|l| l.dir.as_ref())
    }

    pub fn log_json(&self) -> bool {
        self.logging.as_ref().and_then(|l| l.json).unwrap_or(false)
    }

    /// Copy safe to print: the bot token is masked.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if let Some(token) = copy.telegram.as_mut().and_then(|t| t.token.as_mut()) {
            *token = "[REDACTED]".to_string();
        }
        copy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_camel_case_yaml() {
        let yaml = r#"
telegram:
  token: "123:abc"
bot:
  triggerPhrase: "more jpeg pls"
cache:
  ttlSecs: 60
  baselineQuality: 40
media:
  downloadTimeoutSecs: 0
"#;
        let cfg: MoreJpegConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(cfg.token(), Some("123:abc"));
        assert_eq!(cfg.trigger_phrase(), "more jpeg pls");
        assert_eq!(cfg.ttl_secs(), 60);
        assert_eq!(cfg.baseline_quality(), 40);
        assert_eq!(cfg.download_timeout_secs(), None);
    }

    #[test]
    fn accessors_fall_back_to_defaults() {
        let cfg = MoreJpegConfig::default();
        assert_eq!(cfg.token(), None);
        assert_eq!(cfg.trigger_phrase(), DEFAULT_TRIGGER_PHRASE);
        assert_eq!(cfg.ttl_secs(), DEFAULT_TTL_SECS);
        assert_eq!(cfg.download_timeout_secs(), Some(DEFAULT_DOWNLOAD_TIMEOUT_SECS));
        assert!(!cfg.log_json());
    }

    #[test]
    fn blank_token_counts_as_missing() {
        let cfg = MoreJpegConfig {
            telegram: Some(TelegramConfig {
                token: Some("  ".into()),
            }),
            ..Default::default()
        };
        assert_eq!(cfg.token(), None);
    }

    #[test]
    fn redacted_masks_token() {
        let cfg = MoreJpegConfig {
            telegram: Some(TelegramConfig {
                token: Some("123456:secret".into()),
            }),
            ..Default::default()
        };
        let shown = serde_yaml::to_string(&cfg.redacted()).unwrap();
        assert!(!shown.contains("secret"));
        assert_eq!(cfg.token(), Some("123456:secret"));
    }
}
