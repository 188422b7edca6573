//! Default values, applied to a freshly loaded config.

use std::path::Path;

use crate::schema::{BotConfig, CacheConfig, LoggingConfig, MediaConfig, MoreJpegConfig};

pub use morejpeg_core::DEFAULT_TRIGGER_PHRASE;

/// Seconds a cached record stays visible.
pub const DEFAULT_TTL_SECS: u64 = morejpeg_core::DEFAULT_TTL_SECS as u64;

/// Quality a fresh record starts from.
pub const DEFAULT_BASELINE_QUALITY: u8 = morejpeg_core::BASELINE_QUALITY;

pub const DEFAULT_DOWNLOAD_TIMEOUT_SECS: u64 = 30;

/// 20 MiB, the Bot API's own download ceiling.
pub const DEFAULT_MAX_DOWNLOAD_BYTES: u64 = 20 * 1024 * 1024;

pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Fill every unset field. Paths default to locations under `config_dir`.
pub fn apply_all_defaults(config: MoreJpegConfig, config_dir: &Path) -> MoreJpegConfig {
    let config = apply_bot_defaults(config);
    let config = apply_cache_defaults(config);
    let config = apply_media_defaults(config, config_dir);
    apply_logging_defaults(config, config_dir)
}

fn apply_bot_defaults(mut config: MoreJpegConfig) -> MoreJpegConfig {
    let bot = config.bot.get_or_insert_with(BotConfig::default);
    bot.trigger_phrase
        .get_or_insert_with(|| DEFAULT_TRIGGER_PHRASE.to_string());
    config
}

fn apply_cache_defaults(mut config: MoreJpegConfig) -> MoreJpegConfig {
    let cache = config.cache.get_or_insert_with(CacheConfig::default);
    cache.ttl_secs.get_or_insert(DEFAULT_TTL_SECS);
    cache.baseline_quality.get_or_insert(DEFAULT_BASELINE_QUALITY);
    config
}

fn apply_media_defaults(mut config: MoreJpegConfig, config_dir: &Path) -> MoreJpegConfig {
    let data = config_dir.join("data");
    let media = config.media.get_or_insert_with(MediaConfig::default);
    media
        .downloads_dir
        .get_or_insert_with(|| data.join("downloads"));
    media
        .artifacts_dir
        .get_or_insert_with(|| data.join("artifacts"));
    media
        .download_timeout_secs
        .get_or_insert(DEFAULT_DOWNLOAD_TIMEOUT_SECS);
    media
        .max_download_bytes
        .get_or_insert(DEFAULT_MAX_DOWNLOAD_BYTES);
    config
}

fn apply_logging_defaults(mut config: MoreJpegConfig, config_dir: &Path) -> MoreJpegConfig {
    let logging = config.logging.get_or_insert_with(LoggingConfig::default);
    logging
        .level
        .get_or_insert_with(|| DEFAULT_LOG_LEVEL.to_string());
    logging.dir.get_or_insert_with(|| config_dir.join("logs"));
    logging.json.get_or_insert(false);
    config
}
