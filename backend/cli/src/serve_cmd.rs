//! `morejpeg serve`: wire config, logging, media storage and Telegram together.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use tracing::info;

use media::{HttpFetcher, ImagePipeline, MediaDirs};
use morejpeg_channels::{Bot, ChannelAdapter, TelegramAdapter, TelegramTransport};
use morejpeg_core::ChatCache;
use morejpeg_session::{ChatSessionHandler, HandlerSettings, SessionManager};

pub async fn run(config_path: &Path) -> Result<()> {
    let config = morejpeg_config::load_and_prepare(config_path).await?;

    let report = morejpeg_config::validate(&config);
    if !report.is_valid() {
        let problems: Vec<String> = report.errors.iter().map(ToString::to_string).collect();
        bail!("Refusing to start:\n  {}", problems.join("\n  "));
    }
    let token = config
        .token()
        .context("telegram.token is not set")?
        .to_string();

    let log_dir = config.log_dir().context("logging.dir is not set")?;
    std::fs::create_dir_all(log_dir)
        .with_context(|| format!("Failed to create log directory: {}", log_dir.display()))?;
    logging::init_logger(log_dir, config.log_level(), config.log_json());

    let dirs = MediaDirs::new(
        config.downloads_dir().context("media.downloadsDir is not set")?,
        config.artifacts_dir().context("media.artifactsDir is not set")?,
    );
    dirs.ensure().await.context("Failed to create media directories")?;

    let fetcher = HttpFetcher::new(
        config.download_timeout_secs().map(Duration::from_secs),
        config.max_download_bytes(),
    )?;
    let pipeline = Arc::new(ImagePipeline::new(dirs, Arc::new(fetcher)));
    let ttl = i64::try_from(config.ttl_secs())
        .ok()
        .and_then(chrono::Duration::try_seconds)
        .context("cache.ttlSecs is out of range")?;
    let cache = Arc::new(ChatCache::with_ttl(ttl));

    let bot = Bot::new(token);
    let transport = Arc::new(TelegramTransport::new(bot.clone()));
    let settings = HandlerSettings {
        trigger_phrase: config.trigger_phrase().to_string(),
        baseline_quality: config.baseline_quality(),
    };
    let handler = Arc::new(ChatSessionHandler::new(cache, pipeline, transport, settings));
    let manager = Arc::new(SessionManager::new(handler));

    info!(
        config = %config_path.display(),
        ttl_secs = config.ttl_secs(),
        baseline_quality = config.baseline_quality(),
        "Starting morejpeg"
    );

    let adapter = TelegramAdapter::new(bot);
    let result = adapter.start(Arc::clone(&manager)).await;
    manager.shutdown();
    info!(adapter = adapter.name(), "morejpeg stopped");
    result
}
