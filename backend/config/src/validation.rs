//! Config validation with path-addressed errors and warnings.

use crate::schema::MoreJpegConfig;
use thiserror::Error;

/// Highest accepted starting quality; the degradation schedule begins here.
const MAX_BASELINE_QUALITY: u8 = 50;

const KNOWN_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error", "off"];

#[derive(Debug, Error)]
#[error("Config validation error at '{path}': {message}")]
pub struct ConfigValidationError {
    pub path: String,
    pub message: String,
}

#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }

    fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }
}

pub fn validate(config: &MoreJpegConfig) -> ValidationReport {
    let mut report = ValidationReport::default();
    validate_telegram(config, &mut report);
    validate_bot(config, &mut report);
    validate_cache(config, &mut report);
    validate_media(config, &mut report);
    validate_logging(config, &mut report);
    report
}

fn validate_telegram(config: &MoreJpegConfig, report: &mut ValidationReport) {
    if config.token().is_none() {
        report.error("telegram.token", "Bot token is required");
    }
}

fn validate_bot(config: &MoreJpegConfig, report: &mut ValidationReport) {
    if config.trigger_phrase().trim().is_empty() {
        report.error("bot.triggerPhrase", "Trigger phrase must not be blank");
    }
}

fn validate_cache(config: &MoreJpegConfig, report: &mut ValidationReport) {
    if config.ttl_secs() == 0 {
        report.error("cache.ttlSecs", "TTL must be at least one second");
    }
    let quality = config.baseline_quality();
    if !(1..=MAX_BASELINE_QUALITY).contains(&quality) {
        report.error(
            "cache.baselineQuality",
            format!("Baseline quality must be between 1 and {MAX_BASELINE_QUALITY}, got {quality}"),
        );
    }
}

fn validate_media(config: &MoreJpegConfig, report: &mut ValidationReport) {
    if let (Some(downloads), Some(artifacts)) = (config.downloads_dir(), config.artifacts_dir()) {
        if downloads == artifacts {
            report.error(
                "media.artifactsDir",
                "Artifacts directory must differ from the downloads directory",
            );
        }
    }
    if config.download_timeout_secs().is_none() {
        report.warn(
            "media.downloadTimeoutSecs",
            "Download timeout disabled; a stalled server can block a chat indefinitely",
        );
    }
    if config.max_download_bytes() == 0 {
        report.error("media.maxDownloadBytes", "Download size limit must be positive");
    }
}

fn validate_logging(config: &MoreJpegConfig, report: &mut ValidationReport) {
    let level = config.log_level();
    // Full filter directives such as `media=debug` are passed through untouched.
    if !level.contains('=') && !KNOWN_LEVELS.contains(&level.to_ascii_lowercase().as_str()) {
        report.warn(
            "logging.level",
            format!("Unknown log level '{level}'; falling back to info"),
        );
    }
}
