//! `morejpeg doctor`: offline health check of the config and media storage.

use std::path::Path;

use serde_json::Value;

use crate::terminal_output::{note_error, note_info, note_success, note_warn};
use media::MediaDirs;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    Warn,
    Fail,
}

#[derive(Debug)]
pub struct Finding {
    pub status: Status,
    pub message: String,
}

impl Finding {
    fn ok(message: impl Into<String>) -> Self {
        Self { status: Status::Ok, message: message.into() }
    }

    fn warn(message: impl Into<String>) -> Self {
        Self { status: Status::Warn, message: message.into() }
    }

    fn fail(message: impl Into<String>) -> Self {
        Self { status: Status::Fail, message: message.into() }
    }
}

/// Print the diagnosis and report whether nothing failed.
pub async fn run(config_path: &Path) -> bool {
    note_info(&format!("Checking {}", config_path.display()));

    let findings = diagnose(config_path).await;
    for finding in &findings {
        match finding.status {
            Status::Ok => note_success(&finding.message),
            Status::Warn => note_warn(&finding.message),
            Status::Fail => note_error(&finding.message),
        }
    }

    let healthy = findings.iter().all(|f| f.status != Status::Fail);
    println!();
    if healthy {
        note_success("All checks passed");
    } else {
        note_error("Some checks failed; fix the errors above");
    }
    healthy
}

pub async fn diagnose(config_path: &Path) -> Vec<Finding> {
    let mut findings = Vec::new();

    if config_path.exists() {
        findings.push(Finding::ok(format!("Config file found: {}", config_path.display())));
    } else {
        findings.push(Finding::warn(format!(
            "No config file at {}; using defaults",
            config_path.display()
        )));
    }

    match morejpeg_config::load_raw_config(config_path).await {
        Ok(raw) => findings.extend(check_env_vars(&raw)),
        Err(e) => {
            findings.push(Finding::fail(format!("{e:#}")));
            return findings;
        }
    }

    let config = match morejpeg_config::load_and_prepare(config_path).await {
        Ok(config) => config,
        Err(e) => {
            findings.push(Finding::fail(format!("Config could not be loaded: {e:#}")));
            return findings;
        }
    };

    let report = morejpeg_config::validate(&config);
    for error in &report.errors {
        findings.push(Finding::fail(format!("{}: {}", error.path, error.message)));
    }
    for warning in &report.warnings {
        findings.push(Finding::warn(format!("{}: {}", warning.path, warning.message)));
    }
    if config.token().is_some() {
        findings.push(Finding::ok("Telegram token is set"));
    }

    if let (Some(downloads), Some(artifacts)) = (config.downloads_dir(), config.artifacts_dir()) {
        let dirs = MediaDirs::new(downloads, artifacts);
        findings.push(check_media_dirs(&dirs).await);
    }
    if let Some(log_dir) = config.log_dir() {
        findings.push(check_writable("Log directory", log_dir).await);
    }

    findings
}

fn check_env_vars(raw: &Value) -> Vec<Finding> {
    morejpeg_config::collect_referenced_vars(raw)
        .into_iter()
        .map(|var| match std::env::var(&var) {
            Ok(val) if !val.is_empty() => Finding::ok(format!("{var} is set")),
            _ => Finding::fail(format!("{var} is referenced by the config but not set")),
        })
        .collect()
}

async fn check_media_dirs(dirs: &MediaDirs) -> Finding {
    if let Err(e) = dirs.ensure().await {
        return Finding::fail(format!("Media directories could not be created: {e}"));
    }
    for dir in [dirs.downloads(), dirs.artifacts()] {
        let finding = check_writable("Media directory", dir).await;
        if finding.status == Status::Fail {
            return finding;
        }
    }
    Finding::ok(format!(
        "Media directories writable: {}, {}",
        dirs.downloads().display(),
        dirs.artifacts().display()
    ))
}

async fn check_writable(label: &str, dir: &Path) -> Finding {
    let marker = dir.join(".doctor-write-check");
    let result = async {
        tokio::fs::create_dir_all(dir).await?;
        tokio::fs::write(&marker, b"ok").await?;
        tokio::fs::remove_file(&marker).await
    }
    .await;

    match result {
        Ok(()) => Finding::ok(format!("{label} writable: {}", dir.display())),
        Err(e) => Finding::fail(format!("{label} {} is not writable: {e}", dir.display())),
    }
}
