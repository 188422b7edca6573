//! Config file location and loading.

use anyhow::{Context, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

const CONFIG_FILE_NAME: &str = "config.yaml";

/// Resolve the morejpeg config directory.
/// Priority: `MOREJPEG_CONFIG_DIR` env > `~/.morejpeg/`
pub fn config_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("MOREJPEG_CONFIG_DIR") {
        if !dir.trim().is_empty() {
            return PathBuf::from(dir);
        }
    }
    match dirs::home_dir() {
        Some(home) => home.join(".morejpeg"),
        None => PathBuf::from(".morejpeg"),
    }
}

pub fn config_file_path(config_dir: &Path) -> PathBuf {
    config_dir.join(CONFIG_FILE_NAME)
}

/// Read the config file as an untyped tree, before env substitution.
///
/// A missing or empty file yields an empty object so a first run works on
/// defaults plus environment alone.
pub async fn load_raw_config(path: &Path) -> Result<Value> {
    if !path.exists() {
        debug!(path = %path.display(), "Config file does not exist; using defaults");
        return Ok(Value::Object(Default::default()));
    }

    let raw = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let value: Value = serde_yaml::from_str(&raw)
        .with_context(|| format!("Failed to parse config YAML at: {}", path.display()))?;

    info!(path = %path.display(), "Loaded config");
    Ok(match value {
        Value::Null => Value::Object(Default::default()),
        other => other,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_file_is_empty_object() {
        let dir = tempfile::tempdir().unwrap();
        let value = load_raw_config(&dir.path().join("absent.yaml")).await.unwrap();
        assert_eq!(value, Value::Object(Default::default()));
    }

    #[tokio::test]
    async fn empty_file_is_empty_object() {
        let dir = tempfile::tempdir().unwrap();
        let path = config_file_path(dir.path());
        std::fs::write(&path, "").unwrap();
        let value = load_raw_config(&path).await.unwrap();
        assert!(value.as_object().is_some_and(|m| m.is_empty()));
    }

    #[tokio::test]
    async fn malformed_yaml_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = config_file_path(dir.path());
        std::fs::write(&path, "cache: [unclosed").unwrap();
        let err = load_raw_config(&path).await.unwrap_err();
        assert!(format!("{err:#}").contains("config.yaml"));
    }
}
