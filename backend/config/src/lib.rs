//! `morejpeg-config` — runtime configuration for the morejpeg bot.
//!
//! Provides:
//! - Typed config schema with camelCase YAML keys
//! - `${ENV_VAR}` substitution
//! - Default value application
//! - Validation with per-field errors and warnings

pub mod defaults;
pub mod env;
pub mod io;
pub mod schema;
pub mod validation;

pub use defaults::apply_all_defaults;
pub use env::{collect_referenced_vars, resolve_env_vars, resolve_env_vars_with, MissingEnvVarError};
pub use io::{config_dir, config_file_path, load_raw_config};
pub use schema::MoreJpegConfig;
pub use validation::{validate, ConfigValidationError, ValidationReport};

use anyhow::{Context, Result};
use std::path::Path;

/// Load, substitute env vars, and apply defaults.
///
/// Defaulted paths land under the file's parent directory. Validation
/// findings are logged here; callers that must refuse an invalid config run
/// [`validate`] themselves.
pub async fn load_and_prepare(path: &Path) -> Result<MoreJpegConfig> {
    let raw = load_raw_config(path).await?;
    let value = resolve_env_vars(&raw).context("Failed to resolve env vars in config")?;
    let config: MoreJpegConfig = serde_json::from_value(value)
        .with_context(|| format!("Invalid config structure in {}", path.display()))?;

    let base = path.parent().unwrap_or_else(|| Path::new("."));
    let config = apply_all_defaults(config, base);

    let report = validate(&config);
    for warning in &report.warnings {
        tracing::warn!(path = %warning.path, message = %warning.message, "Config warning");
    }
    for error in &report.errors {
        tracing::error!(path = %error.path, message = %error.message, "Config error");
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn load_and_prepare_applies_defaults_relative_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = config_file_path(dir.path());
        std::fs::write(&path, "telegram:\n  token: \"7:xyz\"\ncache:\n  ttlSecs: 30\n").unwrap();

        let cfg = load_and_prepare(&path).await.unwrap();
        assert_eq!(cfg.token(), Some("7:xyz"));
        assert_eq!(cfg.ttl_secs(), 30);
        assert_eq!(
            cfg.downloads_dir(),
            Some(&dir.path().join("data").join("downloads"))
        );
    }

    #[tokio::test]
    async fn wrong_type_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = config_file_path(dir.path());
        std::fs::write(&path, "cache:\n  ttlSecs: soon\n").unwrap();
        assert!(load_and_prepare(&path).await.is_err());
    }
}
