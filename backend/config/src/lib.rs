//! `codeocr-config`: CodeOCR runtime configuration.
//!
//! Provides:
//! - Typed config schema (server, logging, date formats, provider sections)
//! - YAML discovery and reading
//! - `${ENV_VAR}` substitution
//! - Legacy key migration
//! - Config redaction for safe logging/display
//! - Default value application
//! - Validation with errors and warnings

pub mod defaults;
pub mod env;
pub mod io;
pub mod migration;
pub mod redact;
pub mod schema;
pub mod validation;

pub use defaults::apply_all_defaults;
pub use env::{collect_referenced_vars, resolve_env_vars, resolve_env_vars_with, MissingEnvVarError};
pub use io::{load_raw_config, resolve_config_path, CONFIG_ENV_VAR};
pub use migration::migrate;
pub use redact::{collect_redacted_paths, redact};
pub use schema::{CodeOcrConfig, FormatsConfig, LoggingConfig, ProviderConfig, ServerConfig};
pub use validation::{validate, ConfigValidationError, ValidationReport};

use anyhow::{bail, Context, Result};
use serde_json::Value;
use std::path::Path;

/// Load, migrate, substitute env vars, apply defaults, and validate.
///
/// `builtin_platforms` lists the platform names that need no endpoint
/// in the file. Validation errors abort the load; warnings are logged.
pub async fn load_and_prepare(path: &Path, builtin_platforms: &[&str]) -> Result<CodeOcrConfig> {
    let value = load_raw_config(path).await?;
    prepare(value, builtin_platforms)
}

/// The load pipeline minus file I/O.
pub fn prepare(value: Value, builtin_platforms: &[&str]) -> Result<CodeOcrConfig> {
    let (value, migrated) = migrate(value);
    if migrated {
        tracing::info!("Config uses legacy keys; consider updating the file");
    }

    let value = resolve_env_vars(&value).context("Failed to resolve env vars in config")?;

    let config: CodeOcrConfig =
        serde_json::from_value(value).context("Failed to deserialize config")?;
    let config = apply_all_defaults(config);

    let report = validate(&config, builtin_platforms);
    for warning in &report.warnings {
        tracing::warn!(path = %warning.path, message = %warning.message, "Config warning");
    }
    for error in &report.errors {
        tracing::error!(path = %error.path, message = %error.message, "Config error");
    }
    if !report.is_valid() {
        bail!("{} config error(s); first: {}", report.errors.len(), report.errors[0]);
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const BUILTIN: &[&str] = &["gemini", "bigmodel", "mistral", "openrouter", "siliconflow"];

    #[test]
    fn empty_value_yields_defaults() {
        let config = prepare(json!({}), BUILTIN).unwrap();
        assert_eq!(config.bind_address(), "0.0.0.0:8000");
        assert_eq!(config.default_platform(), "gemini");
        assert_eq!(config.passport_date_format(), "DD/MM/YYYY");
        assert_eq!(config.driving_license_date_format(), "YYYY.MM.DD");
    }

    #[test]
    fn legacy_ocr_secret_reaches_gemini() {
        let config = prepare(json!({"ocr": {"secret": "legacy"}}), BUILTIN).unwrap();
        assert_eq!(config.provider("gemini").and_then(|p| p.secret()), Some("legacy"));
        assert!(config.provider("ocr").is_none());
    }

    #[test]
    fn invalid_config_fails_to_load() {
        let err = prepare(json!({"default_platform": "nowhere"}), BUILTIN).unwrap_err();
        assert!(err.to_string().contains("default_platform"));
    }

    #[tokio::test]
    async fn loads_file_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(
            &path,
            "server:\n  port: 9100\ndefault_platform: Mistral\nmistral:\n  secret: m-key\n",
        )
        .unwrap();
        let config = load_and_prepare(&path, BUILTIN).await.unwrap();
        assert_eq!(config.bind_address(), "0.0.0.0:9100");
        assert_eq!(config.default_platform(), "mistral");
        assert_eq!(config.provider("mistral").and_then(|p| p.secret()), Some("m-key"));
    }
}
