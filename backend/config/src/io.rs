//! Config file discovery and reading.

use anyhow::{Context, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Env var naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "CODEOCR_CONFIG";

/// Default config file, relative to the working directory.
const DEFAULT_CONFIG_PATH: &str = "config/config.yaml";

/// Resolve the config file path.
/// Priority: explicit path > `CODEOCR_CONFIG` > `./config/config.yaml` > `~/.codeocr/config.yaml`.
pub fn resolve_config_path(explicit: Option<&Path>) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }
    let local = PathBuf::from(DEFAULT_CONFIG_PATH);
    if local.exists() {
        return local;
    }
    if let Some(home) = dirs::home_dir() {
        let user = home.join(".codeocr").join("config.yaml");
        if user.exists() {
            return user;
        }
    }
    local
}

/// Read and parse the YAML config file into a raw JSON value.
///
/// Returns an empty object if the file doesn't exist, so a bare deployment
/// runs on defaults plus whatever the environment provides.
pub async fn load_raw_config(path: &Path) -> Result<Value> {
    if !path.exists() {
        debug!(path = %path.display(), "Config file does not exist; using defaults");
        return Ok(Value::Object(Default::default()));
    }

    let raw = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let value: Value = if raw.trim().is_empty() {
        Value::Object(Default::default())
    } else {
        serde_yaml::from_str(&raw)
            .with_context(|| format!("Failed to parse config YAML at: {}", path.display()))?
    };

    info!(path = %path.display(), "Loaded config");
    Ok(value)
}
