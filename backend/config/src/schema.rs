//! CodeOCR configuration schema.
//!
//! Provider sections sit at the top level keyed by platform name
//! (`gemini.secret`, `bigmodel.secret`, ...), next to the fixed
//! `server`, `logging`, and `formats` sections.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Root configuration, loaded once at startup.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CodeOcrConfig {
    /// HTTP listener settings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server: Option<ServerConfig>,

    /// Logging configuration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logging: Option<LoggingConfig>,

    /// Canonical output date layouts per endpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formats: Option<FormatsConfig>,

    /// Platform used when a request names an unknown one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_platform: Option<String>,

    /// Per-provider sections, keyed by platform name
    #[serde(flatten)]
    pub providers: BTreeMap<String, ProviderConfig>,
}

impl CodeOcrConfig {
    pub fn provider(&self, name: &str) -> Option<&ProviderConfig> {
        self.providers.get(name)
    }

    pub fn bind_address(&self) -> String {
        let server = self.server.clone().unwrap_or_default();
        format!(
            "{}:{}",
            server.bind.unwrap_or_else(|| crate::defaults::DEFAULT_BIND.to_string()),
            server.port.unwrap_or(crate::defaults::DEFAULT_PORT)
        )
    }

    pub fn default_platform(&self) -> &str {
        self.default_platform
            .as_deref()
            .unwrap_or(crate::defaults::DEFAULT_PLATFORM)
    }

    pub fn passport_date_format(&self) -> &str {
        self.formats
            .as_ref()
            .and_then(|f| f.passport_date.as_deref())
            .unwrap_or(crate::defaults::DEFAULT_PASSPORT_DATE_FORMAT)
    }

    pub fn driving_license_date_format(&self) -> &str {
        self.formats
            .as_ref()
            .and_then(|f| f.driving_license_date.as_deref())
            .unwrap_or(crate::defaults::DEFAULT_DRIVING_LICENSE_DATE_FORMAT)
    }
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// tracing filter directive, e.g. "info" or "codeocr=debug"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    /// Emit JSON lines on the console
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub json: Option<bool>,
    /// Directory for rolling NDJSON files; no file output when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FormatsConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passport_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub driving_license_date: Option<String>,
}

/// One vision provider.
///
/// Built-in platforms only need `secret`; other names declare an
/// OpenAI-compatible endpoint and must set `endpoint` and `model`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Bearer secret / API key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,
    /// Override of the provider endpoint URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    /// Model used when a request does not name one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Whole-request timeout for outbound calls
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,
}

impl ProviderConfig {
    /// Secret, if set and non-blank.
    pub fn secret(&self) -> Option<&str> {
        self.secret.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_sections_are_collected_from_top_level() {
        let yaml = r#"
server:
  port: 9000
default_platform: bigmodel
gemini:
  secret: g-key
bigmodel:
  secret: b-key
  model: glm-4v-plus
"#;
        let config: CodeOcrConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.providers.len(), 2);
        assert_eq!(config.provider("gemini").unwrap().secret(), Some("g-key"));
        assert_eq!(
            config.provider("bigmodel").unwrap().model.as_deref(),
            Some("glm-4v-plus")
        );
        assert_eq!(config.default_platform(), "bigmodel");
        assert_eq!(config.bind_address(), "0.0.0.0:9000");
    }

    #[test]
    fn getters_fall_back_to_defaults() {
        let config = CodeOcrConfig::default();
        assert_eq!(config.default_platform(), "gemini");
        assert_eq!(config.passport_date_format(), "DD/MM/YYYY");
        assert_eq!(config.driving_license_date_format(), "YYYY.MM.DD");
    }

    #[test]
    fn blank_secret_counts_as_missing() {
        let provider = ProviderConfig {
            secret: Some("   ".into()),
            ..Default::default()
        };
        assert_eq!(provider.secret(), None);
    }
}
