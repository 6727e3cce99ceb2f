//! Config validation: schema checks with user-friendly error messages.

use crate::schema::CodeOcrConfig;
use thiserror::Error;

/// A config validation error with field path and message.
#[derive(Debug, Error)]
#[error("Config validation error at '{path}': {message}")]
pub struct ConfigValidationError {
    pub path: String,
    pub message: String,
}

/// A collection of validation errors found in one pass.
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

/// Validate the config against the set of built-in platform names.
pub fn validate(config: &CodeOcrConfig, builtin_platforms: &[&str]) -> ValidationReport {
    let mut report = ValidationReport::default();
    validate_server(config, &mut report);
    validate_formats(config, &mut report);
    validate_providers(config, builtin_platforms, &mut report);
    validate_default_platform(config, builtin_platforms, &mut report);
    report
}

fn validate_server(config: &CodeOcrConfig, report: &mut ValidationReport) {
    let Some(server) = &config.server else { return };
    if server.port == Some(0) {
        report.error("server.port", "Port must be non-zero");
    }
    if let Some(bind) = &server.bind {
        if bind.trim().is_empty() {
            report.error("server.bind", "Bind address is empty");
        }
    }
}

/// A date layout without a year token renders ambiguous dates.
fn validate_formats(config: &CodeOcrConfig, report: &mut ValidationReport) {
    let Some(formats) = &config.formats else { return };
    let layouts = [
        ("formats.passport_date", &formats.passport_date),
        ("formats.driving_license_date", &formats.driving_license_date),
    ];
    for (path, layout) in layouts {
        let Some(layout) = layout else { continue };
        if layout.trim().is_empty() {
            report.error(path, "Date layout is empty");
        } else if !layout.contains("YY") && !layout.contains("%Y") && !layout.contains("%y") {
            report.warn(path, format!("Date layout '{layout}' has no year"));
        }
    }
}

fn validate_providers(
    config: &CodeOcrConfig,
    builtin_platforms: &[&str],
    report: &mut ValidationReport,
) {
    for (name, provider) in &config.providers {
        let path = |field: &str| format!("{name}.{field}");
        let builtin = builtin_platforms.contains(&name.as_str());

        if name.trim().is_empty() || name.chars().any(|c| c.is_ascii_uppercase()) {
            report.error(name.clone(), "Platform names must be non-empty and lower-case");
        }
        if provider.secret().is_none() {
            report.warn(path("secret"), "No secret configured; calls to this platform will fail");
        }
        if !builtin {
            if provider.endpoint.as_deref().map_or(true, |e| e.trim().is_empty()) {
                report.error(path("endpoint"), "Custom platforms need an endpoint URL");
            }
            if provider.model.as_deref().map_or(true, |m| m.trim().is_empty()) {
                report.error(path("model"), "Custom platforms need a default model");
            }
        }
        if let Some(endpoint) = &provider.endpoint {
            if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
                report.error(path("endpoint"), format!("'{endpoint}' is not an http(s) URL"));
            }
        }
        if provider.request_timeout_secs == Some(0) {
            report.error(path("request_timeout_secs"), "Timeout must be at least one second");
        }
    }
}

fn validate_default_platform(
    config: &CodeOcrConfig,
    builtin_platforms: &[&str],
    report: &mut ValidationReport,
) {
    let platform = config.default_platform();
    let known = builtin_platforms.contains(&platform) || config.providers.contains_key(platform);
    if !known {
        report.error(
            "default_platform",
            format!("'{platform}' is neither a built-in nor a configured platform"),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FormatsConfig, ProviderConfig, ServerConfig};

    const BUILTIN: &[&str] = &["gemini", "bigmodel"];

    fn with_provider(name: &str, provider: ProviderConfig) -> CodeOcrConfig {
        let mut config = CodeOcrConfig::default();
        config.providers.insert(name.into(), provider);
        config
    }

    #[test]
    fn empty_config_is_valid() {
        assert!(validate(&CodeOcrConfig::default(), BUILTIN).is_valid());
    }

    #[test]
    fn missing_secret_is_a_warning() {
        let report = validate(&with_provider("gemini", ProviderConfig::default()), BUILTIN);
        assert!(report.is_valid());
        assert_eq!(report.warnings[0].path, "gemini.secret");
    }

    #[test]
    fn custom_platform_needs_endpoint_and_model() {
        let config = with_provider(
            "local",
            ProviderConfig {
                secret: Some("k".into()),
                ..Default::default()
            },
        );
        let report = validate(&config, BUILTIN);
        let paths: Vec<_> = report.errors.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, vec!["local.endpoint", "local.model"]);
    }

    #[test]
    fn custom_platform_can_be_default() {
        let mut config = with_provider(
            "local",
            ProviderConfig {
                secret: Some("k".into()),
                endpoint: Some("http://127.0.0.1:11434/v1/chat/completions".into()),
                model: Some("llava".into()),
                request_timeout_secs: None,
            },
        );
        config.default_platform = Some("local".into());
        assert!(validate(&config, BUILTIN).is_valid());
    }

    #[test]
    fn unknown_default_platform_is_an_error() {
        let mut config = CodeOcrConfig::default();
        config.default_platform = Some("nope".into());
        let report = validate(&config, BUILTIN);
        assert_eq!(report.errors[0].path, "default_platform");
    }

    #[test]
    fn zero_port_and_yearless_layout() {
        let mut config = CodeOcrConfig::default();
        config.server = Some(ServerConfig {
            bind: None,
            port: Some(0),
        });
        config.formats = Some(FormatsConfig {
            passport_date: Some("DD/MM".into()),
            driving_license_date: None,
        });
        let report = validate(&config, BUILTIN);
        assert_eq!(report.errors[0].path, "server.port");
        assert_eq!(report.warnings[0].path, "formats.passport_date");
    }
}
