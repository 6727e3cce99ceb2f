//! Config defaults: applies default values to parsed config.

use crate::schema::{CodeOcrConfig, FormatsConfig, LoggingConfig, ServerConfig};

pub const DEFAULT_BIND: &str = "0.0.0.0";

pub const DEFAULT_PORT: u16 = 8000;

pub const DEFAULT_PLATFORM: &str = "gemini";

pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Passport dates are returned as `08/06/1996`.
pub const DEFAULT_PASSPORT_DATE_FORMAT: &str = "DD/MM/YYYY";

/// Driving-license dates are returned as `1996.06.08`.
pub const DEFAULT_DRIVING_LICENSE_DATE_FORMAT: &str = "YYYY.MM.DD";

/// Apply all defaults to a freshly loaded config.
pub fn apply_all_defaults(config: CodeOcrConfig) -> CodeOcrConfig {
    let config = apply_server_defaults(config);
    let config = apply_logging_defaults(config);
    let config = apply_format_defaults(config);
    apply_platform_default(config)
}

fn apply_server_defaults(mut config: CodeOcrConfig) -> CodeOcrConfig {
    let server = config.server.get_or_insert_with(ServerConfig::default);
    if server.bind.is_none() {
        server.bind = Some(DEFAULT_BIND.to_string());
    }
    if server.port.is_none() {
        server.port = Some(DEFAULT_PORT);
    }
    config
}

fn apply_logging_defaults(mut config: CodeOcrConfig) -> CodeOcrConfig {
    let logging = config.logging.get_or_insert_with(LoggingConfig::default);
    if logging.level.is_none() {
        logging.level = Some(DEFAULT_LOG_LEVEL.to_string());
    }
    if logging.json.is_none() {
        logging.json = Some(false);
    }
    config
}

fn apply_format_defaults(mut config: CodeOcrConfig) -> CodeOcrConfig {
    let formats = config.formats.get_or_insert_with(FormatsConfig::default);
    if formats.passport_date.is_none() {
        formats.passport_date = Some(DEFAULT_PASSPORT_DATE_FORMAT.to_string());
    }
    if formats.driving_license_date.is_none() {
        formats.driving_license_date = Some(DEFAULT_DRIVING_LICENSE_DATE_FORMAT.to_string());
    }
    config
}

/// Platform names are matched lower-case.
fn apply_platform_default(mut config: CodeOcrConfig) -> CodeOcrConfig {
    let platform = config
        .default_platform
        .take()
        .map(|p| p.trim().to_lowercase())
        .filter(|p| !p.is_empty())
        .unwrap_or_else(|| DEFAULT_PLATFORM.to_string());
    config.default_platform = Some(platform);
    config
}
