//! Legacy config migration.
//!
//! Older deployments kept the Gemini key under `ocr.secret` and spelled
//! some keys in camelCase. Each step is idempotent and runs on the raw
//! JSON value before typed deserialization.

use serde_json::{Map, Value};
use tracing::info;

/// Apply all migrations. Returns the new value and whether anything changed.
pub fn migrate(value: Value) -> (Value, bool) {
    let mut map = match value {
        Value::Object(map) => map,
        other => return (other, false),
    };

    let mut mutated = false;
    mutated |= migrate_ocr_section(&mut map);
    mutated |= migrate_camel_case_keys(&mut map);

    (Value::Object(map), mutated)
}

/// `ocr.secret` → `gemini.secret` unless a gemini secret already exists.
fn migrate_ocr_section(map: &mut Map<String, Value>) -> bool {
    let Some(Value::Object(legacy)) = map.remove("ocr") else {
        return false;
    };

    let gemini = map
        .entry("gemini".to_string())
        .or_insert_with(|| Value::Object(Map::new()));
    if let Value::Object(gemini) = gemini {
        for (key, val) in legacy {
            gemini.entry(key).or_insert(val);
        }
    }
    info!("Migrated legacy `ocr` section → `gemini`");
    true
}

/// `defaultPlatform` → `default_platform`, `requestTimeoutSecs` → `request_timeout_secs`.
fn migrate_camel_case_keys(map: &mut Map<String, Value>) -> bool {
    let mut mutated = rename_key(map, "defaultPlatform", "default_platform");
    if let Some(Value::Object(formats)) = map.get_mut("formats") {
        mutated |= rename_key(formats, "passportDate", "passport_date");
        mutated |= rename_key(formats, "drivingLicenseDate", "driving_license_date");
    }
    for section in map.values_mut() {
        if let Value::Object(section) = section {
            mutated |= rename_key(section, "requestTimeoutSecs", "request_timeout_secs");
        }
    }
    mutated
}

fn rename_key(map: &mut Map<String, Value>, from: &str, to: &str) -> bool {
    if map.contains_key(to) {
        return false;
    }
    match map.remove(from) {
        Some(val) => {
            map.insert(to.to_string(), val);
            true
        }
        None => false,
    }
}
