use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{Context, Result};
use codeocr_config::CodeOcrConfig;
use codeocr_core::VisionBackend;
use tracing::{info, warn};

use crate::adapter::{DateFormats, OcrAdapter};
use crate::backends::build_client;
use crate::backends::chat_completions::ChatCompletionsBackend;
use crate::backends::gemini::GeminiBackend;
use crate::profile::{ApiFlavor, ProviderProfile, BUILTIN_PLATFORMS};

/// Adapters keyed by platform name. Built once at startup, read-only afterwards.
pub struct ProviderRegistry {
    adapters: HashMap<String, Arc<OcrAdapter>>,
    default_name: String,
    default: Arc<OcrAdapter>,
}

impl ProviderRegistry {
    /// A registry whose only adapter is the default.
    pub fn new(default_name: impl Into<String>, default: Arc<OcrAdapter>) -> Self {
        let default_name = normalize_name(&default_name.into());
        let mut adapters = HashMap::new();
        adapters.insert(default_name.clone(), default.clone());
        Self {
            adapters,
            default_name,
            default,
        }
    }

    /// Build every built-in platform plus the custom ones declared in config.
    pub fn from_config(config: &CodeOcrConfig) -> Result<Self> {
        let formats = DateFormats::from_config(config);
        let mut adapters = HashMap::new();

        for name in BUILTIN_PLATFORMS {
            let section = config.provider(name);
            let Some(profile) = ProviderProfile::builtin(name) else { continue };
            let profile = profile.with_overrides(section);
            let secret = section.and_then(|s| s.secret()).map(String::from);
            let adapter = build_adapter(profile, secret, &formats)?;
            adapters.insert(name.to_string(), Arc::new(adapter));
        }

        for (name, section) in &config.providers {
            let name = normalize_name(name);
            if adapters.contains_key(&name) {
                continue;
            }
            let (Some(endpoint), Some(model)) = (section.endpoint.as_deref(), section.model.as_deref()) else {
                warn!(platform = %name, "Skipping custom platform without endpoint and model");
                continue;
            };
            let profile = ProviderProfile::custom(&name, endpoint, model).with_overrides(Some(section));
            let secret = section.secret().map(String::from);
            let adapter = build_adapter(profile, secret, &formats)?;
            adapters.insert(name, Arc::new(adapter));
        }

        let default_name = normalize_name(config.default_platform());
        let default = adapters
            .get(&default_name)
            .cloned()
            .with_context(|| format!("default platform '{default_name}' is not available"))?;

        let mut names: Vec<_> = adapters.keys().cloned().collect();
        names.sort();
        info!(platforms = ?names, default = %default_name, "Provider registry ready");

        Ok(Self {
            adapters,
            default_name,
            default,
        })
    }

    /// Register (or replace) an adapter.
    pub fn register(&mut self, name: &str, adapter: Arc<OcrAdapter>) {
        let name = normalize_name(name);
        if name == self.default_name {
            self.default = adapter.clone();
        }
        self.adapters.insert(name, adapter);
    }

    /// Adapter for `name`; unknown or empty names get the default.
    pub fn resolve(&self, name: &str) -> Arc<OcrAdapter> {
        self.adapters
            .get(&normalize_name(name))
            .cloned()
            .unwrap_or_else(|| self.default.clone())
    }

    /// Registered platform names, sorted.
    pub fn list(&self) -> Vec<String> {
        let mut names: Vec<_> = self.adapters.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn default_name(&self) -> &str {
        &self.default_name
    }
}

fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

fn build_adapter(
    profile: ProviderProfile,
    secret: Option<String>,
    formats: &DateFormats,
) -> Result<OcrAdapter> {
    if secret.is_none() {
        warn!(platform = %profile.name, "No secret configured; requests to this platform will fail");
    }
    let client = build_client(profile.request_timeout_secs)
        .with_context(|| format!("Failed to build HTTP client for {}", profile.name))?;

    let backend: Arc<dyn VisionBackend> = match profile.api {
        ApiFlavor::ChatCompletions => {
            Arc::new(ChatCompletionsBackend::new(profile.clone(), secret, client))
        }
        ApiFlavor::Gemini => Arc::new(GeminiBackend::new(profile.clone(), secret, client)),
    };
    Ok(OcrAdapter::new(backend, &profile, formats.clone()))
}
