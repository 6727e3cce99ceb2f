//! Static description of each vision platform.
//!
//! A profile is everything that differs between providers speaking the
//! same wire protocol: endpoint, default model, how the image is embedded,
//! which language the instructions are written in, and which
//! driving-license shape the provider is asked for.

use codeocr_config::ProviderConfig;

/// Platform names known without any config entry.
pub const BUILTIN_PLATFORMS: &[&str] = &["gemini", "bigmodel", "mistral", "openrouter", "siliconflow"];

/// Wire protocol spoken by a platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiFlavor {
    /// OpenAI-style `chat/completions` with `image_url` content parts.
    ChatCompletions,
    /// Gemini native `generateContent` with inline image bytes.
    Gemini,
}

/// How an image is placed into an `image_url` content part.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageStyle {
    /// `data:<mime>;base64,...`
    DataUri,
    /// Bare base64 payload.
    RawBase64,
}

/// Language the extraction instructions are written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptLocale {
    English,
    Chinese,
}

/// Driving-license shape a provider is asked to return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LicenseSchema {
    /// The canonical eight-field record.
    Flat,
    /// Face/back card; translated to the flat record after parsing.
    Structured,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderProfile {
    pub name: String,
    pub api: ApiFlavor,
    pub endpoint: String,
    pub default_model: String,
    pub image_style: ImageStyle,
    pub locale: PromptLocale,
    pub license_schema: LicenseSchema,
    /// Whether the provider gets the second, text-only translation call.
    pub translates: bool,
    pub request_timeout_secs: Option<u64>,
}

impl ProviderProfile {
    /// Profile of a built-in platform, or `None` for unknown names.
    pub fn builtin(name: &str) -> Option<Self> {
        let profile = match name {
            "gemini" => Self::chat(
                "gemini",
                "https://generativelanguage.googleapis.com/v1beta",
                "gemini-1.5-flash",
            )
            .with_api(ApiFlavor::Gemini),
            "bigmodel" => Self::chat(
                "bigmodel",
                "https://open.bigmodel.cn/api/paas/v4/chat/completions",
                "glm-4v-flash",
            )
            .with_image_style(ImageStyle::RawBase64)
            .with_locale(PromptLocale::Chinese),
            "mistral" => Self::chat(
                "mistral",
                "https://api.mistral.ai/v1/chat/completions",
                "pixtral-12b-2409",
            )
            .with_locale(PromptLocale::Chinese),
            "openrouter" => Self::chat(
                "openrouter",
                "https://openrouter.ai/api/v1/chat/completions",
                "openai/gpt-4o-mini",
            ),
            "siliconflow" => {
                let mut profile = Self::chat(
                    "siliconflow",
                    "https://api.siliconflow.cn/v1/chat/completions",
                    "Qwen/Qwen2-VL-7B-Instruct",
                );
                profile.license_schema = LicenseSchema::Structured;
                profile.translates = false;
                profile
            }
            _ => return None,
        };
        Some(profile)
    }

    /// Profile for an OpenAI-compatible platform declared only in config.
    pub fn custom(name: &str, endpoint: &str, model: &str) -> Self {
        Self::chat(name, endpoint, model)
    }

    fn chat(name: &str, endpoint: &str, default_model: &str) -> Self {
        Self {
            name: name.to_string(),
            api: ApiFlavor::ChatCompletions,
            endpoint: endpoint.to_string(),
            default_model: default_model.to_string(),
            image_style: ImageStyle::DataUri,
            locale: PromptLocale::English,
            license_schema: LicenseSchema::Flat,
            translates: true,
            request_timeout_secs: None,
        }
    }

    fn with_api(mut self, api: ApiFlavor) -> Self {
        self.api = api;
        self
    }

    fn with_image_style(mut self, style: ImageStyle) -> Self {
        self.image_style = style;
        self
    }

    fn with_locale(mut self, locale: PromptLocale) -> Self {
        self.locale = locale;
        self
    }

    /// Apply `endpoint`, `model` and timeout overrides from a config section.
    pub fn with_overrides(mut self, config: Option<&ProviderConfig>) -> Self {
        let Some(config) = config else { return self };
        if let Some(endpoint) = non_blank(config.endpoint.as_deref()) {
            self.endpoint = endpoint.to_string();
        }
        if let Some(model) = non_blank(config.model.as_deref()) {
            self.default_model = model.to_string();
        }
        self.request_timeout_secs = config.request_timeout_secs.or(self.request_timeout_secs);
        self
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_builtin_has_a_profile() {
        for name in BUILTIN_PLATFORMS {
            let profile = ProviderProfile::builtin(name).unwrap();
            assert_eq!(profile.name, *name);
            assert!(profile.endpoint.starts_with("https://"));
        }
        assert!(ProviderProfile::builtin("unknown").is_none());
    }

    #[test]
    fn provider_quirks() {
        let bigmodel = ProviderProfile::builtin("bigmodel").unwrap();
        assert_eq!(bigmodel.image_style, ImageStyle::RawBase64);
        assert_eq!(bigmodel.locale, PromptLocale::Chinese);

        let siliconflow = ProviderProfile::builtin("siliconflow").unwrap();
        assert_eq!(siliconflow.license_schema, LicenseSchema::Structured);
        assert!(!siliconflow.translates);

        assert_eq!(ProviderProfile::builtin("gemini").unwrap().api, ApiFlavor::Gemini);
    }

    #[test]
    fn config_overrides_endpoint_and_model() {
        let config = ProviderConfig {
            secret: Some("k".into()),
            endpoint: Some("http://127.0.0.1:9999/v1/chat/completions".into()),
            model: Some("glm-4v-plus".into()),
            request_timeout_secs: Some(30),
        };
        let profile = ProviderProfile::builtin("bigmodel")
            .unwrap()
            .with_overrides(Some(&config));
        assert_eq!(profile.endpoint, "http://127.0.0.1:9999/v1/chat/completions");
        assert_eq!(profile.default_model, "glm-4v-plus");
        assert_eq!(profile.request_timeout_secs, Some(30));
        assert_eq!(profile.image_style, ImageStyle::RawBase64);
    }

    #[test]
    fn blank_overrides_are_ignored() {
        let config = ProviderConfig {
            model: Some("  ".into()),
            ..Default::default()
        };
        let profile = ProviderProfile::builtin("mistral")
            .unwrap()
            .with_overrides(Some(&config));
        assert_eq!(profile.default_model, "pixtral-12b-2409");
    }
}
