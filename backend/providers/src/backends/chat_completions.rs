use std::time::Instant;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use codeocr_core::{ImageRef, OcrError, VisionBackend, VisionReply, VisionRequest};

use super::{missing_secret, read_body};
use crate::profile::{ImageStyle, ProviderProfile};

/// Any OpenAI-style `chat/completions` vision endpoint.
///
/// BigModel, Mistral, SiliconFlow, OpenRouter and custom platforms differ
/// only in their [`ProviderProfile`].
pub struct ChatCompletionsBackend {
    client: Client,
    profile: ProviderProfile,
    secret: Option<String>,
}

impl ChatCompletionsBackend {
    pub fn new(profile: ProviderProfile, secret: Option<String>, client: Client) -> Self {
        Self {
            client,
            profile,
            secret,
        }
    }

    fn image_url(&self, image: &ImageRef) -> String {
        match self.profile.image_style {
            ImageStyle::DataUri => image.data_uri(),
            ImageStyle::RawBase64 => image.raw_base64(),
        }
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: Vec<ContentPart<'a>>,
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart<'a> {
    ImageUrl { image_url: ImageUrl },
    Text { text: &'a str },
}

#[derive(Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct Choice {
    message: ReplyMessage,
}

#[derive(Deserialize)]
struct ReplyMessage {
    #[serde(default)]
    content: Option<ReplyContent>,
}

/// Providers answer with either a plain string or a list of text parts.
#[derive(Deserialize)]
#[serde(untagged)]
enum ReplyContent {
    Text(String),
    Parts(Vec<ReplyPart>),
}

#[derive(Deserialize)]
struct ReplyPart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize)]
struct Usage {
    total_tokens: Option<u64>,
}

impl ChatResponse {
    fn into_text(self) -> String {
        let Some(choice) = self.choices.into_iter().next() else {
            return String::new();
        };
        match choice.message.content {
            Some(ReplyContent::Text(text)) => text,
            Some(ReplyContent::Parts(parts)) => parts
                .into_iter()
                .filter_map(|p| p.text)
                .collect::<Vec<_>>()
                .join(""),
            None => String::new(),
        }
    }
}

#[async_trait]
impl VisionBackend for ChatCompletionsBackend {
    fn name(&self) -> &str {
        &self.profile.name
    }

    fn default_model(&self) -> &str {
        &self.profile.default_model
    }

    async fn complete(&self, request: &VisionRequest) -> Result<VisionReply, OcrError> {
        let provider = self.name();
        let secret = self.secret.as_deref().ok_or_else(|| missing_secret(provider))?;
        let start = Instant::now();

        let mut content = Vec::with_capacity(2);
        if let Some(image) = &request.image {
            content.push(ContentPart::ImageUrl {
                image_url: ImageUrl {
                    url: self.image_url(image),
                },
            });
        }
        content.push(ContentPart::Text {
            text: &request.instruction,
        });

        let body = ChatRequest {
            model: &request.model,
            messages: vec![ChatMessage {
                role: "user",
                content,
            }],
        };

        debug!(provider, model = %request.model, endpoint = %self.profile.endpoint, "Sending vision request");

        let response = self
            .client
            .post(&self.profile.endpoint)
            .bearer_auth(secret)
            .json(&body)
            .send()
            .await
            .map_err(|e| OcrError::transport(provider, e))?;

        let raw = read_body(provider, response).await?;
        let parsed: ChatResponse =
            serde_json::from_str(&raw).map_err(|e| OcrError::deserialization(provider, e))?;

        let tokens_used = parsed
            .usage
            .as_ref()
            .and_then(|u| u.total_tokens)
            .unwrap_or(0);

        Ok(VisionReply {
            text: parsed.into_text(),
            provider: provider.to_string(),
            model: request.model.clone(),
            tokens_used,
            latency_ms: start.elapsed().as_millis() as u64,
        })
    }
}
