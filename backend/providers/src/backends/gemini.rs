use std::time::Instant;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use codeocr_core::{ImageRef, OcrError, VisionBackend, VisionReply, VisionRequest};

use super::{missing_secret, read_body};
use crate::profile::ProviderProfile;

/// Google Gemini through the native `generateContent` API.
///
/// Images travel as inline bytes, so remote links are downloaded first.
pub struct GeminiBackend {
    client: Client,
    profile: ProviderProfile,
    secret: Option<String>,
}

impl GeminiBackend {
    pub fn new(profile: ProviderProfile, secret: Option<String>, client: Client) -> Self {
        Self {
            client,
            profile,
            secret,
        }
    }

    fn url(&self, model: &str) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.profile.endpoint.trim_end_matches('/'),
            model
        )
    }

    /// Turn any image reference into bytes with a MIME type.
    async fn materialize(&self, image: &ImageRef) -> Result<ImageRef, OcrError> {
        match image {
            ImageRef::Url(url) => self.download(url).await,
            ImageRef::Bytes { .. } => Ok(image.clone()),
            ImageRef::Inline(_) => Ok(ImageRef::Bytes {
                data: image.decode()?,
                mime: image.mime_type().to_string(),
            }),
        }
    }

    async fn download(&self, url: &str) -> Result<ImageRef, OcrError> {
        let provider = self.name();
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| OcrError::transport(provider, format!("image download failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(OcrError::transport(
                provider,
                format!("image download returned {status}"),
            ));
        }

        let mime = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .filter(|v| v.starts_with("image/"))
            .unwrap_or("image/jpeg")
            .to_string();
        let data = response
            .bytes()
            .await
            .map_err(|e| OcrError::transport(provider, format!("image download failed: {e}")))?;

        debug!(provider, url, bytes = data.len(), "Downloaded image");
        Ok(ImageRef::Bytes {
            data: data.to_vec(),
            mime,
        })
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Part<'a> {
    InlineData { inline_data: InlineData },
    Text { text: &'a str },
}

#[derive(Serialize)]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    total_token_count: Option<u64>,
}

impl GenerateResponse {
    fn into_text(self) -> String {
        self.candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| {
                c.parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default()
    }
}

#[async_trait]
impl VisionBackend for GeminiBackend {
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

        let mut parts = Vec::with_capacity(2);
        if let Some(image) = &request.image {
            let image = self.materialize(image).await?;
            parts.push(Part::InlineData {
                inline_data: InlineData {
                    mime_type: image.mime_type().to_string(),
                    data: image.raw_base64(),
                },
            });
        }
        parts.push(Part::Text {
            text: &request.instruction,
        });
        let body = GenerateRequest {
            contents: vec![Content { parts }],
        };

        debug!(provider, model = %request.model, "Sending generateContent request");

        let response = self
            .client
            .post(self.url(&request.model))
            .header("x-goog-api-key", secret)
            .json(&body)
            .send()
            .await
            .map_err(|e| OcrError::transport(provider, e))?;

        let raw = read_body(provider, response).await?;
        let parsed: GenerateResponse =
            serde_json::from_str(&raw).map_err(|e| OcrError::deserialization(provider, e))?;

        let tokens_used = parsed
            .usage_metadata
            .as_ref()
            .and_then(|u| u.total_token_count)
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::test_server::spawn;
    use axum::extract::{Path, State};
    use axum::http::{header, HeaderMap};
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use serde_json::{json, Value};
    use std::sync::{Arc, Mutex};

    type Seen = Arc<Mutex<Vec<(String, HeaderMap, Value)>>>;

    async fn fake_gemini() -> (String, Seen) {
        let seen: Seen = Arc::default();
        let router = Router::new()
            .route(
                "/v1beta/models/:call",
                post(
                    |State(seen): State<Seen>,
                     Path(call): Path<String>,
                     headers: HeaderMap,
                     Json(body): Json<Value>| async move {
                        seen.lock().unwrap().push((call, headers, body));
                        Json(json!({
                            "candidates": [{"content": {"parts": [{"text": "No. 90210"}], "role": "model"}}],
                            "usageMetadata": {"totalTokenCount": 33}
                        }))
                    },
                ),
            )
            .route(
                "/card.png",
                get(|| async { ([(header::CONTENT_TYPE, "image/png")], vec![0x89u8, b'P', b'N', b'G']) }),
            )
            .with_state(seen.clone());
        (spawn(router).await, seen)
    }

    fn backend(base: &str, secret: Option<&str>) -> GeminiBackend {
        let mut profile = ProviderProfile::builtin("gemini").unwrap();
        profile.endpoint = format!("{base}/v1beta");
        GeminiBackend::new(profile, secret.map(String::from), Client::new())
    }

    #[tokio::test]
    async fn sends_inline_image_with_api_key_header() {
        let (base, seen) = fake_gemini().await;
        let reply = backend(&base, Some("AIza-test"))
            .complete(&VisionRequest::new(
                "gemini-1.5-flash",
                "Get the number",
                ImageRef::Inline("/9j/4AAQ".into()),
            ))
            .await
            .unwrap();
        assert_eq!(reply.text, "No. 90210");
        assert_eq!(reply.tokens_used, 33);

        let seen = seen.lock().unwrap();
        let (call, headers, body) = &seen[0];
        assert_eq!(call, "gemini-1.5-flash:generateContent");
        assert_eq!(headers["x-goog-api-key"], "AIza-test");
        let parts = &body["contents"][0]["parts"];
        assert_eq!(parts[0]["inline_data"]["mime_type"], "image/jpeg");
        assert_eq!(parts[0]["inline_data"]["data"], "/9j/4AAQ");
        assert_eq!(parts[1]["text"], "Get the number");
    }

    #[tokio::test]
    async fn downloads_remote_images() {
        let (base, seen) = fake_gemini().await;
        backend(&base, Some("k"))
            .complete(&VisionRequest::new(
                "gemini-1.5-flash",
                "x",
                ImageRef::Url(format!("{base}/card.png")),
            ))
            .await
            .unwrap();
        let body = &seen.lock().unwrap()[0].2;
        let inline = &body["contents"][0]["parts"][0]["inline_data"];
        assert_eq!(inline["mime_type"], "image/png");
        assert_eq!(inline["data"], "iVBORw==");
    }

    #[tokio::test]
    async fn invalid_base64_is_rejected_before_sending() {
        let (base, seen) = fake_gemini().await;
        let err = backend(&base, Some("k"))
            .complete(&VisionRequest::new(
                "gemini-1.5-flash",
                "x",
                ImageRef::Inline("not base64!!".into()),
            ))
            .await
            .unwrap_err();
        assert!(matches!(err, OcrError::InvalidImage(_)));
        assert!(seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_secret_is_config_error() {
        let (base, _) = fake_gemini().await;
        let err = backend(&base, None)
            .complete(&VisionRequest::new("m", "x", ImageRef::Inline("/9j/".into())))
            .await
            .unwrap_err();
        assert!(matches!(err, OcrError::Config(_)));
    }
}
