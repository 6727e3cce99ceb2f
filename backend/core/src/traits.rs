use async_trait::async_trait;

use crate::error::OcrError;
use crate::image::ImageRef;

/// Trait for the remote vision services an adapter talks to.
///
/// Implementations own the wire format of one provider. Reply parsing and
/// field normalization live above this trait so every backend shares them.
#[async_trait]
pub trait VisionBackend: Send + Sync {
    /// Provider name (e.g., "gemini", "bigmodel").
    fn name(&self) -> &str;

    /// Model used when the caller does not name one.
    fn default_model(&self) -> &str;

    /// Send one instruction (plus optional image) and return the reply text.
    async fn complete(&self, request: &VisionRequest) -> Result<VisionReply, OcrError>;
}

/// Request to a vision backend.
#[derive(Debug, Clone)]
pub struct VisionRequest {
    pub model: String,
    pub instruction: String,
    /// `None` only for text-only follow-up calls such as translation.
    pub image: Option<ImageRef>,
}

impl VisionRequest {
    pub fn new(model: impl Into<String>, instruction: impl Into<String>, image: ImageRef) -> Self {
        Self {
            model: model.into(),
            instruction: instruction.into(),
            image: Some(image),
        }
    }

    pub fn text_only(model: impl Into<String>, instruction: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            instruction: instruction.into(),
            image: None,
        }
    }
}

/// Response from a vision backend.
#[derive(Debug, Clone)]
pub struct VisionReply {
    pub text: String,
    pub provider: String,
    pub model: String,
    pub tokens_used: u64,
    pub latency_ms: u64,
}

impl VisionReply {
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}
