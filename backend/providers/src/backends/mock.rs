use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use codeocr_core::{OcrError, VisionBackend, VisionReply, VisionRequest};

/// A scripted backend: replies are served in order, and every request is kept.
///
/// Once the script runs out the backend answers with blank text.
pub struct MockBackend {
    name: String,
    default_model: String,
    replies: Mutex<VecDeque<Result<String, OcrError>>>,
    requests: Mutex<Vec<VisionRequest>>,
}

impl MockBackend {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default_model: "mock-vision".to_string(),
            replies: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn with_default_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = model.into();
        self
    }

    pub fn with_reply(self, text: impl Into<String>) -> Self {
        self.push(Ok(text.into()));
        self
    }

    pub fn with_error(self, error: OcrError) -> Self {
        self.push(Err(error));
        self
    }

    fn push(&self, reply: Result<String, OcrError>) {
        if let Ok(mut replies) = self.replies.lock() {
            replies.push_back(reply);
        }
    }

    /// Requests received so far, oldest first.
    pub fn requests(&self) -> Vec<VisionRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl VisionBackend for MockBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn default_model(&self) -> &str {
        &self.default_model
    }

    async fn complete(&self, request: &VisionRequest) -> Result<VisionReply, OcrError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }
        let next = self
            .replies
            .lock()
            .ok()
            .and_then(|mut replies| replies.pop_front())
            .unwrap_or_else(|| Ok(String::new()));

        next.map(|text| VisionReply {
            text,
            provider: self.name.clone(),
            model: request.model.clone(),
            tokens_used: 0,
            latency_ms: 0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn serves_script_in_order_then_blank() {
        let mock = MockBackend::new("mock")
            .with_reply("first")
            .with_error(OcrError::transport("mock", "down"));
        let req = VisionRequest::text_only("m", "hi");

        assert_eq!(mock.complete(&req).await.unwrap().text, "first");
        assert!(mock.complete(&req).await.is_err());
        assert!(mock.complete(&req).await.unwrap().is_blank());
        assert_eq!(mock.requests().len(), 3);
    }
}
