//! Extraction Event Logger
//!
//! One structured record per backend call (timing, outcome, reply excerpt),
//! emitted on the `ocr_events` tracing target.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::redact::redact_sensitive_data;

#[derive(Debug, Serialize)]
#[serde(tag = "type")]
pub enum OcrEvent {
    BackendCall {
        provider: String,
        operation: String,
        model: String,
        latency_ms: u64,
        tokens_used: u64,
    },
    Reply {
        provider: String,
        operation: String,
        preview: String,
    },
    Failure {
        provider: String,
        operation: String,
        error_msg: String,
    },
}

#[derive(Debug, Serialize)]
pub struct EventLogEntry {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
    pub event: OcrEvent,
}

pub struct EventLogger;

impl EventLogger {
    /// Log an extraction event, redacting free text before it reaches any sink.
    pub fn log_event(request_id: &str, mut event: OcrEvent) {
        match &mut event {
            OcrEvent::Reply { preview, .. } => {
                *preview = redact_sensitive_data(preview);
            }
            OcrEvent::Failure { error_msg, .. } => {
                *error_msg = redact_sensitive_data(error_msg);
            }
            OcrEvent::BackendCall { .. } => {}
        }

        let is_failure = matches!(event, OcrEvent::Failure { .. });
        let entry = EventLogEntry {
            request_id: request_id.into(),
            timestamp: Utc::now(),
            event,
        };

        let payload = serde_json::to_string(&entry).unwrap_or_default();
        if is_failure {
            warn!(target: "ocr_events", event = %payload, "OCR event");
        } else {
            info!(target: "ocr_events", event = %payload, "OCR event");
        }
    }
}
