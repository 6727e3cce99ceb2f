//! Structured logging for the CodeOCR gateway.
//!
//! Handles log redaction, JSON output generation, file rotation, and per-request extraction events.

pub mod event_logger;
pub mod logger;
pub mod redact;

pub use event_logger::{EventLogEntry, EventLogger, OcrEvent};
pub use logger::init_logger;
pub use redact::redact_sensitive_data;
