//! Locate the JSON object embedded in a model's free-text reply.
//!
//! Models wrap answers in prose, markdown fences, or both. Extraction order:
//! a ```` ```json ```` fence, then the span from the first `{` to the last
//! `}`, then the whole text as a last resort.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::DeserializeOwned;

use crate::error::OcrError;

static JSON_FENCE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)```json\s*(.*?)\s*```").unwrap());

/// Return the raw JSON candidate embedded in `text`, or `None` for a blank reply.
pub fn extract_json(text: &str) -> Option<&str> {
    if let Some(inner) = JSON_FENCE.captures(text).and_then(|caps| caps.get(1)) {
        return Some(inner.as_str().trim());
    }

    // First `{` to last `}` keeps one level of nesting intact.
    if let (Some(start), Some(end)) = (text.find('{'), text.rfind('}')) {
        if end > start {
            return Some(&text[start..=end]);
        }
    }

    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

/// Extract and deserialize the embedded object.
///
/// Both "nothing found" and "found but does not match `T`" are reported as
/// [`OcrError::Extraction`], which callers treat as an empty result.
pub fn parse_embedded<T: DeserializeOwned>(text: &str) -> Result<T, OcrError> {
    let candidate =
        extract_json(text).ok_or_else(|| OcrError::Extraction("reply was empty".into()))?;
    serde_json::from_str(candidate).map_err(|e| OcrError::Extraction(format!("{e}: {}", preview(candidate))))
}

/// Short single-line excerpt for logs and error messages.
pub fn preview(text: &str) -> String {
    const MAX: usize = 120;
    let flat: String = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= MAX {
        flat
    } else {
        let cut: String = flat.chars().take(MAX).collect();
        format!("{cut}…")
    }
}
