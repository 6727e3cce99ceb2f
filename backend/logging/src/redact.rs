//! Log Redaction Layer
//!
//! Scrubs API keys, bearer tokens, and phone numbers from strings prior to logging.

use once_cell::sync::Lazy;
use regex::Regex;

static TELEPHONE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?:\+?\d{1,3}[-.\s]?)?\(?\d{3}\)?[-.\s]?\d{3}[-.\s]?\d{4}\b").unwrap());
static API_KEY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(sk-[a-zA-Z0-9]{32,})|(AIza[0-9A-Za-z\-_]{35})|(Bearer\s+[a-zA-Z0-9\-\._~+/]+=*)").unwrap());
static QUERY_KEY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"([?&]key=)[^&\s]+").unwrap());

/// Redacts sensitive patterns in a string.
pub fn redact_sensitive_data(input: &str) -> String {
    let mut redacted = input.to_string();

    // Keys first: their digit runs would otherwise be taken for phone numbers
    redacted = API_KEY_RE.replace_all(&redacted, "[REDACTED_TOKEN]").to_string();
    redacted = QUERY_KEY_RE.replace_all(&redacted, "${1}[REDACTED_TOKEN]").to_string();

    redacted = TELEPHONE_RE.replace_all(&redacted, "[REDACTED_PHONE]").to_string();

    redacted
}
