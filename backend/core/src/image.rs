//! Image references carried by extraction requests.
//!
//! Callers send either base64 content (optionally as a `data:` URI) or a
//! remote link. Backends pick whichever encoding their wire format needs.

use base64::{engine::general_purpose::STANDARD, Engine};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::OcrError;

static HTTP_LINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^https?://[^\s/$.?#].[^\s]*$").unwrap());

const DEFAULT_MIME: &str = "image/jpeg";

/// The image an extraction request operates on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageRef {
    /// Base64 data, with or without a `data:<mime>;base64,` prefix.
    Inline(String),
    /// Raw image bytes.
    Bytes { data: Vec<u8>, mime: String },
    /// Remote http(s) link.
    Url(String),
}

impl ImageRef {
    /// Build from the `content` / `url` pair of an inbound request.
    ///
    /// A non-empty `url` wins; `content` holding a link is also treated as one.
    pub fn from_request(content: &str, url: Option<&str>) -> Result<Self, OcrError> {
        if let Some(url) = url.map(str::trim).filter(|u| !u.is_empty()) {
            return Ok(Self::Url(url.to_string()));
        }
        let content = content.trim();
        if content.is_empty() {
            return Err(OcrError::InvalidImage("neither content nor url was provided".into()));
        }
        if is_http_link(content) {
            return Ok(Self::Url(content.to_string()));
        }
        Ok(Self::Inline(content.to_string()))
    }

    /// MIME type of the image, sniffed for inline data.
    pub fn mime_type(&self) -> &str {
        match self {
            Self::Inline(data) => data_uri_mime(data).unwrap_or_else(|| sniff_mime(payload(data))),
            Self::Bytes { mime, .. } => mime,
            Self::Url(_) => DEFAULT_MIME,
        }
    }

    /// Render as something an `image_url` field accepts: a data URI or the link itself.
    pub fn data_uri(&self) -> String {
        match self {
            Self::Inline(data) if data.starts_with("data:") => data.clone(),
            Self::Inline(data) => format!("data:{};base64,{}", self.mime_type(), data),
            Self::Bytes { data, mime } => format!("data:{};base64,{}", mime, STANDARD.encode(data)),
            Self::Url(url) => url.clone(),
        }
    }

    /// Bare base64 payload (no `data:` prefix), or the link for remote images.
    pub fn raw_base64(&self) -> String {
        match self {
            Self::Inline(data) => payload(data).to_string(),
            Self::Bytes { data, .. } => STANDARD.encode(data),
            Self::Url(url) => url.clone(),
        }
    }

    /// Decode inline data into bytes. Remote images must be fetched by the caller.
    pub fn decode(&self) -> Result<Vec<u8>, OcrError> {
        match self {
            Self::Inline(data) => STANDARD
                .decode(payload(data).trim())
                .map_err(|e| OcrError::InvalidImage(format!("base64 decode error: {e}"))),
            Self::Bytes { data, .. } => Ok(data.clone()),
            Self::Url(url) => Err(OcrError::InvalidImage(format!(
                "remote image {url} must be downloaded before decoding"
            ))),
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Url(_))
    }
}

pub fn is_http_link(s: &str) -> bool {
    HTTP_LINK.is_match(s)
}

/// Everything after the first comma, i.e. the base64 part of a data URI.
fn payload(data: &str) -> &str {
    match data.find(',') {
        Some(idx) => &data[idx + 1..],
        None => data,
    }
}

fn data_uri_mime(data: &str) -> Option<&str> {
    let rest = data.strip_prefix("data:")?;
    let end = rest.find([';', ','])?;
    Some(&rest[..end]).filter(|m| !m.is_empty())
}

/// Guess the MIME type from the leading base64 characters of common formats.
pub fn sniff_mime(b64: &str) -> &'static str {
    let b64 = b64.trim_start();
    if b64.starts_with("iVBOR") {
        "image/png"
    } else if b64.starts_with("/9j/") {
        "image/jpeg"
    } else if b64.starts_with("R0lGOD") {
        "image/gif"
    } else if b64.starts_with("UklGR") {
        "image/webp"
    } else {
        DEFAULT_MIME
    }
}
