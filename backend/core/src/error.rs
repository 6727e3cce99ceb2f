use thiserror::Error;

/// Top-level error type for the CodeOCR gateway.
///
/// Variants are split into fatal ones, which abort the current request and
/// surface as the response message, and soft ones, which handlers turn
/// into an empty result (see [`OcrError::is_soft`]).
#[derive(Debug, Error)]
pub enum OcrError {
    #[error("transport error ({provider}): {message}")]
    Transport { provider: String, message: String },

    #[error("malformed response from {provider}: {message}")]
    Deserialization { provider: String, message: String },

    #[error("{provider} returned an empty reply")]
    EmptyReply { provider: String },

    #[error("no digits found in reply")]
    NoDigitsFound,

    #[error("no structured data in reply: {0}")]
    Extraction(String),

    #[error("unable to parse date: {0}")]
    DateParse(String),

    #[error("invalid image: {0}")]
    InvalidImage(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl OcrError {
    pub fn transport(provider: impl Into<String>, message: impl ToString) -> Self {
        Self::Transport {
            provider: provider.into(),
            message: message.to_string(),
        }
    }

    pub fn deserialization(provider: impl Into<String>, message: impl ToString) -> Self {
        Self::Deserialization {
            provider: provider.into(),
            message: message.to_string(),
        }
    }

    /// Soft errors mean "the backend answered, but with nothing usable".
    pub fn is_soft(&self) -> bool {
        matches!(
            self,
            Self::EmptyReply { .. } | Self::NoDigitsFound | Self::Extraction(_) | Self::DateParse(_)
        )
    }
}
