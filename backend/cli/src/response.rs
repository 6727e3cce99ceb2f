//! The `{message, data}` envelope every endpoint answers with.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use codeocr_core::OcrError;
use serde::Serialize;
use tracing::{error, warn};

pub const OK_MESSAGE: &str = "OK";

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub message: String,
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Json<Self> {
        Json(Self {
            message: OK_MESSAGE.to_string(),
            data: Some(data),
        })
    }
}

/// Failures that end a request with a non-200 status.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Ocr(OcrError),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) | Self::Ocr(OcrError::InvalidImage(_)) => StatusCode::BAD_REQUEST,
            Self::Ocr(OcrError::Transport { .. } | OcrError::Deserialization { .. }) => {
                StatusCode::BAD_GATEWAY
            }
            Self::Ocr(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> String {
        match self {
            Self::BadRequest(msg) => msg.clone(),
            Self::Ocr(e) => e.to_string(),
        }
    }
}

impl From<OcrError> for ApiError {
    fn from(e: OcrError) -> Self {
        Self::Ocr(e)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.message();
        if status.is_server_error() {
            error!(status = %status, error = %message, "Request failed");
        } else {
            warn!(status = %status, error = %message, "Request rejected");
        }
        let body = ApiResponse::<()> {
            message,
            data: None,
        };
        (status, Json(body)).into_response()
    }
}

/// Soft failures become an empty result; everything else stays an error.
pub fn soften<T>(result: Result<T, OcrError>) -> Result<Option<T>, ApiError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.is_soft() => {
            warn!(error = %e, "Returning empty result");
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}
