use std::sync::Arc;

use axum::{
    body::Body,
    extract::{rejection::JsonRejection, State},
    http::Request,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, info_span};
use uuid::Uuid;

use codeocr_core::{DrivingLicenseRecord, ImageRef, PassportRecord};
use codeocr_providers::ProviderRegistry;

use crate::response::{soften, ApiError, ApiResponse};

/// Shared application state for API handlers.
pub struct AppState {
    pub registry: Arc<ProviderRegistry>,
}

/// Build the Axum router with all API routes.
pub fn build_router(state: Arc<AppState>) -> Router {
    let trace = TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
        info_span!(
            "http_request",
            request_id = %Uuid::new_v4(),
            method = %request.method(),
            uri = %request.uri(),
        )
    });

    Router::new()
        .route("/health", get(health))
        .route("/ocr", post(ocr_digits))
        .route("/ocr/passport", post(ocr_passport))
        .route("/ocr/driving-license", post(ocr_driving_license))
        .with_state(state)
        .layer(trace)
        .layer(CorsLayer::permissive())
}

#[derive(Debug, Deserialize)]
pub struct OcrRequest {
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub platform: String,
    #[serde(default)]
    pub model: String,
}

#[derive(Debug, Serialize)]
pub struct OcrResponse {
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct PassportRequest {
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub platform: String,
    #[serde(default)]
    pub model: String,
}

#[derive(Debug, Serialize)]
pub struct PassportResponse {
    pub passport_info: Option<PassportRecord>,
}

#[derive(Debug, Deserialize)]
pub struct DrivingLicenseRequest {
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub platform: String,
    #[serde(default)]
    pub model: String,
    #[serde(default = "default_language")]
    pub language: String,
}

fn default_language() -> String {
    "en".to_string()
}

#[derive(Debug, Serialize)]
pub struct DrivingLicenseResponse {
    pub driving_license_info: Option<DrivingLicenseRecord>,
}

/// Health check endpoint.
async fn health(State(state): State<Arc<AppState>>) -> Json<ApiResponse<serde_json::Value>> {
    ApiResponse::ok(serde_json::json!({
        "status": "ok",
        "service": "codeocr",
        "version": env!("CARGO_PKG_VERSION"),
        "default_platform": state.registry.default_name(),
        "providers": state.registry.list(),
    }))
}

/// Read the first digit run from an image.
async fn ocr_digits(
    State(state): State<Arc<AppState>>,
    body: Result<Json<OcrRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<OcrResponse>>, ApiError> {
    let Json(req) = body?;
    if req.content.trim().is_empty() {
        return Err(ApiError::BadRequest("content is required".into()));
    }
    let image = ImageRef::from_request(&req.content, None)?;
    let adapter = state.registry.resolve(&req.platform);
    info!(platform = adapter.name(), "Digit extraction");

    let digits = soften(adapter.extract_digits(&image, &req.model).await)?;
    Ok(ApiResponse::ok(OcrResponse {
        content: digits.unwrap_or_default(),
    }))
}

/// Extract passport fields.
async fn ocr_passport(
    State(state): State<Arc<AppState>>,
    body: Result<Json<PassportRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<PassportResponse>>, ApiError> {
    let Json(req) = body?;
    let image = ImageRef::from_request(&req.content, Some(&req.url))?;
    let adapter = state.registry.resolve(&req.platform);
    info!(platform = adapter.name(), remote = image.is_remote(), "Passport extraction");

    let passport_info = soften(adapter.extract_passport(&image, &req.model).await)?;
    Ok(ApiResponse::ok(PassportResponse { passport_info }))
}

/// Extract driving-license fields, optionally translated.
async fn ocr_driving_license(
    State(state): State<Arc<AppState>>,
    body: Result<Json<DrivingLicenseRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<DrivingLicenseResponse>>, ApiError> {
    let Json(req) = body?;
    let image = ImageRef::from_request(&req.content, Some(&req.url))?;
    let adapter = state.registry.resolve(&req.platform);
    info!(
        platform = adapter.name(),
        language = %req.language,
        remote = image.is_remote(),
        "Driving license extraction"
    );

    let driving_license_info = soften(
        adapter
            .extract_driving_license(&image, &req.model, &req.language)
            .await,
    )?;
    Ok(ApiResponse::ok(DrivingLicenseResponse {
        driving_license_info,
    }))
}
