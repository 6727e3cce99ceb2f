//! The three extraction operations, shared by every backend.
//!
//! An [`OcrAdapter`] pairs a [`VisionBackend`] with the prompts and
//! driving-license schema of its provider. It owns the reply handling:
//! digit scanning, JSON extraction, card-to-record translation, the
//! optional translation pass, and date normalization.

use std::sync::Arc;

use codeocr_config::CodeOcrConfig;
use codeocr_core::json_extract::preview;
use codeocr_core::{
    first_digit_run, parse_embedded, DrivingLicenseRecord, ImageRef, OcrError, PassportRecord,
    VisionBackend, VisionReply, VisionRequest, DRIVING_LICENSE_DATE_FORMAT, PASSPORT_DATE_FORMAT,
};
use codeocr_logging::{EventLogger, OcrEvent};
use serde_json::Value;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::profile::{LicenseSchema, ProviderProfile};
use crate::prompts::{self, PromptSet};

/// Output layouts for the date fields of each record type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateFormats {
    pub passport: String,
    pub driving_license: String,
}

impl Default for DateFormats {
    fn default() -> Self {
        Self {
            passport: PASSPORT_DATE_FORMAT.to_string(),
            driving_license: DRIVING_LICENSE_DATE_FORMAT.to_string(),
        }
    }
}

impl DateFormats {
    pub fn from_config(config: &CodeOcrConfig) -> Self {
        Self {
            passport: config.passport_date_format().to_string(),
            driving_license: config.driving_license_date_format().to_string(),
        }
    }
}

pub struct OcrAdapter {
    backend: Arc<dyn VisionBackend>,
    prompts: PromptSet,
    license_schema: LicenseSchema,
    translates: bool,
    formats: DateFormats,
}

impl OcrAdapter {
    pub fn new(backend: Arc<dyn VisionBackend>, profile: &ProviderProfile, formats: DateFormats) -> Self {
        Self {
            backend,
            prompts: PromptSet::for_locale(profile.locale),
            license_schema: profile.license_schema,
            translates: profile.translates,
            formats,
        }
    }

    pub fn name(&self) -> &str {
        self.backend.name()
    }

    pub fn default_model(&self) -> &str {
        self.backend.default_model()
    }

    fn model_or_default(&self, model: &str) -> String {
        let model = model.trim();
        if model.is_empty() {
            self.default_model().to_string()
        } else {
            model.to_string()
        }
    }

    /// First run of decimal digits in the reply.
    pub async fn extract_digits(&self, image: &ImageRef, model: &str) -> Result<String, OcrError> {
        let call_id = Uuid::new_v4().to_string();
        let request = VisionRequest::new(self.model_or_default(model), self.prompts.digits, image.clone());
        let reply = self.call(&call_id, "digits", &request).await?;

        first_digit_run(&reply.text)
            .map(str::to_string)
            .ok_or(OcrError::NoDigitsFound)
    }

    /// Passport fields with sex constrained to F/M and dates in the passport layout.
    pub async fn extract_passport(&self, image: &ImageRef, model: &str) -> Result<PassportRecord, OcrError> {
        let call_id = Uuid::new_v4().to_string();
        let request = VisionRequest::new(self.model_or_default(model), self.prompts.passport, image.clone());
        let reply = self.call(&call_id, "passport", &request).await?;

        let mut record: PassportRecord = parse_embedded(&reply.text)?;
        record.normalize_sex();
        record.normalize_dates(&self.formats.passport);
        Ok(record)
    }

    /// Driving-license fields in the canonical flat shape.
    ///
    /// A non-English `language` triggers a text-only translation call on
    /// providers that support it; that pass never fails the request.
    pub async fn extract_driving_license(
        &self,
        image: &ImageRef,
        model: &str,
        language: &str,
    ) -> Result<DrivingLicenseRecord, OcrError> {
        let call_id = Uuid::new_v4().to_string();
        let model = self.model_or_default(model);
        let request = VisionRequest::new(
            model.clone(),
            self.prompts.driving_license(self.license_schema),
            image.clone(),
        );
        let reply = self.call(&call_id, "driving_license", &request).await?;

        let value: Value = parse_embedded(&reply.text)?;
        let mut record = DrivingLicenseRecord::from_value(value)
            .map_err(|e| OcrError::Extraction(format!("unexpected driving license shape: {e}")))?;

        if self.translates && !prompts::is_english(language) {
            match self.translate(&call_id, &model, &record, language).await {
                Ok(translated) => record.merge_translation(translated),
                Err(e) => {
                    warn!(provider = self.name(), language, error = %e, "Translation pass failed; keeping extracted values")
                }
            }
        }

        record.normalize_dates(&self.formats.driving_license);
        Ok(record)
    }

    async fn translate(
        &self,
        call_id: &str,
        model: &str,
        record: &DrivingLicenseRecord,
        language: &str,
    ) -> Result<DrivingLicenseRecord, OcrError> {
        let record_json =
            serde_json::to_string(record).map_err(|e| OcrError::Extraction(e.to_string()))?;
        let request = VisionRequest::text_only(model, prompts::translation(&record_json, language));
        let reply = self.call(call_id, "translation", &request).await?;
        parse_embedded(&reply.text)
    }

    /// One backend round trip with event logging; blank replies are `EmptyReply`.
    async fn call(
        &self,
        call_id: &str,
        operation: &str,
        request: &VisionRequest,
    ) -> Result<VisionReply, OcrError> {
        let provider = self.name().to_string();
        debug!(provider = %provider, operation, model = %request.model, "Calling vision backend");

        let reply = match self.backend.complete(request).await {
            Ok(reply) => reply,
            Err(e) => {
                EventLogger::log_event(
                    call_id,
                    OcrEvent::Failure {
                        provider,
                        operation: operation.to_string(),
                        error_msg: e.to_string(),
                    },
                );
                return Err(e);
            }
        };

        EventLogger::log_event(
            call_id,
            OcrEvent::BackendCall {
                provider: provider.clone(),
                operation: operation.to_string(),
                model: reply.model.clone(),
                latency_ms: reply.latency_ms,
                tokens_used: reply.tokens_used,
            },
        );

        if reply.is_blank() {
            warn!(provider = %provider, operation, "Backend returned an empty reply");
            return Err(OcrError::EmptyReply { provider });
        }

        EventLogger::log_event(
            call_id,
            OcrEvent::Reply {
                provider,
                operation: operation.to_string(),
                preview: preview(&reply.text),
            },
        );
        Ok(reply)
    }
}
