//! API handlers for the site documents server
//!
//! Provides REST endpoints for:
//! - Programme scan extraction (upload -> OCR -> task rows)
//! - Schedule parsing of already-recognised text
//! - Raw OCR text
//! - Induction form filling

use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;

use axum::{
    extract::{multipart::MultipartRejection, rejection::JsonRejection, Multipart, State},
    Json,
};
use form_overlay::{FieldValues, FormTemplate};
use schedule_extract::{
    diagnostics::Tee, split_ocr_lines, RecordingSink, SkippedRow, TaskRecord, TracingSink,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::ServerError;
use crate::state::AppState;

/// Multipart field names accepted for the uploaded image
const UPLOAD_FIELDS: &[&str] = &["image", "file"];

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

/// Handler: GET /health
pub async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "sitedocs-server",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Handler: POST /api/schedule/extract
///
/// Responds with a bare JSON array of rows; an empty array when the scan
/// holds no valid rows.
pub async fn handle_extract_schedule(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Vec<TaskRecord>>, ServerError> {
    let image = read_image_upload(multipart).await?;
    let text = detect_text(&state, &image).await?;

    let lines = split_ocr_lines(&text);
    let rows = state.parser.parse(&lines, &mut TracingSink);

    info!(
        "Extracted {} schedule rows from {} OCR lines",
        rows.len(),
        lines.len()
    );

    Ok(Json(rows))
}

/// Schedule parse request: exactly one of `lines` or `text`
#[derive(Debug, Deserialize)]
pub struct ParseScheduleRequest {
    pub lines: Option<Vec<String>>,
    pub text: Option<String>,
}

#[derive(Serialize)]
pub struct ParseScheduleResponse {
    pub success: bool,
    pub rows: Vec<TaskRecord>,
    pub skipped: Vec<SkippedRow>,
    pub line_count: usize,
}

/// Handler: POST /api/schedule/parse
pub async fn handle_parse_schedule(
    State(state): State<AppState>,
    body: Result<Json<ParseScheduleRequest>, JsonRejection>,
) -> Result<Json<ParseScheduleResponse>, ServerError> {
    let Json(req) = body.map_err(|e| ServerError::Validation(e.body_text()))?;

    let lines = match (req.lines, req.text) {
        (Some(lines), None) => lines,
        (None, Some(text)) => split_ocr_lines(&text),
        (Some(_), Some(_)) => {
            return Err(ServerError::Validation(
                "Provide either 'lines' or 'text', not both".to_string(),
            ))
        }
        (None, None) => {
            return Err(ServerError::Validation(
                "One of 'lines' or 'text' is required".to_string(),
            ))
        }
    };

    let mut recording = RecordingSink::new();
    let rows = {
        let mut sink = Tee {
            first: &mut TracingSink,
            second: &mut recording,
        };
        state.parser.parse(&lines, &mut sink)
    };

    debug!(
        "Parsed {} rows, skipped {} candidates",
        rows.len(),
        recording.skipped.len()
    );

    Ok(Json(ParseScheduleResponse {
        success: true,
        rows,
        skipped: recording.into_skipped(),
        line_count: lines.len(),
    }))
}

#[derive(Serialize)]
pub struct OcrTextResponse {
    pub success: bool,
    pub provider: String,
    pub text: String,
    pub lines: Vec<String>,
}

/// Handler: POST /api/ocr/text
pub async fn handle_ocr_text(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<OcrTextResponse>, ServerError> {
    let image = read_image_upload(multipart).await?;
    let text = detect_text(&state, &image).await?;
    let provider = state
        .ocr
        .as_ref()
        .map(|p| p.name().to_string())
        .unwrap_or_default();

    Ok(Json(OcrTextResponse {
        success: true,
        provider,
        lines: split_ocr_lines(&text),
        text,
    }))
}

/// Form fill request body
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FillFormRequest {
    /// Scanned form on the server's filesystem
    pub image_path: Option<String>,
    pub fields: Option<FieldValues>,
    pub checked_items: Option<Vec<String>>,
    /// Bare file name written beside the input
    pub output_name: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FillFormResponse {
    pub success: bool,
    pub output_path: String,
}

/// Handler: POST /api/forms/fill
pub async fn handle_fill_form(
    State(state): State<AppState>,
    body: Result<Json<FillFormRequest>, JsonRejection>,
) -> Result<Json<FillFormResponse>, ServerError> {
    let Json(req) = body.map_err(|e| ServerError::Validation(e.body_text()))?;

    let image_path = req
        .image_path
        .filter(|p| !p.trim().is_empty())
        .ok_or_else(|| ServerError::Validation("'imagePath' is required".to_string()))?;
    let fields = req
        .fields
        .ok_or_else(|| ServerError::Validation("'fields' is required".to_string()))?;
    let checked: HashSet<String> = req.checked_items.unwrap_or_default().into_iter().collect();

    let input = resolve_image_path(&state, &image_path)?;

    info!(
        "Form fill request: image={}, fields={}, checked={}",
        input.display(),
        fields.present().count(),
        checked.len()
    );

    let renderer = state.renderer.clone();
    let output_name = req.output_name;
    let output = tokio::task::spawn_blocking(move || {
        renderer.render_file(&input, &fields, &checked, output_name.as_deref())
    })
    .await
    .map_err(|e| ServerError::Internal(format!("Render task failed: {}", e)))??;

    Ok(Json(FillFormResponse {
        success: true,
        output_path: output.display().to_string(),
    }))
}

#[derive(Serialize)]
pub struct TemplateResponse {
    pub success: bool,
    pub font_loaded: bool,
    pub template: FormTemplate,
}

/// Handler: GET /api/forms/template
pub async fn handle_form_template(State(state): State<AppState>) -> Json<TemplateResponse> {
    Json(TemplateResponse {
        success: true,
        font_loaded: state.renderer.has_font(),
        template: state.renderer.template().clone(),
    })
}

/// First non-empty file part named in [`UPLOAD_FIELDS`]
async fn read_image_upload(
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Vec<u8>, ServerError> {
    let mut multipart = multipart.map_err(|e| ServerError::MissingUpload(e.body_text()))?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ServerError::Validation(format!("Malformed multipart body: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();
        if !UPLOAD_FIELDS.contains(&name.as_str()) {
            debug!("Ignoring multipart field '{}'", name);
            continue;
        }

        let bytes = field
            .bytes()
            .await
            .map_err(|e| ServerError::Validation(format!("Failed to read upload: {}", e)))?;
        if bytes.is_empty() {
            return Err(ServerError::MissingUpload(format!(
                "Uploaded '{}' is empty",
                name
            )));
        }
        return Ok(bytes.to_vec());
    }

    Err(ServerError::MissingUpload(
        "Expected an image file in multipart field 'image'".to_string(),
    ))
}

/// Run the configured provider under the request timeout
async fn detect_text(state: &AppState, image: &[u8]) -> Result<String, ServerError> {
    let provider = state.ocr.as_ref().ok_or(ServerError::OcrUnavailable)?;

    let text = tokio::time::timeout(
        Duration::from_millis(state.timeout_ms),
        provider.detect_text(image),
    )
    .await
    .map_err(|_| ServerError::Timeout(state.timeout_ms))??;

    text.filter(|t| !t.trim().is_empty())
        .ok_or(ServerError::NoTextDetected)
}

/// Confine `raw` to the forms root when one is configured
fn resolve_image_path(state: &AppState, raw: &str) -> Result<PathBuf, ServerError> {
    let path = PathBuf::from(raw);
    let Some(root) = &state.forms_root else {
        return Ok(path);
    };

    let canonical = path
        .canonicalize()
        .map_err(|e| ServerError::ImageDecode(format!("Cannot read {}: {}", raw, e)))?;

    if !canonical.starts_with(root) {
        return Err(ServerError::Validation(format!(
            "'{}' is outside the forms directory",
            raw
        )));
    }

    Ok(canonical)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_health_endpoint() {
        let response = handle_health().await;
        assert_eq!(response.status, "healthy");
        assert_eq!(response.service, "sitedocs-server");
    }

    #[test]
    fn test_fill_request_accepts_camel_case() {
        let req: FillFormRequest = serde_json::from_str(
            r#"{
                "imagePath": "/forms/induction.png",
                "fields": {"name": "J. Smith", "projectCode": "RS-104"},
                "checkedItems": ["Signed RAMS"],
                "outputName": "out.png"
            }"#,
        )
        .unwrap();

        assert_eq!(req.image_path.as_deref(), Some("/forms/induction.png"));
        assert_eq!(req.checked_items.unwrap(), vec!["Signed RAMS"]);
        assert_eq!(req.output_name.as_deref(), Some("out.png"));
        assert_eq!(
            req.fields.unwrap().get(form_overlay::FieldKey::ProjectCode),
            Some("RS-104")
        );
    }

    #[test]
    fn test_fill_request_optional_parts() {
        let req: FillFormRequest =
            serde_json::from_str(r#"{"imagePath": "/f.png", "fields": {}, "checkedItems": null}"#)
                .unwrap();
        assert!(req.checked_items.is_none());
        assert!(req.output_name.is_none());
    }
}
