use std::time::Instant;

use axum::Json;
use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use metrics::{counter, histogram};
use tracing::warn;
use uuid::Uuid;

use crate::application::export::ConversionInput;
use crate::application::render::{RenderRequest, RenderTarget};
use crate::domain::document::ExportFormat;
use crate::infra::exports::ExportStoreError;

use super::error::ApiError;
use super::models::{ConversionResponse, ConvertRequest, PreviewResponse};
use crate::infra::http::AppState;

const METRIC_CONVERT_TOTAL: &str = "torchio_convert_total";
const METRIC_CONVERT_FAILED_TOTAL: &str = "torchio_convert_failed_total";
const METRIC_RENDER_DURATION_MS: &str = "torchio_render_duration_ms";

/// -------- Conversions --------
pub async fn convert_html(
    State(state): State<AppState>,
    Json(payload): Json<ConvertRequest>,
) -> Result<impl IntoResponse, ApiError> {
    counter!(METRIC_CONVERT_TOTAL, "format" => "html").increment(1);
    enforce_content_limit(&payload, state.max_content_bytes)?;

    let title = payload.document_title();
    let request = RenderRequest::new(RenderTarget::Fragment, payload.content)
        .with_title(title.clone())
        .with_settings(payload.settings.into_settings());

    let started_at = Instant::now();
    let output = state.render.render(&request).map_err(|err| {
        counter!(METRIC_CONVERT_FAILED_TOTAL, "format" => "html").increment(1);
        warn!(
            target = "infra::http::api",
            error = %err,
            "Preview rendering failed"
        );
        ApiError::render_failed()
    })?;
    histogram!(METRIC_RENDER_DURATION_MS).record(started_at.elapsed().as_secs_f64() * 1000.0);

    Ok(Json(PreviewResponse {
        success: true,
        html: output.html,
        title: title.to_string(),
    }))
}

pub async fn convert_pdf(
    State(state): State<AppState>,
    Json(payload): Json<ConvertRequest>,
) -> Result<impl IntoResponse, ApiError> {
    counter!(METRIC_CONVERT_TOTAL, "format" => "pdf").increment(1);
    enforce_content_limit(&payload, state.max_content_bytes)?;
    reject_empty_content(&payload)?;

    let title = payload.document_title();
    let input = ConversionInput::new(
        payload.content,
        title.clone(),
        payload.settings.into_settings(),
    );

    let pdf = state.pdf.generate(&input).await.map_err(|err| {
        counter!(METRIC_CONVERT_FAILED_TOTAL, "format" => "pdf").increment(1);
        warn!(
            target = "infra::http::api",
            error = %err,
            "PDF generation failed"
        );
        ApiError::export_failed(None)
    })?;

    let record = store_export(&state, &title, ExportFormat::Pdf, Bytes::from(pdf)).await?;

    Ok(Json(ConversionResponse {
        success: true,
        download_url: Some(format!("/api/download/{}", record.id)),
        message: Some("PDF generated successfully".to_string()),
    }))
}

pub async fn convert_docx(
    State(state): State<AppState>,
    Json(payload): Json<ConvertRequest>,
) -> Result<impl IntoResponse, ApiError> {
    counter!(METRIC_CONVERT_TOTAL, "format" => "docx").increment(1);
    enforce_content_limit(&payload, state.max_content_bytes)?;
    reject_empty_content(&payload)?;

    let title = payload.document_title();
    let input = ConversionInput::new(
        payload.content,
        title.clone(),
        payload.settings.into_settings(),
    );

    let docx = state.docx.generate(&input).await.map_err(|err| {
        counter!(METRIC_CONVERT_FAILED_TOTAL, "format" => "docx").increment(1);
        warn!(
            target = "infra::http::api",
            error = %err,
            "DOCX generation failed"
        );
        ApiError::export_failed(None)
    })?;

    let record = store_export(&state, &title, ExportFormat::Docx, Bytes::from(docx)).await?;

    Ok(Json(ConversionResponse {
        success: true,
        download_url: Some(format!("/api/download/{}", record.id)),
        message: Some("DOCX generated successfully".to_string()),
    }))
}

/// -------- Downloads --------
pub async fn download(
    State(state): State<AppState>,
    Path(file_id): Path<String>,
) -> Result<Response, ApiError> {
    // Malformed identifiers get the same answer as unknown ones.
    let id = Uuid::parse_str(&file_id).map_err(|_| ApiError::not_found("export not found"))?;

    let (record, data) = state.exports.open(id).await.map_err(|err| match err {
        ExportStoreError::NotFound => ApiError::not_found("export not found"),
        ExportStoreError::Io(err) => {
            warn!(
                target = "infra::http::api",
                error = %err,
                "Failed to read export from disk"
            );
            ApiError::export_failed(None)
        }
    })?;

    let mut response = Response::new(Body::from(data));
    *response.status_mut() = StatusCode::OK;
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(record.media_type()),
    );
    if let Ok(value) = HeaderValue::from_str(&record.size_bytes.to_string()) {
        headers.insert(header::CONTENT_LENGTH, value);
    }
    if let Ok(value) =
        HeaderValue::from_str(&format!("attachment; filename=\"{}\"", record.filename))
    {
        headers.insert(header::CONTENT_DISPOSITION, value);
    }

    Ok(response)
}

async fn store_export(
    state: &AppState,
    title: &crate::domain::document::DocumentTitle,
    format: ExportFormat,
    data: Bytes,
) -> Result<crate::infra::exports::ExportRecord, ApiError> {
    state.exports.store(title, format, data).await.map_err(|err| {
        counter!(METRIC_CONVERT_FAILED_TOTAL, "format" => format.as_str()).increment(1);
        warn!(
            target = "infra::http::api",
            error = %err,
            format = format.as_str(),
            "Failed to store export"
        );
        ApiError::export_failed(None)
    })
}

fn enforce_content_limit(payload: &ConvertRequest, max_bytes: u64) -> Result<(), ApiError> {
    if payload.content.len() as u64 > max_bytes {
        return Err(ApiError::invalid_input(
            "content too large",
            Some(format!("markdown content exceeds the {max_bytes} byte limit")),
        ));
    }
    Ok(())
}

fn reject_empty_content(payload: &ConvertRequest) -> Result<(), ApiError> {
    if payload.content.trim().is_empty() {
        return Err(ApiError::invalid_input(
            "content is empty",
            Some("provide markdown content to convert".to_string()),
        ));
    }
    Ok(())
}
