//! Character import/export API routes

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use std::sync::Arc;

use super::character_routes::parse_character_id;
use super::error_response;
use crate::application::dto::ExportQueryDto;
use crate::application::services::{ImportSummary, TransferService};
use crate::infrastructure::export::ExportFormat;
use crate::infrastructure::state::AppState;

/// Export a character as a JSON document (for download)
pub async fn export_character(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(query): Query<ExportQueryDto>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let id = parse_character_id(&id)?;
    let format = match query.format.as_deref() {
        Some(raw) => ExportFormat::parse(raw).ok_or_else(|| {
            (
                StatusCode::BAD_REQUEST,
                format!("Unknown export format: {}", raw),
            )
        })?,
        None => ExportFormat::default(),
    };

    let json = state
        .transfer_service
        .export_character(id, format)
        .await
        .map_err(error_response)?;

    Ok(([(header::CONTENT_TYPE, "application/json")], json))
}

/// Import a character document in any supported format
pub async fn import_character(
    State(state): State<Arc<AppState>>,
    body: String,
) -> Result<(StatusCode, Json<ImportSummary>), (StatusCode, String)> {
    let summary = state
        .transfer_service
        .import_character(&body)
        .await
        .map_err(error_response)?;

    Ok((StatusCode::CREATED, Json(summary)))
}
