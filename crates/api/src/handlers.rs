//! API request handlers

use crate::SharedState;
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use biosaudit_analyzer::{export_file_name, to_csv_bytes, Analyzer, AnalyzerError, CatalogSnapshot, Report};
use biosaudit_database::{version_map_from_json, DatabaseError, KNOWN_MODELS};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{error, info};

#[derive(Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data: Some(data),
            error: None,
        })
    }

    pub fn err(message: impl Into<String>) -> (StatusCode, Json<Self>) {
        Self::err_with(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn err_with(status: StatusCode, message: impl Into<String>) -> (StatusCode, Json<Self>) {
        (
            status,
            Json(Self {
                success: false,
                data: None,
                error: Some(message.into()),
            }),
        )
    }
}

fn database_error(e: DatabaseError) -> Response {
    let status = match e {
        DatabaseError::NotFound(_) => StatusCode::NOT_FOUND,
        DatabaseError::Duplicate(_) => StatusCode::CONFLICT,
        DatabaseError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        _ => {
            error!("Catalog operation failed: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    ApiResponse::<()>::err_with(status, e.to_string()).into_response()
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// List all catalog entries
pub async fn list_references(State(state): State<SharedState>) -> impl IntoResponse {
    match state.store.list().await {
        Ok(entries) => ApiResponse::ok(entries).into_response(),
        Err(e) => database_error(e),
    }
}

/// Five most recently checked entries
pub async fn recent_references(State(state): State<SharedState>) -> impl IntoResponse {
    match state.store.db().recent_references(5).await {
        Ok(entries) => ApiResponse::ok(entries).into_response(),
        Err(e) => database_error(e),
    }
}

#[derive(Deserialize)]
pub struct AddReferenceRequest {
    #[serde(default)]
    vendor: String,
    model: String,
    version: String,
}

/// Add a catalog entry by hand
pub async fn add_reference(
    State(state): State<SharedState>,
    Json(req): Json<AddReferenceRequest>,
) -> impl IntoResponse {
    match state.store.add_manual(&req.vendor, &req.model, &req.version).await {
        Ok(entry) => (StatusCode::CREATED, ApiResponse::ok(entry)).into_response(),
        Err(e) => database_error(e),
    }
}

#[derive(Deserialize)]
pub struct EditReferenceRequest {
    version: String,
    #[serde(default)]
    is_old: bool,
}

/// Update an entry's latest version and support flag
pub async fn edit_reference(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
    Json(req): Json<EditReferenceRequest>,
) -> impl IntoResponse {
    match state.store.edit(id, &req.version, req.is_old).await {
        Ok(entry) => ApiResponse::ok(entry).into_response(),
        Err(e) => database_error(e),
    }
}

/// Delete a catalog entry
pub async fn delete_reference(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    match state.store.delete(id).await {
        Ok(()) => ApiResponse::ok(id).into_response(),
        Err(e) => database_error(e),
    }
}

#[derive(Serialize)]
struct ImportResult {
    updated: usize,
}

/// Merge a `{"Model": "Version"}` object into the catalog
pub async fn import_references(
    State(state): State<SharedState>,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    let incoming = match version_map_from_json(body) {
        Ok(map) => map,
        Err(e) => return database_error(e),
    };

    match state.store.import(incoming).await {
        Ok(updated) => ApiResponse::ok(ImportResult { updated }).into_response(),
        Err(e) => database_error(e),
    }
}

/// Contents of the JSON mirror
pub async fn export_references(State(state): State<SharedState>) -> impl IntoResponse {
    Json(state.store.mirror().load())
}

/// Model names suggested when adding entries
pub async fn known_models() -> impl IntoResponse {
    ApiResponse::ok(KNOWN_MODELS)
}

async fn analyze(state: &SharedState, body: &[u8]) -> Result<Report, Response> {
    let entries = state.store.list().await.map_err(database_error)?;
    let catalog = CatalogSnapshot::new(entries);

    Analyzer::analyze_bytes(body, &catalog).map_err(|e| match e {
        AnalyzerError::Inventory(_) => {
            ApiResponse::<()>::err_with(StatusCode::UNPROCESSABLE_ENTITY, e.to_string()).into_response()
        }
        other => ApiResponse::<()>::err(other.to_string()).into_response(),
    })
}

/// Build a compliance report from an uploaded inventory table
pub async fn build_report(State(state): State<SharedState>, body: Bytes) -> impl IntoResponse {
    match analyze(&state, &body).await {
        Ok(report) => {
            info!(rows = report.rows.len(), risk = report.statistics.risk.label(), "Report served");
            ApiResponse::ok(report).into_response()
        }
        Err(response) => response,
    }
}

/// Build a report and return it as a CSV download
pub async fn export_report(State(state): State<SharedState>, body: Bytes) -> impl IntoResponse {
    let report = match analyze(&state, &body).await {
        Ok(report) => report,
        Err(response) => return response,
    };

    match to_csv_bytes(&report.rows) {
        Ok(csv) => {
            let disposition = format!(
                "attachment; filename=\"{}\"",
                export_file_name(Utc::now().date_naive())
            );
            (
                [
                    (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
                    (header::CONTENT_DISPOSITION, disposition),
                ],
                csv,
            )
                .into_response()
        }
        Err(e) => {
            error!("Report export failed: {}", e);
            ApiResponse::<()>::err(e.to_string()).into_response()
        }
    }
}
