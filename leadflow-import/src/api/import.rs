//! Bulk import endpoint
//!
//! `POST /api/import?workspace_id=…` with a `text/csv` body runs one import
//! batch and returns the tally. Row-level failures are reflected in the
//! tally's error count, never as an HTTP failure.

use axum::{
    body::Bytes,
    extract::{Query, State},
    routing::post,
    Json, Router,
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::importer::{BulkImporter, ImportStats};
use crate::{ApiError, ApiResult, AppState};

/// Query parameters for an import batch
#[derive(Debug, Deserialize)]
pub struct ImportParams {
    /// Workspace the imported records belong to
    pub workspace_id: Uuid,
}

/// POST /api/import handler
pub async fn run_import(
    State(state): State<AppState>,
    Query(params): Query<ImportParams>,
    body: Bytes,
) -> ApiResult<Json<ImportStats>> {
    if body.is_empty() {
        return Err(ApiError::BadRequest("Empty CSV body".to_string()));
    }

    info!(
        workspace_id = %params.workspace_id,
        bytes = body.len(),
        "Starting import batch"
    );

    let importer = BulkImporter::new();
    let stats = importer.run(&state.db, params.workspace_id, &body).await?;

    Ok(Json(stats))
}

/// Build import routes
pub fn import_routes() -> Router<AppState> {
    Router::new().route("/api/import", post(run_import))
}
