//! Manual property status changes

use axum::{
    extract::{Path, State},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::{properties, threads};
use leadflow_common::db::{LeadStatus, PropertyStatusChange};

use crate::{ApiError, ApiResult, AppState};

/// Request body for a manual status change
#[derive(Debug, Deserialize)]
pub struct SetStatusRequest {
    pub workspace_id: Uuid,
    pub user_id: String,
    pub status: LeadStatus,
    /// When the change came out of a conversation, the contact whose thread
    /// should mirror the new status
    pub contact_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct SetStatusResponse {
    pub property_id: Uuid,
    pub status: LeadStatus,
}

/// POST /api/properties/:property_id/status
pub async fn set_property_status(
    State(state): State<AppState>,
    Path(property_id): Path<Uuid>,
    Json(req): Json<SetStatusRequest>,
) -> ApiResult<Json<SetStatusResponse>> {
    if req.status == LeadStatus::None {
        return Err(ApiError::BadRequest(
            "Status must be one of interested, not_interested, dnc".to_string(),
        ));
    }
    if req.user_id.trim().is_empty() {
        return Err(ApiError::BadRequest("Missing user_id".to_string()));
    }

    properties::set_status(&state.db, property_id, req.status).await?;

    let change = PropertyStatusChange::user(property_id, req.status, req.user_id.clone());
    properties::record_status_change(&state.db, &change).await?;

    if let Some(contact_id) = req.contact_id {
        if let Some(thread) = threads::find(&state.db, req.workspace_id, contact_id).await? {
            threads::set_status(&state.db, thread.guid, req.status).await?;
        }
    }

    Ok(Json(SetStatusResponse {
        property_id,
        status: req.status,
    }))
}

/// Build property routes
pub fn property_routes() -> Router<AppState> {
    Router::new().route("/api/properties/:property_id/status", post(set_property_status))
}
