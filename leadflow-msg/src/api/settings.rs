//! Messaging settings endpoints

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::db::settings;
use leadflow_common::db::UserMessagingSettings;

use crate::{ApiError, ApiResult, AppState};

/// Query parameters identifying whose settings to read or write
#[derive(Debug, Deserialize)]
pub struct SettingsParams {
    pub workspace_id: Uuid,
    pub user_id: String,
}

/// GET /api/settings
///
/// An unset row reads as the documented defaults.
pub async fn get_settings(
    State(state): State<AppState>,
    Query(params): Query<SettingsParams>,
) -> ApiResult<Json<UserMessagingSettings>> {
    let settings =
        settings::load_or_default(&state.db, params.workspace_id, &params.user_id).await?;
    Ok(Json(settings))
}

/// PUT /api/settings
pub async fn put_settings(
    State(state): State<AppState>,
    Query(params): Query<SettingsParams>,
    Json(mut body): Json<UserMessagingSettings>,
) -> ApiResult<Json<UserMessagingSettings>> {
    if body.daily_message_limit < 0 {
        return Err(ApiError::BadRequest(
            "daily_message_limit must be non-negative".to_string(),
        ));
    }
    // The window must parse now, not at the next gate evaluation
    leadflow_common::time::parse_window_time(&body.message_window_start)?;
    leadflow_common::time::parse_window_time(&body.message_window_end)?;

    // Identity comes from the query, never the body
    body.user_id = params.user_id;
    body.workspace_id = params.workspace_id;

    settings::upsert(&state.db, &body).await?;
    Ok(Json(body))
}

/// Build settings routes
pub fn settings_routes() -> Router<AppState> {
    Router::new().route("/api/settings", get(get_settings).put(put_settings))
}
