//! Messaging endpoints: eligibility check and gated send

use axum::{
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::gate::{self, Verdict};
use crate::send::{self, SendError, SendOutcome, SendRequest};
use crate::{ApiError, ApiResult, AppState};

/// Query parameters for an eligibility check
#[derive(Debug, Deserialize)]
pub struct EligibilityParams {
    pub workspace_id: Uuid,
    /// Absent or blank reads as unauthenticated (denied)
    pub user_id: Option<String>,
}

/// GET /api/messages/eligibility
///
/// Read-only; both denial reasons are surfaced verbatim so the composer can
/// explain why sending is blocked.
pub async fn check_eligibility(
    State(state): State<AppState>,
    Query(params): Query<EligibilityParams>,
) -> Json<Verdict> {
    let verdict = gate::can_send(
        &state.db,
        params.workspace_id,
        params.user_id.as_deref(),
    )
    .await;
    Json(verdict)
}

/// POST /api/messages/send
pub async fn send_message(
    State(state): State<AppState>,
    Json(req): Json<SendRequest>,
) -> ApiResult<Json<SendOutcome>> {
    if req.content.trim().is_empty() {
        return Err(ApiError::BadRequest("Message content is empty".to_string()));
    }
    if req.to.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "No destination phone number".to_string(),
        ));
    }

    let outcome = send::send_message(&state, req).await.map_err(|e| match e {
        SendError::Blocked { reason } => ApiError::Conflict(reason),
        SendError::Transport(msg) => ApiError::Internal(format!("Send failed: {}", msg)),
        SendError::Store(err) => err.into(),
    })?;

    Ok(Json(outcome))
}

/// Build messaging routes
pub fn message_routes() -> Router<AppState> {
    Router::new()
        .route("/api/messages/eligibility", get(check_eligibility))
        .route("/api/messages/send", post(send_message))
}
