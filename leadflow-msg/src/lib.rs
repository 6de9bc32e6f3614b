//! leadflow-msg library interface
//!
//! Messaging service: eligibility gate (send window + daily limit), gated
//! outbound send pipeline, message/thread persistence, and classification
//! write-back. Exposed as a library for integration testing and embedding;
//! `main.rs` wraps it in an HTTP service.

pub mod api;
pub mod classifier;
pub mod db;
pub mod error;
pub mod gate;
pub mod send;
pub mod transport;

pub use crate::classifier::{Classification, MessageClassifier, WRITEBACK_CONFIDENCE_THRESHOLD};
pub use crate::error::{ApiError, ApiResult};
pub use crate::gate::{GateConfig, Verdict};
pub use crate::send::{SendOutcome, SendRequest};
pub use crate::transport::{DeliveryOutcome, SmsTransport};

use axum::Router;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Record store connection pool
    pub db: SqlitePool,
    /// Outbound SMS collaborator
    pub transport: Arc<dyn SmsTransport>,
    /// Lead-status classification collaborator
    pub classifier: Arc<dyn MessageClassifier>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(
        db: SqlitePool,
        transport: Arc<dyn SmsTransport>,
        classifier: Arc<dyn MessageClassifier>,
    ) -> Self {
        Self {
            db,
            transport,
            classifier,
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::message_routes())
        .merge(api::property_routes())
        .merge(api::settings_routes())
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
