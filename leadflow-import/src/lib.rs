//! leadflow-import library interface
//!
//! Bulk reconciliation import: CSV rows in, reconciled contact/property/
//! relationship records out, with an exact batch tally. Exposed as a library
//! for integration testing and embedding; `main.rs` wraps it in an HTTP
//! service.

pub mod api;
pub mod db;
pub mod error;
pub mod importer;
pub mod matcher;
pub mod rows;

pub use crate::error::{ApiError, ApiResult};
pub use crate::importer::{BulkImporter, EntityTally, ImportStats};
pub use crate::matcher::{ContactMatcher, NamePhoneMatcher};
pub use crate::rows::{ImportRow, RowError};

use axum::Router;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tower_http::trace::TraceLayer;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Record store connection pool
    pub db: SqlitePool,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(db: SqlitePool) -> Self {
        Self {
            db,
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::import_routes())
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
