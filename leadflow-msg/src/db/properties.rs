//! Property status updates and history

use leadflow_common::db::{LeadStatus, PropertyStatusChange};
use leadflow_common::{Error, Result};
use sqlx::SqlitePool;
use uuid::Uuid;

/// Set a property's lead status
pub async fn set_status(pool: &SqlitePool, property_id: Uuid, status: LeadStatus) -> Result<()> {
    let result = sqlx::query(
        "UPDATE properties SET status = ?, updated_at = CURRENT_TIMESTAMP WHERE guid = ?",
    )
    .bind(status.as_str())
    .bind(property_id.to_string())
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("Property {}", property_id)));
    }
    Ok(())
}

/// Current lead status of a property
pub async fn status(pool: &SqlitePool, property_id: Uuid) -> Result<Option<LeadStatus>> {
    let status: Option<String> = sqlx::query_scalar("SELECT status FROM properties WHERE guid = ?")
        .bind(property_id.to_string())
        .fetch_optional(pool)
        .await?;
    Ok(status.map(|s| LeadStatus::parse(&s)))
}

/// Append one audit row for a status change
pub async fn record_status_change(pool: &SqlitePool, change: &PropertyStatusChange) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO property_status_history (
            guid, property_id, status, changed_by, source, confidence, reasoning, created_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, CURRENT_TIMESTAMP)
        "#,
    )
    .bind(change.guid.to_string())
    .bind(change.property_id.to_string())
    .bind(change.status.as_str())
    .bind(&change.changed_by)
    .bind(change.source.as_str())
    .bind(change.confidence)
    .bind(&change.reasoning)
    .execute(pool)
    .await?;

    Ok(())
}
