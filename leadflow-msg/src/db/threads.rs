//! Message thread persistence
//!
//! One thread per (workspace, contact), created lazily on first message.

use leadflow_common::db::{LeadStatus, MessageThread};
use leadflow_common::{Error, Result};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

/// Fetch the contact's thread, creating it if missing
pub async fn ensure(
    pool: &SqlitePool,
    workspace_id: Uuid,
    contact_id: Uuid,
) -> Result<MessageThread> {
    if let Some(existing) = find(pool, workspace_id, contact_id).await? {
        return Ok(existing);
    }

    let thread = MessageThread {
        guid: Uuid::new_v4(),
        workspace_id,
        contact_id,
        status: LeadStatus::None,
    };

    sqlx::query(
        r#"
        INSERT INTO message_threads (guid, workspace_id, contact_id, status, created_at, updated_at)
        VALUES (?, ?, ?, ?, CURRENT_TIMESTAMP, CURRENT_TIMESTAMP)
        ON CONFLICT(workspace_id, contact_id) DO NOTHING
        "#,
    )
    .bind(thread.guid.to_string())
    .bind(thread.workspace_id.to_string())
    .bind(thread.contact_id.to_string())
    .bind(thread.status.as_str())
    .execute(pool)
    .await?;

    // Re-read in case a concurrent insert won the conflict
    find(pool, workspace_id, contact_id)
        .await?
        .ok_or_else(|| Error::Internal("Thread vanished after insert".to_string()))
}

/// Look up the contact's thread
pub async fn find(
    pool: &SqlitePool,
    workspace_id: Uuid,
    contact_id: Uuid,
) -> Result<Option<MessageThread>> {
    let row = sqlx::query(
        r#"
        SELECT guid, workspace_id, contact_id, status
        FROM message_threads
        WHERE workspace_id = ? AND contact_id = ?
        "#,
    )
    .bind(workspace_id.to_string())
    .bind(contact_id.to_string())
    .fetch_optional(pool)
    .await?;

    match row {
        Some(row) => {
            let guid: String = row.get("guid");
            let workspace: String = row.get("workspace_id");
            let contact: String = row.get("contact_id");
            let status: String = row.get("status");
            Ok(Some(MessageThread {
                guid: Uuid::parse_str(&guid)
                    .map_err(|e| Error::Internal(format!("Bad thread guid: {}", e)))?,
                workspace_id: Uuid::parse_str(&workspace)
                    .map_err(|e| Error::Internal(format!("Bad workspace id: {}", e)))?,
                contact_id: Uuid::parse_str(&contact)
                    .map_err(|e| Error::Internal(format!("Bad contact id: {}", e)))?,
                status: LeadStatus::parse(&status),
            }))
        }
        None => Ok(None),
    }
}

/// Update a thread's lead status
pub async fn set_status(pool: &SqlitePool, thread_id: Uuid, status: LeadStatus) -> Result<()> {
    sqlx::query(
        "UPDATE message_threads SET status = ?, updated_at = CURRENT_TIMESTAMP WHERE guid = ?",
    )
    .bind(status.as_str())
    .bind(thread_id.to_string())
    .execute(pool)
    .await?;
    Ok(())
}
