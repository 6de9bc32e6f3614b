//! Message persistence and the daily send count

use chrono::{DateTime, Utc};
use leadflow_common::db::MessageRecord;
use leadflow_common::Result;
use sqlx::SqlitePool;
use uuid::Uuid;

/// Store a message. `created_at` is written as RFC3339 UTC so the daily
/// count's midnight floor compares correctly.
pub async fn insert(pool: &SqlitePool, message: &MessageRecord) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO messages (guid, thread_id, workspace_id, sender_id, content, status, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(message.guid.to_string())
    .bind(message.thread_id.to_string())
    .bind(message.workspace_id.to_string())
    .bind(&message.sender_id)
    .bind(&message.content)
    .bind(message.status.as_str())
    .bind(message.created_at.to_rfc3339())
    .execute(pool)
    .await?;

    Ok(())
}

/// Messages the user has actually sent since the given floor.
///
/// Failed transport attempts are stored but do not consume the daily limit.
pub async fn count_sent_since(
    pool: &SqlitePool,
    workspace_id: Uuid,
    sender_id: &str,
    since: DateTime<Utc>,
) -> Result<i64> {
    let count: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*)
        FROM messages
        WHERE workspace_id = ? AND sender_id = ? AND status != 'failed' AND created_at >= ?
        "#,
    )
    .bind(workspace_id.to_string())
    .bind(sender_id)
    .bind(since.to_rfc3339())
    .fetch_one(pool)
    .await?;

    Ok(count)
}
