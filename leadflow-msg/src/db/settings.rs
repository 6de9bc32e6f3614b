//! Per-user messaging settings persistence

use leadflow_common::db::UserMessagingSettings;
use leadflow_common::Result;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

/// Load a user's settings row, if one exists
pub async fn load(
    pool: &SqlitePool,
    workspace_id: Uuid,
    user_id: &str,
) -> Result<Option<UserMessagingSettings>> {
    let row = sqlx::query(
        r#"
        SELECT user_id, workspace_id, gateway_api_key, gateway_webhook_url,
               daily_message_limit, message_window_start, message_window_end,
               phone_number_1, phone_number_2, phone_number_3, phone_number_4,
               phone_number_selection
        FROM user_settings
        WHERE user_id = ? AND workspace_id = ?
        "#,
    )
    .bind(user_id)
    .bind(workspace_id.to_string())
    .fetch_optional(pool)
    .await?;

    match row {
        Some(row) => {
            let workspace: String = row.get("workspace_id");
            Ok(Some(UserMessagingSettings {
                user_id: row.get("user_id"),
                workspace_id: Uuid::parse_str(&workspace).map_err(|e| {
                    leadflow_common::Error::Internal(format!("Bad workspace id: {}", e))
                })?,
                gateway_api_key: row.get("gateway_api_key"),
                gateway_webhook_url: row.get("gateway_webhook_url"),
                daily_message_limit: row.get("daily_message_limit"),
                message_window_start: row.get("message_window_start"),
                message_window_end: row.get("message_window_end"),
                phone_number_1: row.get("phone_number_1"),
                phone_number_2: row.get("phone_number_2"),
                phone_number_3: row.get("phone_number_3"),
                phone_number_4: row.get("phone_number_4"),
                phone_number_selection: row.get("phone_number_selection"),
            }))
        }
        None => Ok(None),
    }
}

/// Load a user's settings, falling back to the documented defaults when no
/// row exists. A query failure still propagates (the gate fails closed on it).
pub async fn load_or_default(
    pool: &SqlitePool,
    workspace_id: Uuid,
    user_id: &str,
) -> Result<UserMessagingSettings> {
    Ok(load(pool, workspace_id, user_id)
        .await?
        .unwrap_or_else(|| UserMessagingSettings::defaults(user_id.to_string(), workspace_id)))
}

/// Insert or overwrite a user's settings row
pub async fn upsert(pool: &SqlitePool, settings: &UserMessagingSettings) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO user_settings (
            user_id, workspace_id, gateway_api_key, gateway_webhook_url,
            daily_message_limit, message_window_start, message_window_end,
            phone_number_1, phone_number_2, phone_number_3, phone_number_4,
            phone_number_selection
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(user_id, workspace_id) DO UPDATE SET
            gateway_api_key = excluded.gateway_api_key,
            gateway_webhook_url = excluded.gateway_webhook_url,
            daily_message_limit = excluded.daily_message_limit,
            message_window_start = excluded.message_window_start,
            message_window_end = excluded.message_window_end,
            phone_number_1 = excluded.phone_number_1,
            phone_number_2 = excluded.phone_number_2,
            phone_number_3 = excluded.phone_number_3,
            phone_number_4 = excluded.phone_number_4,
            phone_number_selection = excluded.phone_number_selection
        "#,
    )
    .bind(&settings.user_id)
    .bind(settings.workspace_id.to_string())
    .bind(&settings.gateway_api_key)
    .bind(&settings.gateway_webhook_url)
    .bind(settings.daily_message_limit)
    .bind(&settings.message_window_start)
    .bind(&settings.message_window_end)
    .bind(&settings.phone_number_1)
    .bind(&settings.phone_number_2)
    .bind(&settings.phone_number_3)
    .bind(&settings.phone_number_4)
    .bind(&settings.phone_number_selection)
    .execute(pool)
    .await?;

    Ok(())
}
