//! Contact-property relationship persistence

use leadflow_common::Result;
use sqlx::SqliteConnection;
use uuid::Uuid;

/// Upsert the relationship between a contact and a property.
///
/// The table's composite primary key guarantees one row per
/// (contact, property) pair across repeated imports.
pub async fn upsert(
    conn: &mut SqliteConnection,
    contact_id: Uuid,
    property_id: Uuid,
    workspace_id: Uuid,
    relationship_type: &str,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO contact_properties (contact_id, property_id, relationship_type, workspace_id)
        VALUES (?, ?, ?, ?)
        ON CONFLICT(contact_id, property_id) DO UPDATE SET
            relationship_type = excluded.relationship_type
        "#,
    )
    .bind(contact_id.to_string())
    .bind(property_id.to_string())
    .bind(relationship_type)
    .bind(workspace_id.to_string())
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Number of relationship rows for a contact (test and reporting helper)
pub async fn count_for_contact(conn: &mut SqliteConnection, contact_id: Uuid) -> Result<i64> {
    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM contact_properties WHERE contact_id = ?")
            .bind(contact_id.to_string())
            .fetch_one(&mut *conn)
            .await?;
    Ok(count)
}
