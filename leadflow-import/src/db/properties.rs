//! Property persistence

use leadflow_common::db::{LeadStatus, Property};
use leadflow_common::{Error, Result};
use sqlx::{Row, SqliteConnection};
use uuid::Uuid;

/// Find a property by its exact lookup key (address, city, state, zip)
pub async fn find_by_address(
    conn: &mut SqliteConnection,
    workspace_id: Uuid,
    address: &str,
    city: &str,
    state: &str,
    zip: &str,
) -> Result<Option<Property>> {
    let row = sqlx::query(
        r#"
        SELECT guid, workspace_id, address, city, state, zip,
               mailing_address, tags, status
        FROM properties
        WHERE workspace_id = ? AND address = ? AND city = ? AND state = ? AND zip = ?
        LIMIT 1
        "#,
    )
    .bind(workspace_id.to_string())
    .bind(address)
    .bind(city)
    .bind(state)
    .bind(zip)
    .fetch_optional(&mut *conn)
    .await?;

    match row {
        Some(row) => Ok(Some(property_from_row(&row)?)),
        None => Ok(None),
    }
}

/// Insert a new property
pub async fn insert(conn: &mut SqliteConnection, property: &Property) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO properties (
            guid, workspace_id, address, city, state, zip,
            mailing_address, tags, status, created_at, updated_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, CURRENT_TIMESTAMP, CURRENT_TIMESTAMP)
        "#,
    )
    .bind(property.guid.to_string())
    .bind(property.workspace_id.to_string())
    .bind(&property.address)
    .bind(&property.city)
    .bind(&property.state)
    .bind(&property.zip)
    .bind(&property.mailing_address)
    .bind(property.tags_json()?)
    .bind(property.status.as_str())
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Overwrite the import-managed fields of an existing property.
///
/// The tag set is fully replaced, never merged.
pub async fn update_import_fields(conn: &mut SqliteConnection, property: &Property) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE properties
        SET mailing_address = ?, tags = ?, updated_at = CURRENT_TIMESTAMP
        WHERE guid = ?
        "#,
    )
    .bind(&property.mailing_address)
    .bind(property.tags_json()?)
    .bind(property.guid.to_string())
    .execute(&mut *conn)
    .await?;

    Ok(())
}

fn property_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Property> {
    let guid: String = row.get("guid");
    let workspace_id: String = row.get("workspace_id");
    let tags_json: String = row.get("tags");
    let status: String = row.get("status");

    Ok(Property {
        guid: Uuid::parse_str(&guid)
            .map_err(|e| Error::Internal(format!("Bad property guid: {}", e)))?,
        workspace_id: Uuid::parse_str(&workspace_id)
            .map_err(|e| Error::Internal(format!("Bad workspace id: {}", e)))?,
        address: row.get("address"),
        city: row.get("city"),
        state: row.get("state"),
        zip: row.get("zip"),
        mailing_address: row.get("mailing_address"),
        tags: Property::parse_tags(&tags_json)?,
        status: LeadStatus::parse(&status),
    })
}
