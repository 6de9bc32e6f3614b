//! Contact persistence

use leadflow_common::db::{Contact, PhoneNumber};
use leadflow_common::{phone, Result};
use sqlx::{Row, SqliteConnection};
use uuid::Uuid;

/// Find a contact by exact (first name, last name) and one phone number.
///
/// The phone side matches on the normalized lookup hash, so formatting
/// differences between the CSV and stored numbers still resolve.
pub async fn find_by_name_and_phone(
    conn: &mut SqliteConnection,
    workspace_id: Uuid,
    first_name: &str,
    last_name: &str,
    phone_number: &str,
) -> Result<Option<Contact>> {
    let number_hash = phone::lookup_hash(phone_number);

    let row = sqlx::query(
        r#"
        SELECT c.guid, c.workspace_id, c.first_name, c.last_name,
               c.business_name, c.mailing_address, c.email
        FROM contacts c
        JOIN phone_numbers p ON p.owner_id = c.guid
        WHERE c.workspace_id = ?
          AND c.first_name = ?
          AND c.last_name = ?
          AND p.number_hash = ?
        LIMIT 1
        "#,
    )
    .bind(workspace_id.to_string())
    .bind(first_name)
    .bind(last_name)
    .bind(&number_hash)
    .fetch_optional(&mut *conn)
    .await?;

    match row {
        Some(row) => Ok(Some(contact_from_row(&row)?)),
        None => Ok(None),
    }
}

/// Insert a new contact
pub async fn insert(conn: &mut SqliteConnection, contact: &Contact) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO contacts (
            guid, workspace_id, first_name, last_name, business_name,
            mailing_address, email, created_at, updated_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, CURRENT_TIMESTAMP, CURRENT_TIMESTAMP)
        "#,
    )
    .bind(contact.guid.to_string())
    .bind(contact.workspace_id.to_string())
    .bind(&contact.first_name)
    .bind(&contact.last_name)
    .bind(&contact.business_name)
    .bind(&contact.mailing_address)
    .bind(&contact.email)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Overwrite the import-managed fields of an existing contact
pub async fn update_import_fields(conn: &mut SqliteConnection, contact: &Contact) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE contacts
        SET business_name = ?, mailing_address = ?, updated_at = CURRENT_TIMESTAMP
        WHERE guid = ?
        "#,
    )
    .bind(&contact.business_name)
    .bind(&contact.mailing_address)
    .bind(contact.guid.to_string())
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Replace a contact's entire phone-number set (never merged)
pub async fn replace_phone_numbers(
    conn: &mut SqliteConnection,
    owner_id: Uuid,
    workspace_id: Uuid,
    numbers: &[String],
) -> Result<()> {
    sqlx::query("DELETE FROM phone_numbers WHERE owner_id = ?")
        .bind(owner_id.to_string())
        .execute(&mut *conn)
        .await?;

    for number in numbers {
        let record = PhoneNumber::new(owner_id, workspace_id, number.clone());
        sqlx::query(
            r#"
            INSERT INTO phone_numbers (guid, owner_id, workspace_id, number, number_hash, phone_type)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(record.guid.to_string())
        .bind(record.owner_id.to_string())
        .bind(record.workspace_id.to_string())
        .bind(&record.number)
        .bind(&record.number_hash)
        .bind(&record.phone_type)
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}

/// Load the stored phone numbers for a contact (insertion order)
pub async fn phone_numbers(conn: &mut SqliteConnection, owner_id: Uuid) -> Result<Vec<String>> {
    let rows = sqlx::query("SELECT number FROM phone_numbers WHERE owner_id = ? ORDER BY rowid")
        .bind(owner_id.to_string())
        .fetch_all(&mut *conn)
        .await?;

    Ok(rows.iter().map(|r| r.get("number")).collect())
}

fn contact_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Contact> {
    let guid: String = row.get("guid");
    let workspace_id: String = row.get("workspace_id");

    Ok(Contact {
        guid: Uuid::parse_str(&guid)
            .map_err(|e| leadflow_common::Error::Internal(format!("Bad contact guid: {}", e)))?,
        workspace_id: Uuid::parse_str(&workspace_id)
            .map_err(|e| leadflow_common::Error::Internal(format!("Bad workspace id: {}", e)))?,
        first_name: row.get("first_name"),
        last_name: row.get("last_name"),
        business_name: row.get("business_name"),
        mailing_address: row.get("mailing_address"),
        email: row.get("email"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use leadflow_common::db::init_memory_database;

    #[tokio::test]
    async fn test_insert_and_find_by_name_and_phone() {
        let pool = init_memory_database().await.unwrap();
        let mut conn = pool.acquire().await.unwrap();
        let workspace_id = Uuid::new_v4();

        let mut contact = Contact::new(workspace_id, "Jane".into(), "Doe".into());
        contact.email = Some(Contact::placeholder_email("Jane", "Doe"));
        insert(&mut conn, &contact).await.unwrap();
        replace_phone_numbers(
            &mut conn,
            contact.guid,
            workspace_id,
            &["+15550001111".to_string()],
        )
        .await
        .unwrap();

        let found = find_by_name_and_phone(&mut conn, workspace_id, "Jane", "Doe", "+15550001111")
            .await
            .unwrap()
            .expect("contact not found");
        assert_eq!(found.guid, contact.guid);
        assert_eq!(found.email.as_deref(), Some("jane.doe@example.com"));
    }

    #[tokio::test]
    async fn test_find_matches_differently_formatted_number() {
        let pool = init_memory_database().await.unwrap();
        let mut conn = pool.acquire().await.unwrap();
        let workspace_id = Uuid::new_v4();

        let contact = Contact::new(workspace_id, "Jane".into(), "Doe".into());
        insert(&mut conn, &contact).await.unwrap();
        replace_phone_numbers(
            &mut conn,
            contact.guid,
            workspace_id,
            &["+1 (555) 000-1111".to_string()],
        )
        .await
        .unwrap();

        let found = find_by_name_and_phone(&mut conn, workspace_id, "Jane", "Doe", "15550001111")
            .await
            .unwrap();
        assert!(found.is_some());
    }

    #[tokio::test]
    async fn test_find_is_workspace_scoped() {
        let pool = init_memory_database().await.unwrap();
        let mut conn = pool.acquire().await.unwrap();
        let workspace_a = Uuid::new_v4();
        let workspace_b = Uuid::new_v4();

        let contact = Contact::new(workspace_a, "Jane".into(), "Doe".into());
        insert(&mut conn, &contact).await.unwrap();
        replace_phone_numbers(
            &mut conn,
            contact.guid,
            workspace_a,
            &["15550001111".to_string()],
        )
        .await
        .unwrap();

        let found = find_by_name_and_phone(&mut conn, workspace_b, "Jane", "Doe", "15550001111")
            .await
            .unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_replace_phone_numbers_drops_old_set() {
        let pool = init_memory_database().await.unwrap();
        let mut conn = pool.acquire().await.unwrap();
        let workspace_id = Uuid::new_v4();

        let contact = Contact::new(workspace_id, "Jane".into(), "Doe".into());
        insert(&mut conn, &contact).await.unwrap();

        replace_phone_numbers(
            &mut conn,
            contact.guid,
            workspace_id,
            &["111".to_string(), "222".to_string()],
        )
        .await
        .unwrap();
        replace_phone_numbers(&mut conn, contact.guid, workspace_id, &["333".to_string()])
            .await
            .unwrap();

        let numbers = phone_numbers(&mut conn, contact.guid).await.unwrap();
        assert_eq!(numbers, vec!["333"]);
    }
}
