//! Contact matching strategies
//!
//! Create-vs-update for contacts has no natural key, so resolution goes
//! through a pluggable strategy. Stricter policies (require every phone
//! number, or a stable external id) can be substituted without touching the
//! importer's control flow.

use crate::db::contacts;
use crate::rows::ImportRow;
use async_trait::async_trait;
use leadflow_common::db::Contact;
use leadflow_common::Result;
use sqlx::SqliteConnection;
use uuid::Uuid;

/// Strategy deciding whether an import row refers to an existing contact
#[async_trait]
pub trait ContactMatcher: Send + Sync {
    async fn find_existing(
        &self,
        conn: &mut SqliteConnection,
        workspace_id: Uuid,
        row: &ImportRow,
    ) -> Result<Option<Contact>>;
}

/// Default strategy: exact (first name, last name) plus any of the row's
/// phone numbers, probed in input order. The first hit wins; ties beyond that
/// are not disambiguated.
pub struct NamePhoneMatcher;

#[async_trait]
impl ContactMatcher for NamePhoneMatcher {
    async fn find_existing(
        &self,
        conn: &mut SqliteConnection,
        workspace_id: Uuid,
        row: &ImportRow,
    ) -> Result<Option<Contact>> {
        for phone in &row.phone_numbers {
            let hit = contacts::find_by_name_and_phone(
                conn,
                workspace_id,
                &row.first_name,
                &row.last_name,
                phone,
            )
            .await?;
            if hit.is_some() {
                return Ok(hit);
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use leadflow_common::db::init_memory_database;

    fn row_with_phones(phones: &[&str]) -> ImportRow {
        ImportRow {
            first_name: "Jane".into(),
            last_name: "Doe".into(),
            business_name: None,
            mailing_address: None,
            property_address: "123 Main St".into(),
            property_city: "Austin".into(),
            property_state: "TX".into(),
            property_zip: "78701".into(),
            tags: Vec::new(),
            phone_numbers: phones.iter().map(|p| p.to_string()).collect(),
        }
    }

    #[tokio::test]
    async fn test_no_phones_never_matches() {
        let pool = init_memory_database().await.unwrap();
        let mut conn = pool.acquire().await.unwrap();
        let workspace_id = Uuid::new_v4();

        let contact = Contact::new(workspace_id, "Jane".into(), "Doe".into());
        contacts::insert(&mut conn, &contact).await.unwrap();
        contacts::replace_phone_numbers(&mut conn, contact.guid, workspace_id, &["111".into()])
            .await
            .unwrap();

        let matched = NamePhoneMatcher
            .find_existing(&mut conn, workspace_id, &row_with_phones(&[]))
            .await
            .unwrap();
        assert!(matched.is_none());
    }

    #[tokio::test]
    async fn test_first_phone_hit_wins() {
        let pool = init_memory_database().await.unwrap();
        let mut conn = pool.acquire().await.unwrap();
        let workspace_id = Uuid::new_v4();

        // Two stored contacts with the same name, distinct numbers
        let first = Contact::new(workspace_id, "Jane".into(), "Doe".into());
        contacts::insert(&mut conn, &first).await.unwrap();
        contacts::replace_phone_numbers(&mut conn, first.guid, workspace_id, &["111".into()])
            .await
            .unwrap();

        let second = Contact::new(workspace_id, "Jane".into(), "Doe".into());
        contacts::insert(&mut conn, &second).await.unwrap();
        contacts::replace_phone_numbers(&mut conn, second.guid, workspace_id, &["222".into()])
            .await
            .unwrap();

        // Row lists 222 before 111: the 222 owner is the match
        let matched = NamePhoneMatcher
            .find_existing(&mut conn, workspace_id, &row_with_phones(&["222", "111"]))
            .await
            .unwrap()
            .expect("expected a match");
        assert_eq!(matched.guid, second.guid);
    }

    #[tokio::test]
    async fn test_name_mismatch_blocks_phone_match() {
        let pool = init_memory_database().await.unwrap();
        let mut conn = pool.acquire().await.unwrap();
        let workspace_id = Uuid::new_v4();

        let contact = Contact::new(workspace_id, "John".into(), "Roe".into());
        contacts::insert(&mut conn, &contact).await.unwrap();
        contacts::replace_phone_numbers(&mut conn, contact.guid, workspace_id, &["111".into()])
            .await
            .unwrap();

        let matched = NamePhoneMatcher
            .find_existing(&mut conn, workspace_id, &row_with_phones(&["111"]))
            .await
            .unwrap();
        assert!(matched.is_none());
    }
}
