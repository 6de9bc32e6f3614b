//! End-to-end import batch tests

use async_trait::async_trait;
use leadflow_common::db::{init_memory_database, Contact};
use leadflow_common::Result;
use leadflow_import::{BulkImporter, ContactMatcher, EntityTally, ImportRow};
use sqlx::SqliteConnection;
use std::sync::Arc;
use uuid::Uuid;

const HEADER: &str = "ID,tags,msg,First Name,Last Name,Property Address,Property City,Property State,Property Zip,Business Name,Mailing Address,Phone 1,Phone 2";

fn csv(lines: &[&str]) -> Vec<u8> {
    let mut data = HEADER.to_string();
    for line in lines {
        data.push('\n');
        data.push_str(line);
    }
    data.into_bytes()
}

#[tokio::test]
async fn test_import_then_reimport_tally() {
    let pool = init_memory_database().await.unwrap();
    let workspace_id = Uuid::new_v4();
    let importer = BulkImporter::new();

    let data = csv(&["1,,,Jane,Doe,123 Main St,Austin,TX,78701,,,+15550001111,"]);

    // First pass: everything is new
    let stats = importer.run(&pool, workspace_id, &data).await.unwrap();
    assert_eq!(stats.properties, EntityTally { new: 1, updated: 0 });
    assert_eq!(stats.contacts, EntityTally { new: 1, updated: 0 });
    assert_eq!(stats.relationships, 1);
    assert_eq!(stats.errors, 0);

    // Second pass: same lookup keys resolve to updates
    let stats = importer.run(&pool, workspace_id, &data).await.unwrap();
    assert_eq!(stats.properties, EntityTally { new: 0, updated: 1 });
    assert_eq!(stats.contacts, EntityTally { new: 0, updated: 1 });
    assert_eq!(stats.relationships, 1);
    assert_eq!(stats.errors, 0);
}

#[tokio::test]
async fn test_mixed_batch_tally_is_exact() {
    let pool = init_memory_database().await.unwrap();
    let workspace_id = Uuid::new_v4();
    let importer = BulkImporter::new();

    let data = csv(&[
        "1,hot,,Jane,Doe,123 Main St,Austin,TX,78701,Acme LLC,,+15550001111,",
        "2,,,John,Roe,456 Oak Ave,Dallas,TX,75001,,,+15550002222,",
        // Missing property address
        "3,,,Mary,Poe,,,,,,,+15550003333,",
        // Same contact and property as row 1
        "4,cold,,Jane,Doe,123 Main St,Austin,TX,78701,Acme LLC,,+15550001111,",
    ]);

    let stats = importer.run(&pool, workspace_id, &data).await.unwrap();
    assert_eq!(stats.contacts, EntityTally { new: 2, updated: 1 });
    assert_eq!(stats.properties, EntityTally { new: 2, updated: 1 });
    assert_eq!(stats.relationships, 3);
    assert_eq!(stats.errors, 1);

    // Row 4's tags replaced row 1's
    let tags: String = sqlx::query_scalar("SELECT tags FROM properties WHERE address = '123 Main St'")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(tags, "[\"cold\"]");
}

#[tokio::test]
async fn test_row_failure_rolls_back_all_row_writes() {
    let pool = init_memory_database().await.unwrap();
    let workspace_id = Uuid::new_v4();
    let importer = BulkImporter::new();

    // Break the relationship table: the last write of each row now fails,
    // which must roll back the row's contact and property writes too
    sqlx::query("DROP TABLE contact_properties")
        .execute(&pool)
        .await
        .unwrap();

    let data = csv(&["1,,,Jane,Doe,123 Main St,Austin,TX,78701,,,+15550001111,"]);
    let stats = importer.run(&pool, workspace_id, &data).await.unwrap();

    assert_eq!(stats.errors, 1);
    assert_eq!(stats.contacts, EntityTally::default());
    assert_eq!(stats.properties, EntityTally::default());

    let contacts: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM contacts")
        .fetch_one(&pool)
        .await
        .unwrap();
    let properties: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM properties")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!((contacts, properties), (0, 0));
}

/// Strategy that never matches: every row creates a fresh contact
struct NeverMatch;

#[async_trait]
impl ContactMatcher for NeverMatch {
    async fn find_existing(
        &self,
        _conn: &mut SqliteConnection,
        _workspace_id: Uuid,
        _row: &ImportRow,
    ) -> Result<Option<Contact>> {
        Ok(None)
    }
}

#[tokio::test]
async fn test_matching_strategy_is_pluggable() {
    let pool = init_memory_database().await.unwrap();
    let workspace_id = Uuid::new_v4();
    let importer = BulkImporter::with_matcher(Arc::new(NeverMatch));

    let data = csv(&["1,,,Jane,Doe,123 Main St,Austin,TX,78701,,,+15550001111,"]);

    importer.run(&pool, workspace_id, &data).await.unwrap();
    let stats = importer.run(&pool, workspace_id, &data).await.unwrap();

    // With matching disabled the second pass creates a duplicate contact
    // (the property still resolves by address)
    assert_eq!(stats.contacts, EntityTally { new: 1, updated: 0 });
    assert_eq!(stats.properties, EntityTally { new: 0, updated: 1 });

    let contacts: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM contacts")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(contacts, 2);
}
