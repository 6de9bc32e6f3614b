//! Database initialization
//!
//! Opens (or creates) the SQLite record store and creates all tables
//! idempotently. Every service calls this at startup; `CREATE TABLE IF NOT
//! EXISTS` makes repeated initialization safe.

use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

/// Initialize database connection and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    configure_connection(&pool).await?;
    create_all_tables(&pool).await?;

    Ok(pool)
}

/// In-memory pool for tests and ephemeral tooling; same schema as production.
///
/// Capped at one connection: each sqlite in-memory connection is its own
/// database, so a wider pool would hand out empty databases.
pub async fn init_memory_database() -> Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await?;
    configure_connection(&pool).await?;
    create_all_tables(&pool).await?;
    Ok(pool)
}

async fn configure_connection(pool: &SqlitePool) -> Result<()> {
    // Enable foreign keys
    sqlx::query("PRAGMA foreign_keys = ON").execute(pool).await?;

    // WAL allows concurrent readers with one writer
    sqlx::query("PRAGMA journal_mode = WAL").execute(pool).await?;

    sqlx::query("PRAGMA busy_timeout = 5000").execute(pool).await?;

    Ok(())
}

/// Create every leadflow table (idempotent)
pub async fn create_all_tables(pool: &SqlitePool) -> Result<()> {
    create_workspaces_table(pool).await?;
    create_contacts_table(pool).await?;
    create_phone_numbers_table(pool).await?;
    create_properties_table(pool).await?;
    create_contact_properties_table(pool).await?;
    create_message_threads_table(pool).await?;
    create_messages_table(pool).await?;
    create_property_status_history_table(pool).await?;
    create_user_settings_table(pool).await?;
    Ok(())
}

async fn create_workspaces_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS workspaces (
            guid TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}

async fn create_contacts_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS contacts (
            guid TEXT PRIMARY KEY,
            workspace_id TEXT NOT NULL,
            first_name TEXT NOT NULL,
            last_name TEXT NOT NULL,
            business_name TEXT,
            mailing_address TEXT,
            email TEXT,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Name side of the contact lookup key
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_contacts_workspace_name
         ON contacts (workspace_id, first_name, last_name)",
    )
    .execute(pool)
    .await?;
    Ok(())
}

async fn create_phone_numbers_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS phone_numbers (
            guid TEXT PRIMARY KEY,
            owner_id TEXT NOT NULL REFERENCES contacts(guid) ON DELETE CASCADE,
            workspace_id TEXT NOT NULL,
            number TEXT NOT NULL,
            number_hash TEXT NOT NULL,
            phone_type TEXT NOT NULL DEFAULT 'mobile'
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Phone side of the contact lookup key
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_phone_numbers_workspace_hash
         ON phone_numbers (workspace_id, number_hash)",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_phone_numbers_owner
         ON phone_numbers (owner_id)",
    )
    .execute(pool)
    .await?;
    Ok(())
}

async fn create_properties_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS properties (
            guid TEXT PRIMARY KEY,
            workspace_id TEXT NOT NULL,
            address TEXT NOT NULL,
            city TEXT NOT NULL DEFAULT 'Unknown',
            state TEXT NOT NULL DEFAULT 'Unknown',
            zip TEXT NOT NULL DEFAULT 'Unknown',
            mailing_address TEXT,
            tags TEXT NOT NULL DEFAULT '[]',
            status TEXT NOT NULL DEFAULT 'none',
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Property lookup key
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_properties_workspace_address
         ON properties (workspace_id, address, city, state, zip)",
    )
    .execute(pool)
    .await?;
    Ok(())
}

async fn create_contact_properties_table(pool: &SqlitePool) -> Result<()> {
    // Composite primary key: repeated import upserts, never duplicates a
    // (contact, property) pair
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS contact_properties (
            contact_id TEXT NOT NULL REFERENCES contacts(guid) ON DELETE CASCADE,
            property_id TEXT NOT NULL REFERENCES properties(guid) ON DELETE CASCADE,
            relationship_type TEXT NOT NULL DEFAULT 'owner',
            workspace_id TEXT NOT NULL,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
            PRIMARY KEY (contact_id, property_id)
        )
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}

async fn create_message_threads_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS message_threads (
            guid TEXT PRIMARY KEY,
            workspace_id TEXT NOT NULL,
            contact_id TEXT NOT NULL REFERENCES contacts(guid) ON DELETE CASCADE,
            status TEXT NOT NULL DEFAULT 'none',
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
            UNIQUE (workspace_id, contact_id)
        )
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}

async fn create_messages_table(pool: &SqlitePool) -> Result<()> {
    // created_at is written by the application as RFC3339 UTC so the daily
    // send count can compare against a local-midnight floor
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS messages (
            guid TEXT PRIMARY KEY,
            thread_id TEXT NOT NULL REFERENCES message_threads(guid) ON DELETE CASCADE,
            workspace_id TEXT NOT NULL,
            sender_id TEXT NOT NULL,
            content TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'sent',
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_messages_sender_created
         ON messages (workspace_id, sender_id, created_at)",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_messages_thread
         ON messages (thread_id)",
    )
    .execute(pool)
    .await?;
    Ok(())
}

async fn create_property_status_history_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS property_status_history (
            guid TEXT PRIMARY KEY,
            property_id TEXT NOT NULL REFERENCES properties(guid) ON DELETE CASCADE,
            status TEXT NOT NULL,
            changed_by TEXT NOT NULL,
            source TEXT NOT NULL DEFAULT 'user',
            confidence REAL,
            reasoning TEXT,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_status_history_property
         ON property_status_history (property_id)",
    )
    .execute(pool)
    .await?;
    Ok(())
}

async fn create_user_settings_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS user_settings (
            user_id TEXT NOT NULL,
            workspace_id TEXT NOT NULL,
            gateway_api_key TEXT,
            gateway_webhook_url TEXT,
            daily_message_limit INTEGER NOT NULL DEFAULT 100,
            message_window_start TEXT NOT NULL DEFAULT '08:00',
            message_window_end TEXT NOT NULL DEFAULT '21:00',
            phone_number_1 TEXT,
            phone_number_2 TEXT,
            phone_number_3 TEXT,
            phone_number_4 TEXT,
            phone_number_selection TEXT NOT NULL DEFAULT 'sequential',
            PRIMARY KEY (user_id, workspace_id)
        )
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_database_has_all_tables() {
        let pool = init_memory_database().await.unwrap();

        for table in [
            "workspaces",
            "contacts",
            "phone_numbers",
            "properties",
            "contact_properties",
            "message_threads",
            "messages",
            "property_status_history",
            "user_settings",
        ] {
            let count: i64 = sqlx::query_scalar(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?",
            )
            .bind(table)
            .fetch_one(&pool)
            .await
            .unwrap();
            assert_eq!(count, 1, "missing table {}", table);
        }
    }

    #[tokio::test]
    async fn test_create_all_tables_is_idempotent() {
        let pool = init_memory_database().await.unwrap();
        create_all_tables(&pool).await.unwrap();
        create_all_tables(&pool).await.unwrap();
    }
}
