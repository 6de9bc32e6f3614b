//! Bulk reconciliation importer
//!
//! Ingests CSV rows, reconciles each against the record store (match-or-create
//! contact and property, link with a relationship), and reports an exact
//! tally. Rows are processed sequentially; each row's writes run inside one
//! transaction so a mid-row failure leaves no partial state behind.

use crate::db::{contacts, properties, relationships};
use crate::matcher::{ContactMatcher, NamePhoneMatcher};
use crate::rows::{self, ImportRow};
use leadflow_common::db::{Contact, Property};
use leadflow_common::Result;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// Relationship type recorded for imported contact-property links
const IMPORT_RELATIONSHIP_TYPE: &str = "owner";

/// Created/updated counts for one entity kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityTally {
    pub new: u64,
    pub updated: u64,
}

/// Batch summary; always produced, even when individual rows fail
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportStats {
    pub properties: EntityTally,
    pub contacts: EntityTally,
    pub relationships: u64,
    pub errors: u64,
}

/// What one committed row did (merged into the batch tally)
struct RowOutcome {
    contact_created: bool,
    property_created: bool,
}

/// Bulk reconciliation importer over a workspace's record store
pub struct BulkImporter {
    matcher: Arc<dyn ContactMatcher>,
}

impl Default for BulkImporter {
    fn default() -> Self {
        Self::new()
    }
}

impl BulkImporter {
    /// Importer with the default name-plus-phone matching strategy
    pub fn new() -> Self {
        Self {
            matcher: Arc::new(NamePhoneMatcher),
        }
    }

    /// Importer with a substituted matching strategy
    pub fn with_matcher(matcher: Arc<dyn ContactMatcher>) -> Self {
        Self { matcher }
    }

    /// Run one import batch from raw CSV bytes.
    ///
    /// Row failures (validation or write) are counted and logged; the batch
    /// never aborts. Only an unreadable header fails the whole call.
    pub async fn run(
        &self,
        pool: &SqlitePool,
        workspace_id: Uuid,
        csv_data: &[u8],
    ) -> Result<ImportStats> {
        let parsed = rows::parse_csv(csv_data)?;
        let total = parsed.len();
        let mut stats = ImportStats::default();

        for (i, outcome) in parsed.into_iter().enumerate() {
            let row = match outcome {
                Ok(row) => row,
                Err(e) => {
                    warn!("Skipping row: {}", e);
                    stats.errors += 1;
                    continue;
                }
            };

            match self.import_row(pool, workspace_id, &row).await {
                Ok(row_outcome) => {
                    if row_outcome.contact_created {
                        stats.contacts.new += 1;
                    } else {
                        stats.contacts.updated += 1;
                    }
                    if row_outcome.property_created {
                        stats.properties.new += 1;
                    } else {
                        stats.properties.updated += 1;
                    }
                    stats.relationships += 1;
                }
                Err(e) => {
                    warn!(row = i + 1, "Import row failed, rolled back: {}", e);
                    stats.errors += 1;
                }
            }
        }

        info!(
            rows = total,
            contacts_new = stats.contacts.new,
            contacts_updated = stats.contacts.updated,
            properties_new = stats.properties.new,
            properties_updated = stats.properties.updated,
            relationships = stats.relationships,
            errors = stats.errors,
            "Import batch complete"
        );

        Ok(stats)
    }

    /// Reconcile one row inside a single transaction.
    ///
    /// Contact, phone set, property, and relationship commit together; any
    /// step's failure rolls all of them back.
    async fn import_row(
        &self,
        pool: &SqlitePool,
        workspace_id: Uuid,
        row: &ImportRow,
    ) -> Result<RowOutcome> {
        let mut tx = pool.begin().await?;

        let (contact, contact_created) =
            match self.matcher.find_existing(&mut tx, workspace_id, row).await? {
                Some(mut existing) => {
                    existing.business_name = row.business_name.clone();
                    existing.mailing_address = row.mailing_address.clone();
                    contacts::update_import_fields(&mut tx, &existing).await?;
                    (existing, false)
                }
                None => {
                    let mut contact =
                        Contact::new(workspace_id, row.first_name.clone(), row.last_name.clone());
                    contact.business_name = row.business_name.clone();
                    contact.mailing_address = row.mailing_address.clone();
                    contact.email =
                        Some(Contact::placeholder_email(&row.first_name, &row.last_name));
                    contacts::insert(&mut tx, &contact).await?;
                    (contact, true)
                }
            };

        contacts::replace_phone_numbers(&mut tx, contact.guid, workspace_id, &row.phone_numbers)
            .await?;

        let (property, property_created) = match properties::find_by_address(
            &mut tx,
            workspace_id,
            &row.property_address,
            &row.property_city,
            &row.property_state,
            &row.property_zip,
        )
        .await?
        {
            Some(mut existing) => {
                existing.mailing_address = row.mailing_address.clone();
                existing.tags = row.tags.clone();
                properties::update_import_fields(&mut tx, &existing).await?;
                (existing, false)
            }
            None => {
                let mut property = Property::new(
                    workspace_id,
                    row.property_address.clone(),
                    row.property_city.clone(),
                    row.property_state.clone(),
                    row.property_zip.clone(),
                );
                property.mailing_address = row.mailing_address.clone();
                property.tags = row.tags.clone();
                properties::insert(&mut tx, &property).await?;
                (property, true)
            }
        };

        relationships::upsert(
            &mut tx,
            contact.guid,
            property.guid,
            workspace_id,
            IMPORT_RELATIONSHIP_TYPE,
        )
        .await?;

        tx.commit().await?;

        Ok(RowOutcome {
            contact_created,
            property_created,
        })
    }
}
