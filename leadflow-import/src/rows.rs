//! CSV row parsing for bulk import
//!
//! Header names are matched literally (case-sensitive, exact spelling).
//! Expected columns: `ID`, `tags`, `msg`, `First Name`, `Last Name`,
//! `Property Address`, `Property City`, `Property State`, `Property Zip`,
//! `Business Name`, `Mailing Address`, plus any number of `Phone…`-prefixed
//! columns.

use leadflow_common::{Error, Result};
use thiserror::Error as ThisError;

pub const COL_FIRST_NAME: &str = "First Name";
pub const COL_LAST_NAME: &str = "Last Name";
pub const COL_PROPERTY_ADDRESS: &str = "Property Address";
pub const COL_PROPERTY_CITY: &str = "Property City";
pub const COL_PROPERTY_STATE: &str = "Property State";
pub const COL_PROPERTY_ZIP: &str = "Property Zip";
pub const COL_BUSINESS_NAME: &str = "Business Name";
pub const COL_MAILING_ADDRESS: &str = "Mailing Address";
pub const COL_TAGS: &str = "tags";

/// Column-name prefix identifying phone columns (`Phone 1`, `Phone 2`, ...)
pub const PHONE_COLUMN_PREFIX: &str = "Phone";

/// Default for blank city/state/zip fields
pub const UNKNOWN: &str = "Unknown";

/// One validated row of uploaded tabular data; consumed once, never persisted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRow {
    pub first_name: String,
    pub last_name: String,
    pub business_name: Option<String>,
    pub mailing_address: Option<String>,
    pub property_address: String,
    pub property_city: String,
    pub property_state: String,
    pub property_zip: String,
    pub tags: Vec<String>,
    /// Trimmed, non-empty phone numbers in input column order
    pub phone_numbers: Vec<String>,
}

/// Why a single row was rejected (counted, logged, never aborts the batch)
#[derive(Debug, ThisError)]
pub enum RowError {
    #[error("row {row}: missing required field '{field}'")]
    MissingField { row: usize, field: &'static str },

    #[error("row {row}: malformed record: {source}")]
    Malformed {
        row: usize,
        #[source]
        source: csv::Error,
    },
}

/// Parse CSV bytes into per-row outcomes.
///
/// A header-level failure is a batch error; record-level failures surface as
/// `Err(RowError)` entries so one bad row never aborts the batch. Row numbers
/// are 1-based over data rows (the header is row 0).
pub fn parse_csv(data: &[u8]) -> Result<Vec<std::result::Result<ImportRow, RowError>>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(data);

    let headers = reader
        .headers()
        .map_err(|e| Error::InvalidInput(format!("Unreadable CSV header: {}", e)))?
        .clone();

    let columns = ColumnMap::from_headers(&headers);

    let mut rows = Vec::new();
    for (i, record) in reader.records().enumerate() {
        let row_number = i + 1;
        match record {
            Ok(record) => rows.push(columns.parse_record(row_number, &record)),
            Err(source) => rows.push(Err(RowError::Malformed {
                row: row_number,
                source,
            })),
        }
    }

    Ok(rows)
}

/// Header-resolved column positions
struct ColumnMap {
    first_name: Option<usize>,
    last_name: Option<usize>,
    business_name: Option<usize>,
    mailing_address: Option<usize>,
    property_address: Option<usize>,
    property_city: Option<usize>,
    property_state: Option<usize>,
    property_zip: Option<usize>,
    tags: Option<usize>,
    /// Positions of `Phone…` columns in header order
    phones: Vec<usize>,
}

impl ColumnMap {
    fn from_headers(headers: &csv::StringRecord) -> Self {
        let position = |name: &str| headers.iter().position(|h| h == name);
        Self {
            first_name: position(COL_FIRST_NAME),
            last_name: position(COL_LAST_NAME),
            business_name: position(COL_BUSINESS_NAME),
            mailing_address: position(COL_MAILING_ADDRESS),
            property_address: position(COL_PROPERTY_ADDRESS),
            property_city: position(COL_PROPERTY_CITY),
            property_state: position(COL_PROPERTY_STATE),
            property_zip: position(COL_PROPERTY_ZIP),
            tags: position(COL_TAGS),
            phones: headers
                .iter()
                .enumerate()
                .filter(|(_, h)| h.starts_with(PHONE_COLUMN_PREFIX))
                .map(|(i, _)| i)
                .collect(),
        }
    }

    fn parse_record(
        &self,
        row_number: usize,
        record: &csv::StringRecord,
    ) -> std::result::Result<ImportRow, RowError> {
        let field = |idx: Option<usize>| -> Option<String> {
            idx.and_then(|i| record.get(i))
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        let require = |idx: Option<usize>, name: &'static str| {
            field(idx).ok_or(RowError::MissingField {
                row: row_number,
                field: name,
            })
        };

        let first_name = require(self.first_name, COL_FIRST_NAME)?;
        let last_name = require(self.last_name, COL_LAST_NAME)?;
        let property_address = require(self.property_address, COL_PROPERTY_ADDRESS)?;

        let tags = field(self.tags)
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        let phone_numbers = self
            .phones
            .iter()
            .filter_map(|&i| record.get(i))
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .collect();

        Ok(ImportRow {
            first_name,
            last_name,
            business_name: field(self.business_name),
            mailing_address: field(self.mailing_address),
            property_address,
            property_city: field(self.property_city).unwrap_or_else(|| UNKNOWN.to_string()),
            property_state: field(self.property_state).unwrap_or_else(|| UNKNOWN.to_string()),
            property_zip: field(self.property_zip).unwrap_or_else(|| UNKNOWN.to_string()),
            tags,
            phone_numbers,
        })
    }
}
