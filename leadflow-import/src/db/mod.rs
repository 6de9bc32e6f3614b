//! Record-store operations for bulk import
//!
//! All functions take `&mut SqliteConnection` so the importer can run every
//! write for one row inside a single transaction.

pub mod contacts;
pub mod properties;
pub mod relationships;
