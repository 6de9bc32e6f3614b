//! Database initialization and shared record models

pub mod init;
pub mod models;

pub use init::*;
pub use models::*;
