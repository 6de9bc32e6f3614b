//! Record-store operations for the messaging service

pub mod messages;
pub mod properties;
pub mod settings;
pub mod threads;
