//! HTTP API handlers for leadflow-msg

pub mod health;
pub mod messages;
pub mod properties;
pub mod settings;

pub use health::health_routes;
pub use messages::message_routes;
pub use properties::property_routes;
pub use settings::settings_routes;
