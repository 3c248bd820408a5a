//! HTTP API handlers

pub mod bulk;
pub mod health;
pub mod professionals;

pub use bulk::bulk_upsert;
pub use health::health_routes;
pub use professionals::{create_professional, list_professionals};
