//! HTTP API handlers for rsm-rs

pub mod health;
pub mod reviews;

pub use health::health_routes;
pub use reviews::review_routes;
