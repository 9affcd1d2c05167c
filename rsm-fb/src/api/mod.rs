//! HTTP API handlers for rsm-fb

pub mod buildinfo;
pub mod evaluation;
pub mod feedback;
pub mod health;
pub mod reviews;
pub mod ui;

pub use buildinfo::get_build_info;
pub use evaluation::evaluation_routes;
pub use feedback::feedback_routes;
pub use health::health_routes;
pub use reviews::review_routes;
pub use ui::{serve_app_js, serve_index};
