//! Docker Hub Exporter HTTP API
//!
//! This crate provides the Axum router serving the Prometheus scrape
//! endpoint and health checks.

pub mod error;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::create_router;
pub use state::AppState;
