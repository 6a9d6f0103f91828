//! API routes

mod health;
mod metrics;

use axum::Router;

use crate::state::AppState;

/// Create the main router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .merge(health::routes())
        // Prometheus scrape endpoint
        .merge(metrics::routes())
        .with_state(state)
}
