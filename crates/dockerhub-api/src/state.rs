//! Application state

use dockerhub_core::LimitCollector;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub collector: Arc<LimitCollector>,
}

impl AppState {
    pub fn new(collector: Arc<LimitCollector>) -> Self {
        Self { collector }
    }
}
