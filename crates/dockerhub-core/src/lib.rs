//! Docker Hub Exporter Core Logic
//!
//! This crate turns rate-limit samples into Prometheus gauges and owns the
//! optional background poll.

pub mod collector;
pub mod error;

pub use collector::{
    LimitCollector, MAX_REQUESTS_METRIC, REMAINING_REQUESTS_METRIC, spawn_poll_task,
};
pub use error::CoreError;
