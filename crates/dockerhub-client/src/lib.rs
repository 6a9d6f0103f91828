//! Docker Hub Rate-Limit Client
//!
//! This crate provides the client for talking to the Docker Hub token
//! service and registry, and for reading the rate-limit headers returned
//! on a manifest request.

pub mod client;
pub mod error;
pub mod limits;
pub mod source;

pub use client::{DockerHubClient, DockerHubClientConfig};
pub use error::ClientError;
pub use limits::{RateLimitSample, extract_limit, parse_limit_headers};
pub use source::LimitSource;
