//! Rate-limit source trait

use async_trait::async_trait;

use crate::error::ClientError;
use crate::limits::RateLimitSample;

/// Something that can produce a fresh rate-limit sample on demand
///
/// Every call is expected to hit the upstream; implementations must not
/// cache samples between calls.
#[async_trait]
pub trait LimitSource: Send + Sync {
    /// Collect a new sample
    async fn collect(&self) -> Result<RateLimitSample, ClientError>;
}
