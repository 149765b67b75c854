//! Query delivery transports
//!
//! A [`Transport`] accepts a batch of queries for delivery. The immediate
//! [`HttpTransport`] ships each query to the tracking API as it is submitted;
//! the delayed transports persist queries locally (log file or Redis list)
//! and ship them later when [`DelayedTransport::send_logged_data`] is called,
//! usually from a cron-style job.

use crate::error::Result;
use crate::query::Query;
use async_trait::async_trait;

mod delayed;
mod http;
#[cfg(feature = "redis")]
mod redis;

pub use delayed::Delayed;
pub use http::HttpTransport;
#[cfg(feature = "redis")]
pub use self::redis::DelayedRedis;

/// Interface responsible for accepting queued queries for delivery
#[async_trait]
pub trait Transport: Send + Sync {
    /// Deliver or persist a batch of queries, in order
    async fn submit_data(&self, queries: &[Query]) -> Result<()>;
}

/// A transport that persists queries locally for later batch delivery
#[async_trait]
pub trait DelayedTransport: Transport {
    /// Replay every persisted query to the tracking API, then clean up the
    /// store so the same data is not sent twice
    async fn send_logged_data(&self) -> Result<()>;
}
