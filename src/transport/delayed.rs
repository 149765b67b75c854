//! File-backed delayed transport
//!
//! Aggregates queries in a local log file so many events can be shipped in
//! one pass instead of opening a connection to the API for every call.
//! Flushing is typically driven by a cron-style job:
//!
//! ```no_run
//! use kissmetrics::{Config, Delayed, DelayedConfig, DelayedTransport, HttpTransport};
//!
//! # async fn run() -> kissmetrics::Result<()> {
//! let http = HttpTransport::new(Config::default())?;
//! let transport = Delayed::new(http, DelayedConfig::new("/var/log/km"));
//! transport.send_logged_data().await?;
//! # Ok(())
//! # }
//! ```
//!
//! There is no locking: a flush racing a concurrent write can delete entries
//! appended after the flush started reading.

use crate::config::DelayedConfig;
use crate::error::{Error, Result};
use crate::query::Query;
use crate::transport::{DelayedTransport, HttpTransport, Transport};
use async_trait::async_trait;
use std::path::PathBuf;
use tokio::io::AsyncWriteExt;

/// Delayed transport that appends query batches to a local log file
///
/// Each submitted batch becomes one JSON line. A flush reads the whole file,
/// replays every query through the inner HTTP transport, then deletes the
/// file. Deletion only happens after the full batch was accepted, so a
/// mid-send failure leaves the log intact (retrying may duplicate deliveries).
pub struct Delayed {
    inner: HttpTransport,
    config: DelayedConfig,
}

impl Delayed {
    /// Build a delayed transport flushing through `inner`
    pub fn new(inner: HttpTransport, config: DelayedConfig) -> Self {
        Self { inner, config }
    }

    /// Full path to the query log file
    pub fn log_file(&self) -> PathBuf {
        self.config.log_file()
    }
}

#[async_trait]
impl Transport for Delayed {
    async fn submit_data(&self, queries: &[Query]) -> Result<()> {
        if queries.is_empty() {
            return Err(Error::NoQueries);
        }

        let stamped = stamp_queries(queries, self.config.epoch_override);
        let mut line = serde_json::to_string(&stamped)?;
        line.push('\n');

        let path = self.log_file();
        let mut file = tokio::fs::OpenOptions::new()
            .append(true)
            .create(true)
            .open(&path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;

        tracing::debug!(count = stamped.len(), path = %path.display(), "batch logged");
        Ok(())
    }
}

#[async_trait]
impl DelayedTransport for Delayed {
    async fn send_logged_data(&self) -> Result<()> {
        let path = self.log_file();
        let data = match tokio::fs::read_to_string(&path).await {
            Ok(data) => data,
            // A missing log file is an empty store
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::NoQueries);
            }
            Err(e) => return Err(e.into()),
        };

        let mut all_queries = Vec::new();
        for line in data.lines() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<Vec<Query>>(line) {
                Ok(batch) => all_queries.extend(batch),
                Err(e) => {
                    tracing::warn!(error = %e, "skipping unreadable query log line");
                }
            }
        }

        if all_queries.is_empty() {
            return Err(Error::NoQueries);
        }

        self.inner.submit_data(&all_queries).await?;

        // Cleanup so the same data is not sent again
        tokio::fs::remove_file(&path).await?;
        tracing::debug!(
            count = all_queries.len(),
            path = %path.display(),
            "query log flushed"
        );
        Ok(())
    }
}

/// Stamp queries for delayed delivery
///
/// Every query gets the `_d` flag so the API keeps the recorded timestamp
/// when the batch arrives later. Queries without a `_t` are stamped with the
/// epoch override (if configured) or the current time.
pub(crate) fn stamp_queries(queries: &[Query], epoch_override: Option<i64>) -> Vec<Query> {
    let epoch = epoch_override.unwrap_or_else(|| chrono::Utc::now().timestamp());

    queries
        .iter()
        .cloned()
        .map(|mut query| {
            query.set_use_timestamp();
            if query.timestamp().is_none() {
                query.set_timestamp(epoch);
            }
            query
        })
        .collect()
}
