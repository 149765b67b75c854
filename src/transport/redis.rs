//! Redis-backed delayed transport
//!
//! Same aggregate-then-flush semantics as the file-backed transport, but each
//! query is pushed individually onto a Redis list. Useful when multiple app
//! servers share one query store: list pushes are atomic, so concurrent
//! writers are safe (a flush racing a write is still not).

use crate::config::RedisConfig;
use crate::error::{Error, Result};
use crate::query::Query;
use crate::transport::delayed::stamp_queries;
use crate::transport::{DelayedTransport, HttpTransport, Transport};
use async_trait::async_trait;
use redis::AsyncCommands;

/// Delayed transport that aggregates queries in a Redis list
///
/// Queries live at `<prefix>_events`, one JSON entry per query. A flush reads
/// the entire list, replays it through the inner HTTP transport, and deletes
/// the key only after the whole batch was accepted. There is no per-entry
/// acknowledgment: a crash mid-send means the next flush resends everything.
#[derive(Debug)]
pub struct DelayedRedis {
    inner: HttpTransport,
    client: redis::Client,
    config: RedisConfig,
}

impl DelayedRedis {
    /// Build a Redis-backed delayed transport flushing through `inner`
    pub fn new(inner: HttpTransport, config: RedisConfig) -> Result<Self> {
        let client = redis::Client::open(config.url.as_str())?;
        Ok(Self {
            inner,
            client,
            config,
        })
    }

    /// Redis key the query list lives under
    pub fn events_key(&self) -> String {
        self.config.events_key()
    }
}

#[async_trait]
impl Transport for DelayedRedis {
    async fn submit_data(&self, queries: &[Query]) -> Result<()> {
        if queries.is_empty() {
            return Err(Error::NoQueries);
        }

        let stamped = stamp_queries(queries, self.config.epoch_override);
        let key = self.events_key();
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        for query in &stamped {
            let entry = serde_json::to_string(query)?;
            let _: () = conn.rpush(&key, entry).await?;
        }

        tracing::debug!(count = stamped.len(), key = %key, "queries pushed to redis");
        Ok(())
    }
}

#[async_trait]
impl DelayedTransport for DelayedRedis {
    async fn send_logged_data(&self) -> Result<()> {
        let key = self.events_key();
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        let entries: Vec<String> = conn.lrange(&key, 0, -1).await?;
        if entries.is_empty() {
            // Nothing accumulated; flushing an empty list is a no-op
            return Ok(());
        }

        let mut all_queries = Vec::with_capacity(entries.len());
        for entry in &entries {
            if entry.is_empty() {
                continue;
            }
            match serde_json::from_str::<Query>(entry) {
                Ok(query) => all_queries.push(query),
                Err(e) => {
                    tracing::warn!(error = %e, key = %key, "skipping unreadable redis entry");
                }
            }
        }

        self.inner.submit_data(&all_queries).await?;

        // Cleanup the list so the same data is not sent again
        let _: () = conn.del(&key).await?;
        tracing::debug!(count = all_queries.len(), key = %key, "redis query log flushed");
        Ok(())
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn redis_transport(prefix: &str) -> DelayedRedis {
        let http = HttpTransport::new(Config::default()).unwrap();
        DelayedRedis::new(
            http,
            RedisConfig {
                prefix: prefix.to_string(),
                ..Default::default()
            },
        )
        .unwrap()
    }

    #[test]
    fn events_key_appends_suffix_to_prefix() {
        let transport = redis_transport("myapp");
        assert_eq!(transport.events_key(), "myapp_events");
    }

    #[test]
    fn invalid_url_is_rejected_at_construction() {
        let http = HttpTransport::new(Config::default()).unwrap();
        let err = DelayedRedis::new(
            http,
            RedisConfig {
                url: "not-a-redis-url".to_string(),
                ..Default::default()
            },
        )
        .unwrap_err();
        assert!(matches!(err, Error::Redis(_)));
    }

    #[tokio::test]
    async fn empty_submit_is_rejected_without_touching_redis() {
        // The URL points nowhere; an empty batch must fail before connecting.
        let http = HttpTransport::new(Config::default()).unwrap();
        let transport = DelayedRedis::new(
            http,
            RedisConfig {
                url: "redis://127.0.0.1:1".to_string(),
                ..Default::default()
            },
        )
        .unwrap();

        let err = transport.submit_data(&[]).await.unwrap_err();
        assert!(matches!(err, Error::NoQueries));
    }
}
