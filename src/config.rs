//! Configuration types for the KISSmetrics client

use serde::{Deserialize, Serialize};
use std::{path::PathBuf, time::Duration};

/// KISSmetrics API endpoint configuration
///
/// Controls where immediate (and flushed) queries are delivered. The defaults
/// point at the production tracking endpoint; tests override `host`/`port` to
/// target a mock server.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// Tracking API hostname (default: "trk.kissmetrics.com")
    #[serde(default = "default_host")]
    pub host: String,

    /// Tracking API port (default: 80)
    #[serde(default = "default_port")]
    pub port: u16,

    /// Use HTTPS instead of plain HTTP (default: false)
    #[serde(default)]
    pub tls: bool,

    /// Connect/request timeout (default: 30 seconds)
    #[serde(default = "default_timeout", with = "duration_serde")]
    pub timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            tls: false,
            timeout: default_timeout(),
        }
    }
}

/// File-backed delayed transport configuration
///
/// Queries are appended to `<log_dir>/<log_filename>` as JSON lines, one
/// serialized batch per line, until a flush ships them to the API.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DelayedConfig {
    /// Directory where the query log is stored (must exist)
    pub log_dir: PathBuf,

    /// Query log filename (default: "kissmetrics_query.log")
    #[serde(default = "default_log_filename")]
    pub log_filename: String,

    /// Fixed Unix timestamp to stamp unbatched queries with
    ///
    /// When `None`, queries without a timestamp are stamped with the current
    /// time at persist time. Setting this pins the stamp, which keeps batch
    /// contents deterministic (and testable) across a single request cycle.
    #[serde(default)]
    pub epoch_override: Option<i64>,
}

impl DelayedConfig {
    /// Configuration for a log stored in `log_dir` with the default filename
    pub fn new(log_dir: impl Into<PathBuf>) -> Self {
        Self {
            log_dir: log_dir.into(),
            log_filename: default_log_filename(),
            epoch_override: None,
        }
    }

    /// Full path to the query log file
    pub fn log_file(&self) -> PathBuf {
        self.log_dir.join(&self.log_filename)
    }
}

/// Redis-backed delayed transport configuration
///
/// Queries are pushed individually onto the list at `<prefix>_events` until a
/// flush ships them to the API and deletes the key.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RedisConfig {
    /// Redis connection URL (default: "redis://127.0.0.1:6379")
    #[serde(default = "default_redis_url")]
    pub url: String,

    /// Key prefix for the query list (default: "kissmetrics")
    #[serde(default = "default_redis_prefix")]
    pub prefix: String,

    /// Fixed Unix timestamp to stamp unbatched queries with (see
    /// [`DelayedConfig::epoch_override`])
    #[serde(default)]
    pub epoch_override: Option<i64>,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: default_redis_url(),
            prefix: default_redis_prefix(),
            epoch_override: None,
        }
    }
}

impl RedisConfig {
    /// Redis key the query list lives under
    pub fn events_key(&self) -> String {
        format!("{}_events", self.prefix)
    }
}

fn default_host() -> String {
    "trk.kissmetrics.com".to_string()
}

fn default_port() -> u16 {
    80
}

fn default_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_log_filename() -> String {
    "kissmetrics_query.log".to_string()
}

fn default_redis_url() -> String {
    "redis://127.0.0.1:6379".to_string()
}

fn default_redis_prefix() -> String {
    "kissmetrics".to_string()
}

// Duration serialization helper (seconds granularity)
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}
