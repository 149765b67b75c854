//! # kissmetrics
//!
//! Async client library for the KISSmetrics event tracking API.
//!
//! ## Design Philosophy
//!
//! - **Library-first** - No CLI or UI, purely a Rust crate for embedding
//! - **Explicit state** - No singletons or process-wide statics; everything
//!   hangs off a [`Client`] and a transport you construct
//! - **Pluggable delivery** - Ship queries immediately per call, or persist
//!   them to a log file or Redis list and flush them later in one pass
//!
//! ## Quick Start
//!
//! ```no_run
//! use kissmetrics::{Client, Config, HttpTransport};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let transport = HttpTransport::new(Config::default())?;
//!     let mut client = Client::new("my-api-key");
//!
//!     client
//!         .identify("bob@example.com")
//!         .record("Signed up", vec![("plan".into(), "pro".into())], None)?;
//!
//!     client.submit(&transport).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Delayed delivery
//!
//! High-traffic applications usually batch: record through a [`Delayed`] (or
//! [`DelayedRedis`]) transport, then flush from a cron-style job with
//! [`DelayedTransport::send_logged_data`]. Flushing is all-or-nothing; a
//! failed flush leaves the store intact and the next attempt resends it.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Fluent recording API
pub mod client;
/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// Query data model and wire encoding
pub mod query;
/// Query delivery transports
pub mod transport;

// Re-export commonly used types
pub use client::Client;
pub use config::{Config, DelayedConfig, RedisConfig};
pub use error::{Error, Result};
pub use query::{Kind, Query, Value};
#[cfg(feature = "redis")]
pub use transport::DelayedRedis;
pub use transport::{Delayed, DelayedTransport, HttpTransport, Transport};
