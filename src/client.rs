//! Fluent recording API
//!
//! [`Client`] accumulates queries in memory as you chain calls, then ships
//! them all through a [`Transport`](crate::transport::Transport) when
//! [`submit`](Client::submit) is invoked. No network or disk I/O happens
//! before that point.

use crate::error::{Error, Result};
use crate::query::{
    KEY_API_KEY, KEY_NAME, KEY_PERSON, KEY_TIMESTAMP, KEY_USE_TIMESTAMP, Kind, Query, Value,
};
use crate::transport::Transport;

/// KISSmetrics tracking client
///
/// One client tracks one identified user at a time. Recording calls are
/// chainable and fail with a setup error until [`identify`](Client::identify)
/// has been called.
///
/// ```no_run
/// use kissmetrics::{Client, Config, HttpTransport};
///
/// # async fn run() -> kissmetrics::Result<()> {
/// let transport = HttpTransport::new(Config::default())?;
/// let mut client = Client::new("my-api-key");
///
/// client
///     .identify("bob@example.com")
///     .record("Signed up", vec![("plan".into(), "pro".into())], None)?
///     .set(vec![("eyes".into(), "blue".into())], None)?;
///
/// client.submit(&transport).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Client {
    /// API key stamped onto every query as `_k`
    key: String,
    /// Currently identified user, stamped as `_p`
    id: Option<String>,
    /// Queries queued for submission, in call order
    queries: Vec<Query>,
}

impl Client {
    /// Create a client for the given API key
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            id: None,
            queries: Vec::new(),
        }
    }

    /// API key this client was created with
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Currently identified user, if any
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Queries queued for submission
    pub fn queries(&self) -> &[Query] {
        &self.queries
    }

    /// Identify the user that subsequent calls record against
    pub fn identify(&mut self, id: impl Into<String>) -> &mut Self {
        self.id = Some(id.into());
        self
    }

    /// Alias an alternative identity to the currently identified user
    pub fn alias(&mut self, old_id: impl Into<String>) -> Result<&mut Self> {
        let id = self.ensure_setup()?;

        let query = Query::with_properties(
            Kind::Alias,
            vec![
                (KEY_PERSON.to_string(), Value::Str(old_id.into())),
                (KEY_NAME.to_string(), Value::Str(id)),
                (KEY_API_KEY.to_string(), Value::Str(self.key.clone())),
            ],
        );
        self.queries.push(query);
        Ok(self)
    }

    /// Record an event with properties
    ///
    /// An explicit `time` is stored as-is with the `_d` flag set, telling the
    /// API the timestamp is authoritative. With `None` the current time is
    /// stored and `_d` is false.
    pub fn record(
        &mut self,
        event: impl Into<String>,
        properties: Vec<(String, Value)>,
        time: Option<i64>,
    ) -> Result<&mut Self> {
        let id = self.ensure_setup()?;
        let (timestamp, manual) = resolve_time(time);

        let mut props = properties;
        props.push((KEY_NAME.to_string(), Value::Str(event.into())));
        props.push((KEY_PERSON.to_string(), Value::Str(id)));
        props.push((KEY_API_KEY.to_string(), Value::Str(self.key.clone())));
        props.push((KEY_TIMESTAMP.to_string(), Value::Int(timestamp)));
        props.push((KEY_USE_TIMESTAMP.to_string(), Value::Bool(manual)));

        self.queries.push(Query::with_properties(Kind::Event, props));
        Ok(self)
    }

    /// Set properties on the currently identified user
    ///
    /// Same timestamp semantics as [`record`](Client::record).
    pub fn set(
        &mut self,
        properties: Vec<(String, Value)>,
        time: Option<i64>,
    ) -> Result<&mut Self> {
        let id = self.ensure_setup()?;
        let (timestamp, manual) = resolve_time(time);

        let mut props = properties;
        props.push((KEY_API_KEY.to_string(), Value::Str(self.key.clone())));
        props.push((KEY_PERSON.to_string(), Value::Str(id)));
        props.push((KEY_TIMESTAMP.to_string(), Value::Int(timestamp)));
        props.push((KEY_USE_TIMESTAMP.to_string(), Value::Bool(manual)));

        self.queries.push(Query::with_properties(Kind::Set, props));
        Ok(self)
    }

    /// Submit all queued queries through the given transport
    ///
    /// The local queue is cleared only after the transport accepts the whole
    /// batch, so a failed submission can be retried by calling again.
    pub async fn submit<T: Transport + ?Sized>(&mut self, transport: &T) -> Result<()> {
        transport.submit_data(&self.queries).await?;
        self.queries.clear();
        Ok(())
    }

    /// Check that the API key and user identity are in place
    fn ensure_setup(&self) -> Result<String> {
        if self.key.is_empty() {
            return Err(Error::missing_key());
        }
        match &self.id {
            Some(id) => Ok(id.clone()),
            None => Err(Error::not_identified()),
        }
    }
}

/// Resolve an optional caller timestamp to (timestamp, manual flag)
fn resolve_time(time: Option<i64>) -> (i64, bool) {
    match time {
        Some(t) => (t, true),
        None => (chrono::Utc::now().timestamp(), false),
    }
}
