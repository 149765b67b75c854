//! Query data model and wire encoding
//!
//! A [`Query`] is one recorded action (alias, event, or property-set) destined
//! for the tracking API. Properties keep insertion order because that order is
//! the wire order of the encoded query string.

use serde::{Deserialize, Serialize};

/// Reserved property key: API key
pub const KEY_API_KEY: &str = "_k";
/// Reserved property key: person (user identifier)
pub const KEY_PERSON: &str = "_p";
/// Reserved property key: event name, or the new identity for an alias
pub const KEY_NAME: &str = "_n";
/// Reserved property key: Unix timestamp
pub const KEY_TIMESTAMP: &str = "_t";
/// Reserved property key: timestamp-is-authoritative flag
///
/// Set to true when the timestamp was supplied by the caller or stamped at
/// batching time, telling the API to honor `_t` instead of the arrival time.
pub const KEY_USE_TIMESTAMP: &str = "_d";

/// Endpoint tag for a query
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Kind {
    /// Alias one identity to another (`/a`)
    #[serde(rename = "a")]
    Alias,
    /// Record an event (`/e`)
    #[serde(rename = "e")]
    Event,
    /// Set properties on a user (`/s`)
    #[serde(rename = "s")]
    Set,
}

impl Kind {
    /// API endpoint path segment for this kind
    pub fn path(&self) -> &'static str {
        match self {
            Kind::Alias => "a",
            Kind::Event => "e",
            Kind::Set => "s",
        }
    }
}

impl std::fmt::Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.path())
    }
}

/// Scalar property value
///
/// Booleans encode as `1`/`0` on the wire, matching what the tracking API
/// expects from form-style encoders.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// String value, percent-encoded on the wire
    Str(String),
    /// Integer value
    Int(i64),
    /// Boolean value, encoded as `1` or `0`
    Bool(bool),
}

impl Value {
    /// Wire encoding of this value (percent-encoded where needed)
    pub fn encode(&self) -> String {
        match self {
            Value::Str(s) => urlencoding::encode(s).into_owned(),
            Value::Int(i) => i.to_string(),
            Value::Bool(true) => "1".to_string(),
            Value::Bool(false) => "0".to_string(),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

/// One recorded action destined for the tracking API
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Query {
    /// Endpoint tag
    kind: Kind,
    /// Ordered property list; insertion order is the wire order
    properties: Vec<(String, Value)>,
}

impl Query {
    /// Create a query with no properties
    pub fn new(kind: Kind) -> Self {
        Self {
            kind,
            properties: Vec::new(),
        }
    }

    /// Create a query from an ordered property list
    pub fn with_properties(kind: Kind, properties: Vec<(String, Value)>) -> Self {
        Self { kind, properties }
    }

    /// Endpoint tag of this query
    pub fn kind(&self) -> Kind {
        self.kind
    }

    /// Ordered property list
    pub fn properties(&self) -> &[(String, Value)] {
        &self.properties
    }

    /// Append a property, keeping wire order
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.properties.push((key.into(), value.into()));
    }

    /// Look up a property by key
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.properties
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// The `_t` timestamp, if one is set
    pub fn timestamp(&self) -> Option<i64> {
        match self.get(KEY_TIMESTAMP) {
            Some(Value::Int(t)) => Some(*t),
            _ => None,
        }
    }

    /// Stamp this query with a timestamp
    pub fn set_timestamp(&mut self, epoch: i64) {
        self.set(KEY_TIMESTAMP, Value::Int(epoch));
    }

    /// Mark the timestamp as authoritative (`_d` = true)
    ///
    /// Delayed transports set this on every persisted query so the API keeps
    /// the recorded time instead of the (much later) flush time.
    pub fn set_use_timestamp(&mut self) {
        self.set(KEY_USE_TIMESTAMP, Value::Bool(true));
    }

    /// Set a property, replacing an existing value in place
    fn set(&mut self, key: &str, value: Value) {
        if let Some(entry) = self.properties.iter_mut().find(|(k, _)| k == key) {
            entry.1 = value;
        } else {
            self.properties.push((key.to_string(), value));
        }
    }

    /// Encode the property list as a query string
    ///
    /// `key=value` pairs joined by `&`, percent-encoded per RFC 3986: a space
    /// becomes `%20` (never `+`) and `~` stays literal.
    pub fn encode(&self) -> String {
        self.properties
            .iter()
            .map(|(key, value)| format!("{}={}", urlencoding::encode(key), value.encode()))
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Full request path including the endpoint tag, e.g. `/e?_n=Signup&...`
    pub fn request_path(&self) -> String {
        format!("/{}?{}", self.kind.path(), self.encode())
    }
}
