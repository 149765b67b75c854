//! Shared helpers for integration tests

#![allow(dead_code)]

use kissmetrics::{Config, HttpTransport};
use std::time::Duration;
use wiremock::MockServer;

/// Build an [`HttpTransport`] pointed at a wiremock server
pub fn transport_for(server: &MockServer) -> HttpTransport {
    let uri = url::Url::parse(&server.uri()).expect("mock server uri");
    let config = Config {
        host: uri.host_str().expect("mock server host").to_string(),
        port: uri.port().expect("mock server port"),
        tls: false,
        timeout: Duration::from_secs(5),
    };
    HttpTransport::new(config).expect("transport")
}

/// Matcher asserting the raw (still percent-encoded) query string
///
/// Wiremock's `query_param` matcher compares decoded values, which would hide
/// a `+`-for-space encoding bug. This matches the query string byte-for-byte.
pub struct RawQuery(pub &'static str);

impl wiremock::Match for RawQuery {
    fn matches(&self, request: &wiremock::Request) -> bool {
        request.url.query() == Some(self.0)
    }
}
