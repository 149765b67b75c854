//! Redis-backed delayed transport tests against a real Redis server
//!
//! Requires a Redis instance on 127.0.0.1:6379. Run with:
//!
//! ```sh
//! cargo test --features live-tests --test redis_live
//! ```

#![cfg(all(feature = "redis", feature = "live-tests"))]

mod common;

use common::transport_for;
use kissmetrics::{Client, DelayedRedis, DelayedTransport, Error, RedisConfig, Transport};
use serial_test::serial;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

fn redis_config(prefix: &str) -> RedisConfig {
    RedisConfig {
        prefix: prefix.to_string(),
        epoch_override: Some(1234567890),
        ..Default::default()
    }
}

async fn clear_key(config: &RedisConfig) {
    let client = redis::Client::open(config.url.as_str()).unwrap();
    let mut conn = client.get_multiplexed_async_connection().await.unwrap();
    let _: () = redis::AsyncCommands::del(&mut conn, config.events_key())
        .await
        .unwrap();
}

async fn list_len(config: &RedisConfig) -> usize {
    let client = redis::Client::open(config.url.as_str()).unwrap();
    let mut conn = client.get_multiplexed_async_connection().await.unwrap();
    redis::AsyncCommands::llen(&mut conn, config.events_key())
        .await
        .unwrap()
}

#[tokio::test]
#[serial]
async fn submit_pushes_one_entry_per_query() {
    let mock_server = MockServer::start().await;
    let config = redis_config("km_test_push");
    clear_key(&config).await;

    let transport = DelayedRedis::new(transport_for(&mock_server), config.clone()).unwrap();

    let mut client = Client::new("test");
    client
        .identify("bob")
        .record("One", vec![], None)
        .unwrap()
        .record("Two", vec![], None)
        .unwrap();
    client.submit(&transport).await.unwrap();

    assert_eq!(list_len(&config).await, 2);
    // Nothing hits the network until a flush
    assert!(mock_server.received_requests().await.unwrap().is_empty());

    clear_key(&config).await;
}

#[tokio::test]
#[serial]
async fn flush_replays_entries_in_order_and_deletes_the_key() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let config = redis_config("km_test_flush");
    clear_key(&config).await;

    let transport = DelayedRedis::new(transport_for(&mock_server), config.clone()).unwrap();

    let mut client = Client::new("test");
    client
        .identify("example@example.com")
        .record("Runned test", vec![], Some(0))
        .unwrap();
    client.submit(&transport).await.unwrap();

    client
        .identify("example2@example.com")
        .set(vec![("property".into(), "value_1".into())], Some(3))
        .unwrap();
    client.submit(&transport).await.unwrap();

    transport.send_logged_data().await.unwrap();

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);
    assert_eq!(
        requests[0].url.query().unwrap(),
        "_n=Runned%20test&_p=example%40example.com&_k=test&_t=0&_d=1"
    );
    assert_eq!(
        requests[1].url.query().unwrap(),
        "property=value_1&_k=test&_p=example2%40example.com&_t=3&_d=1"
    );

    // Key deleted after full success
    assert_eq!(list_len(&config).await, 0);
}

#[tokio::test]
#[serial]
async fn flushing_an_empty_list_is_a_no_op() {
    let mock_server = MockServer::start().await;
    let config = redis_config("km_test_empty");
    clear_key(&config).await;

    let transport = DelayedRedis::new(transport_for(&mock_server), config).unwrap();

    transport.send_logged_data().await.unwrap();
    assert!(mock_server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
#[serial]
async fn empty_submit_is_rejected() {
    let mock_server = MockServer::start().await;
    let config = redis_config("km_test_empty_submit");
    let transport = DelayedRedis::new(transport_for(&mock_server), config).unwrap();

    let err = transport.submit_data(&[]).await.unwrap_err();
    assert!(matches!(err, Error::NoQueries));
}

#[tokio::test]
#[serial]
async fn failed_flush_keeps_the_list() {
    use kissmetrics::{Config, HttpTransport};

    let config = redis_config("km_test_failed_flush");
    clear_key(&config).await;

    // Inner transport points at a dead port
    let http = HttpTransport::new(Config {
        host: "127.0.0.1".to_string(),
        port: 1,
        tls: false,
        timeout: std::time::Duration::from_secs(1),
    })
    .unwrap();
    let transport = DelayedRedis::new(http, config.clone()).unwrap();

    let mut client = Client::new("test");
    client.identify("bob").record("Event", vec![], None).unwrap();
    client.submit(&transport).await.unwrap();

    let err = transport.send_logged_data().await.unwrap_err();
    assert!(matches!(err, Error::Network(_)));

    // Deletion happens only after full success
    assert_eq!(list_len(&config).await, 1);

    clear_key(&config).await;
}
