//! Lifecycle of the live-update subscription.
mod common;

use std::time::Duration;

use common::{Session, recv_within, spawn_ws_provider};
use stock_client::{BoardConfig, FeedError};
use stock_client::policy::ReconnectPolicy;
use stock_client::subscription::{ConnectionState, FeedEvent, UpdateSubscription};
use tokio_tungstenite::tungstenite::Error;
use tokio_tungstenite::tungstenite::error::UrlError;
use url::Url;

fn fast_reconnect() -> ReconnectPolicy {
    ReconnectPolicy {
        initial_backoff: Duration::from_millis(20),
        max_backoff: Duration::from_millis(50),
        max_attempts: Some(5),
        jitter: 0.0,
        ..ReconnectPolicy::default()
    }
}

async fn next_event(subscription: &mut UpdateSubscription) -> Option<FeedEvent> {
    tokio::time::timeout(Duration::from_secs(5), subscription.next())
        .await
        .expect("timed out waiting for a feed event")
}

#[tokio::test]
async fn delivers_messages_in_arrival_order() {
    let provider = spawn_ws_provider(vec![Session::hold(vec![
        "first".to_string(),
        "second".to_string(),
        "third".to_string(),
    ])])
    .await;
    let mut subscription = UpdateSubscription::open(provider.url.clone(), ReconnectPolicy::disabled());

    assert!(matches!(next_event(&mut subscription).await, Some(FeedEvent::Connected)));
    assert_eq!(subscription.state(), ConnectionState::Open);

    let mut received = Vec::new();
    for _ in 0..3 {
        match next_event(&mut subscription).await {
            Some(FeedEvent::Message(payload)) => received.push(String::from_utf8(payload).unwrap()),
            other => panic!("unexpected event {:?}", other),
        }
    }
    assert_eq!(received, vec!["first", "second", "third"]);

    subscription.close().await;
}

#[tokio::test]
async fn close_tears_down_the_connection() {
    let mut provider = spawn_ws_provider(vec![Session::hold(Vec::new())]).await;
    let mut subscription = UpdateSubscription::open(provider.url.clone(), fast_reconnect());
    assert!(matches!(next_event(&mut subscription).await, Some(FeedEvent::Connected)));
    let state = subscription.watch_state();

    subscription.close().await;

    assert_eq!(*state.borrow(), ConnectionState::Closed);
    assert_eq!(
        recv_within(&mut provider.client_gone, Duration::from_secs(5)).await,
        Some(0)
    );
    assert_eq!(provider.accepted(), 1);
}

#[tokio::test]
async fn drop_tears_down_the_connection() {
    let mut provider = spawn_ws_provider(vec![Session::hold(Vec::new())]).await;
    let mut subscription = UpdateSubscription::open(provider.url.clone(), fast_reconnect());
    assert!(matches!(next_event(&mut subscription).await, Some(FeedEvent::Connected)));

    drop(subscription);

    assert_eq!(
        recv_within(&mut provider.client_gone, Duration::from_secs(5)).await,
        Some(0)
    );
}

#[tokio::test]
async fn reconnects_after_server_close() {
    let provider = spawn_ws_provider(vec![
        Session::close(vec!["before".to_string()]),
        Session::hold(vec!["after".to_string()]),
    ])
    .await;
    let mut subscription = UpdateSubscription::open(provider.url.clone(), fast_reconnect());

    let mut events = Vec::new();
    while events.len() < 5 {
        let event = next_event(&mut subscription).await.expect("channel ended early");
        events.push(match event {
            FeedEvent::Connected => "connected".to_string(),
            FeedEvent::Message(payload) => String::from_utf8(payload).unwrap(),
            FeedEvent::Disconnected(FeedError::StreamDisconnect { .. }) => "disconnected".to_string(),
            FeedEvent::Disconnected(other) => panic!("unexpected error {}", other),
        });
    }

    assert_eq!(
        events,
        vec!["connected", "before", "disconnected", "connected", "after"]
    );
    assert_eq!(provider.accepted(), 2);
    subscription.close().await;
}

#[tokio::test]
async fn disabled_reconnect_ends_the_stream() {
    let provider = spawn_ws_provider(vec![Session::close(Vec::new())]).await;
    let mut subscription = UpdateSubscription::open(provider.url.clone(), ReconnectPolicy::disabled());

    assert!(matches!(next_event(&mut subscription).await, Some(FeedEvent::Connected)));
    assert!(matches!(
        next_event(&mut subscription).await,
        Some(FeedEvent::Disconnected(FeedError::StreamDisconnect { .. }))
    ));
    assert!(next_event(&mut subscription).await.is_none());
    assert_eq!(subscription.state(), ConnectionState::Closed);

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(provider.accepted(), 1);
}

#[tokio::test]
async fn failed_connect_is_reported_and_bounded() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    let url = Url::parse(&format!("ws://127.0.0.1:{}/api/ws", port)).unwrap();

    let policy = ReconnectPolicy {
        max_attempts: Some(2),
        ..fast_reconnect()
    };
    let mut subscription = UpdateSubscription::open(url, policy);

    let mut failures = 0;
    while let Some(event) = next_event(&mut subscription).await {
        match event {
            FeedEvent::Disconnected(FeedError::WebSocket(_)) => failures += 1,
            other => panic!("unexpected event {:?}", other),
        }
    }
    // First attempt plus two reconnects.
    assert_eq!(failures, 3);
    assert_eq!(subscription.state(), ConnectionState::Closed);
}

#[tokio::test]
async fn secure_endpoint_reaches_the_tls_handshake() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            drop(stream);
        }
    });
    let config = BoardConfig::for_server(&format!("https://127.0.0.1:{}", port)).unwrap();
    assert_eq!(config.updates_url.scheme(), "wss");

    let mut subscription = UpdateSubscription::open(config.updates_url, ReconnectPolicy::disabled());

    match next_event(&mut subscription).await {
        Some(FeedEvent::Disconnected(FeedError::WebSocket(e))) => assert!(
            !matches!(e, Error::Url(UrlError::TlsFeatureNotEnabled)),
            "wss rejected before connecting: {}",
            e
        ),
        other => panic!("unexpected event {:?}", other),
    }
}
