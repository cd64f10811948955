//! Test doubles for the two collaborators: a scripted WebSocket provider and a
//! wiremock listing endpoint.
#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use crossbeam_channel::Receiver;
use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use stock_client::model::change::Notification;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::Message;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// What the provider does once a session's messages are sent.
#[derive(Debug, Clone)]
pub enum After {
    /// Keep the connection open until the client goes away.
    Hold,
    /// Send a close frame.
    Close,
}

/// Script for one accepted connection.
#[derive(Debug, Clone)]
pub struct Session {
    pub messages: Vec<String>,
    pub after: After,
}

impl Session {
    pub fn hold(messages: Vec<String>) -> Self {
        Self {
            messages,
            after: After::Hold,
        }
    }

    pub fn close(messages: Vec<String>) -> Self {
        Self {
            messages,
            after: After::Close,
        }
    }
}

/// Running scripted WebSocket provider.
pub struct WsProvider {
    pub url: Url,
    pub accepted: Arc<AtomicUsize>,
    /// Receives the session index whenever a held connection is ended by the client.
    pub client_gone: mpsc::UnboundedReceiver<usize>,
}

impl WsProvider {
    pub fn accepted(&self) -> usize {
        self.accepted.load(Ordering::SeqCst)
    }
}

/// Serve `sessions` in order, one per accepted connection; extra connections get an
/// empty held session.
pub async fn spawn_ws_provider(sessions: Vec<Session>) -> WsProvider {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let accepted = Arc::new(AtomicUsize::new(0));
    let (gone_tx, client_gone) = mpsc::unbounded_channel();

    let counter = accepted.clone();
    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            let index = counter.fetch_add(1, Ordering::SeqCst);
            let session = sessions
                .get(index)
                .cloned()
                .unwrap_or_else(|| Session::hold(Vec::new()));
            let gone_tx = gone_tx.clone();

            tokio::spawn(async move {
                let Ok(mut ws) = accept_async(stream).await else {
                    return;
                };
                for message in session.messages {
                    if ws.send(Message::Text(message)).await.is_err() {
                        return;
                    }
                }
                match session.after {
                    After::Close => {
                        let _ = ws.close(None).await;
                    }
                    After::Hold => {
                        while let Some(Ok(message)) = ws.next().await {
                            if message.is_close() {
                                break;
                            }
                        }
                        let _ = gone_tx.send(index);
                    }
                }
            });
        }
    });

    WsProvider {
        url: Url::parse(&format!("ws://{}/api/ws", addr)).unwrap(),
        accepted,
        client_gone,
    }
}

/// Wiremock listing answering `body` with `status` after `delay`, expecting one call.
pub async fn spawn_listing(status: u16, body: Value, delay: Duration) -> (MockServer, Url) {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/stocks"))
        .respond_with(
            ResponseTemplate::new(status)
                .set_body_json(body)
                .set_delay(delay),
        )
        .expect(1)
        .mount(&server)
        .await;
    let url = Url::parse(&format!("{}/api/stocks", server.uri())).unwrap();
    (server, url)
}

/// Instrument record as the provider sends it.
pub fn record(id: &str, symbol: &str, open: f64, current: f64, refresh: u32) -> Value {
    serde_json::json!({
        "id": id,
        "symbol": symbol,
        "openPrice": open,
        "currentPrice": current,
        "refreshInterval": refresh,
        "name": format!("{} Inc", symbol),
        "market": "stocks",
    })
}

/// Poll `rx` without blocking the runtime until a notification arrives.
pub async fn next_notification(rx: &Receiver<Notification>) -> Notification {
    let deadline = Instant::now() + Duration::from_secs(5);
    loop {
        if let Ok(notification) = rx.try_recv() {
            return notification;
        }
        assert!(
            Instant::now() < deadline,
            "timed out waiting for a notification"
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

/// Skip notifications until one satisfies `predicate`.
pub async fn wait_for<F>(rx: &Receiver<Notification>, predicate: F) -> Notification
where
    F: Fn(&Notification) -> bool,
{
    loop {
        let notification = next_notification(rx).await;
        if predicate(&notification) {
            return notification;
        }
    }
}

/// Receive from a tokio channel with a deadline.
pub async fn recv_within<T>(rx: &mut mpsc::UnboundedReceiver<T>, within: Duration) -> Option<T> {
    tokio::time::timeout(within, rx.recv()).await.ok().flatten()
}
