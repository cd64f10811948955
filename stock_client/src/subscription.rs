//! Live-update channel as an owned, cancellable subscription.
//!
//! `UpdateSubscription::open` spawns one task that owns the WebSocket. The task walks
//! the `Closed → Connecting → Open → Closed` state machine, forwards every inbound
//! frame as a `FeedEvent`, and reconnects according to the `ReconnectPolicy`.
//!
//! Teardown:
//! - `close()` asks the task to send a close frame and waits for it to finish.
//! - Dropping the subscription aborts the task, so an abandoned view never keeps a
//!   socket open.
//! - In both cases the event receiver goes away with the subscription, so nothing is
//!   delivered to a torn-down consumer.

use futures_util::{SinkExt, StreamExt};
use log::{debug, info, warn};
use strum_macros::Display;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use url::Url;

use crate::error::FeedError;
use crate::policy::ReconnectPolicy;

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Connection state of the live channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ConnectionState {
    /// No connection, either not yet attempted or torn down.
    Closed,
    /// Handshake in progress.
    Connecting,
    /// Connected and delivering messages.
    Open,
}

/// Event produced by the live channel.
#[derive(Debug)]
pub enum FeedEvent {
    /// The transport connected (again).
    Connected,
    /// One raw inbound message, not yet decoded.
    Message(Vec<u8>),
    /// The connection attempt failed or an open connection dropped.
    Disconnected(FeedError),
}

enum PumpEnd {
    Shutdown,
    ConsumerGone,
    Disconnected(String),
}

/// Owned handle of the live-update channel.
pub struct UpdateSubscription {
    events: mpsc::UnboundedReceiver<FeedEvent>,
    state: watch::Receiver<ConnectionState>,
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl UpdateSubscription {
    /// Start connecting to `url`. Must be called from within a tokio runtime.
    pub fn open(url: Url, reconnect: ReconnectPolicy) -> Self {
        let (events_tx, events) = mpsc::unbounded_channel();
        let (state_tx, state) = watch::channel(ConnectionState::Closed);
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let task = tokio::spawn(run_channel(url, reconnect, events_tx, state_tx, shutdown_rx));

        Self {
            events,
            state,
            shutdown: Some(shutdown_tx),
            task: Some(task),
        }
    }

    /// Next event, or `None` once the channel task has finished for good.
    pub async fn next(&mut self) -> Option<FeedEvent> {
        self.events.recv().await
    }

    /// Current connection state.
    pub fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    /// Watch handle for connection state changes.
    pub fn watch_state(&self) -> watch::Receiver<ConnectionState> {
        self.state.clone()
    }

    /// Close the connection gracefully and wait for the channel task to finish.
    pub async fn close(mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!("Update channel task ended abnormally: {}", e);
            }
        }
        info!("Update subscription closed");
    }
}

impl Drop for UpdateSubscription {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            debug!("Update subscription dropped; aborting channel task");
            task.abort();
        }
    }
}

async fn run_channel(
    url: Url,
    policy: ReconnectPolicy,
    events: mpsc::UnboundedSender<FeedEvent>,
    state: watch::Sender<ConnectionState>,
    mut shutdown: oneshot::Receiver<()>,
) {
    let mut attempt: u32 = 0;

    loop {
        state.send_replace(ConnectionState::Connecting);
        info!("Connecting to update channel {}", url);

        let connected = tokio::select! {
            _ = &mut shutdown => break,
            result = connect_async(url.as_str()) => result,
        };

        let event = match connected {
            Ok((socket, _response)) => {
                attempt = 0;
                state.send_replace(ConnectionState::Open);
                info!("Update channel open");
                if events.send(FeedEvent::Connected).is_err() {
                    break;
                }

                let end = pump(socket, &events, &mut shutdown).await;
                state.send_replace(ConnectionState::Closed);
                match end {
                    PumpEnd::Shutdown | PumpEnd::ConsumerGone => break,
                    PumpEnd::Disconnected(reason) => {
                        warn!("Update channel disconnected: {}", reason);
                        FeedEvent::Disconnected(FeedError::StreamDisconnect { reason })
                    }
                }
            }
            Err(e) => {
                state.send_replace(ConnectionState::Closed);
                warn!("Failed to connect to update channel: {}", e);
                FeedEvent::Disconnected(FeedError::WebSocket(e))
            }
        };
        if events.send(event).is_err() {
            break;
        }

        attempt += 1;
        if !policy.allows(attempt) {
            info!("Not reconnecting to update channel (attempt {})", attempt);
            break;
        }
        let delay = policy.delay(attempt);
        info!("Reconnecting in {:?} (attempt {})", delay, attempt);
        tokio::select! {
            _ = &mut shutdown => break,
            _ = tokio::time::sleep(delay) => {}
        }
    }

    state.send_replace(ConnectionState::Closed);
}

async fn pump(
    socket: Socket,
    events: &mpsc::UnboundedSender<FeedEvent>,
    shutdown: &mut oneshot::Receiver<()>,
) -> PumpEnd {
    let (mut write, mut read) = socket.split();

    loop {
        let frame = tokio::select! {
            _ = &mut *shutdown => {
                let _ = write.send(Message::Close(None)).await;
                return PumpEnd::Shutdown;
            }
            frame = read.next() => frame,
        };

        let payload = match frame {
            Some(Ok(Message::Text(text))) => text.into_bytes(),
            Some(Ok(Message::Binary(data))) => data,
            Some(Ok(Message::Ping(data))) => {
                if let Err(e) = write.send(Message::Pong(data)).await {
                    return PumpEnd::Disconnected(e.to_string());
                }
                continue;
            }
            Some(Ok(Message::Close(frame))) => {
                let reason = frame
                    .map(|f| format!("closed by server ({}): {}", f.code, f.reason))
                    .unwrap_or_else(|| "closed by server".to_string());
                return PumpEnd::Disconnected(reason);
            }
            Some(Ok(_)) => continue,
            Some(Err(e)) => return PumpEnd::Disconnected(e.to_string()),
            None => return PumpEnd::Disconnected("stream ended".to_string()),
        };

        if events.send(FeedEvent::Message(payload)).is_err() {
            let _ = write.send(Message::Close(None)).await;
            return PumpEnd::ConsumerGone;
        }
    }
}
