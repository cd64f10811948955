//! Error types for the stock board client.
//!
//! `FeedError` mirrors the three failure families of the board (snapshot fetch,
//! update parsing, stream disconnect) plus the plumbing failures around them. None of
//! them is fatal to the board; callers log and degrade to stale data.
use std::io;

use stock_common::ModelError;
use thiserror::Error;
use tokio_tungstenite::tungstenite;

/// Unified error type of the client crate.
#[derive(Error, Debug)]
pub enum FeedError {
    /// The listing request failed at the transport level.
    #[error("Snapshot transport error: {0}")]
    SnapshotTransport(#[from] reqwest::Error),

    /// The listing endpoint answered with a non-success status.
    #[error("Snapshot request failed with status {status}: {reason}")]
    SnapshotStatus {
        /// HTTP status code.
        status: u16,
        /// Canonical reason phrase, if any.
        reason: String,
    },

    /// The listing body could not be decoded into instruments.
    #[error("Snapshot body error: {0}")]
    SnapshotBody(#[source] ModelError),

    /// A stream message could not be decoded into an instrument.
    #[error("Update parse error: {0}")]
    UpdateParse(#[source] ModelError),

    /// The live channel was closed by the peer or the transport.
    #[error("Stream disconnected: {reason}")]
    StreamDisconnect {
        /// Human-readable cause.
        reason: String,
    },

    /// WebSocket handshake or protocol failure.
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tungstenite::Error),

    /// Invalid configuration (URLs, policies).
    #[error("Configuration error: {0}")]
    Config(#[from] ModelError),

    /// I/O error originating from the standard library.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Crossbeam/channel send failed (e.g., receiver dropped); contains a short context string.
    #[error("Channel send failed: {0}")]
    ChannelSend(String),
}

impl FeedError {
    /// `true` for failures of the one-shot listing request.
    pub fn is_snapshot_failure(&self) -> bool {
        matches!(
            self,
            FeedError::SnapshotTransport(_)
                | FeedError::SnapshotStatus { .. }
                | FeedError::SnapshotBody(_)
        )
    }
}
