//! Board configuration.
//!
//! `BoardConfig` gathers the two collaborator endpoints and every policy switch of the
//! board. The binary builds it from command-line arguments; tests build it directly.

use std::time::Duration;

use stock_common::net;
use url::Url;

use crate::error::FeedError;
use crate::policy::{ReconnectPolicy, UnknownIdPolicy};

/// Default number of updates held back while the snapshot is in flight.
pub const DEFAULT_BARRIER_CAPACITY: usize = 1024;

/// Everything the board needs to run.
#[derive(Debug, Clone)]
pub struct BoardConfig {
    /// Instrument listing endpoint.
    pub snapshot_url: Url,
    /// Live-update WebSocket endpoint.
    pub updates_url: Url,
    /// Handling of updates for ids missing from the table.
    pub unknown_ids: UnknownIdPolicy,
    /// Reconnect behaviour of the live channel.
    pub reconnect: ReconnectPolicy,
    /// Hold stream updates until the snapshot resolves.
    pub startup_barrier: bool,
    /// Maximum number of held-back updates; the oldest is dropped beyond this.
    pub barrier_capacity: usize,
    /// Optional timeout of the listing request. `None` keeps the transport default.
    pub request_timeout: Option<Duration>,
}

impl BoardConfig {
    /// Derive both endpoints from the provider base URL (e.g. `http://localhost:8080`).
    pub fn for_server(base: &str) -> Result<Self, FeedError> {
        let base = Url::parse(base).map_err(stock_common::ModelError::from)?;
        Ok(Self::with_urls(
            net::snapshot_url(&base)?,
            net::updates_url(&base)?,
        ))
    }

    /// Use explicit endpoints with default policies.
    pub fn with_urls(snapshot_url: Url, updates_url: Url) -> Self {
        Self {
            snapshot_url,
            updates_url,
            unknown_ids: UnknownIdPolicy::default(),
            reconnect: ReconnectPolicy::default(),
            startup_barrier: true,
            barrier_capacity: DEFAULT_BARRIER_CAPACITY,
            request_timeout: None,
        }
    }
}
