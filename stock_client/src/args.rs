//! Command-line arguments for the stock board client.
//!
//! This module defines the CLI interface using `clap`. See `main` for end-to-end usage.
use std::time::Duration;

use clap::Parser;
use stock_client::policy::{ReconnectPolicy, UnknownIdPolicy};
use stock_client::{BoardConfig, FeedError};
use stock_common::net;
use url::Url;

/// Parsed command-line arguments.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Base URL of the stock data provider.
    #[clap(long, default_value_t = net::default_base_url())]
    pub server: String,

    /// Explicit WebSocket URL of the live channel (defaults to `<server>/api/ws`).
    #[clap(long)]
    pub updates_url: Option<String>,

    /// What to do with updates for instruments missing from the snapshot.
    #[clap(long, value_enum, default_value_t = UnknownIdPolicy::RejectUnknown)]
    pub unknown_ids: UnknownIdPolicy,

    /// Do not reconnect when the live channel drops.
    #[clap(long)]
    pub no_reconnect: bool,

    /// Give up after this many consecutive failed reconnects (0 retries forever).
    #[clap(long, default_value_t = 10)]
    pub max_reconnect_attempts: u32,

    /// Apply updates immediately even if the snapshot has not arrived yet.
    #[clap(long)]
    pub no_startup_barrier: bool,

    /// Timeout of the snapshot request in seconds.
    #[clap(long)]
    pub request_timeout_secs: Option<u64>,
}

impl Args {
    /// Build the board configuration from the arguments.
    pub fn to_config(&self) -> Result<BoardConfig, FeedError> {
        let mut config = BoardConfig::for_server(self.server.trim())?;
        if let Some(updates_url) = &self.updates_url {
            config.updates_url =
                Url::parse(updates_url.trim()).map_err(stock_common::ModelError::from)?;
        }
        config.unknown_ids = self.unknown_ids;
        config.reconnect = if self.no_reconnect {
            ReconnectPolicy::disabled()
        } else {
            ReconnectPolicy {
                max_attempts: (self.max_reconnect_attempts > 0)
                    .then_some(self.max_reconnect_attempts),
                ..ReconnectPolicy::default()
            }
        };
        config.startup_barrier = !self.no_startup_barrier;
        config.request_timeout = self.request_timeout_secs.map(Duration::from_secs);
        Ok(config)
    }
}
