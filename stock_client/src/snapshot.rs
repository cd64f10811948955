//! One-shot snapshot of the instrument listing.
//!
//! `SnapshotLoader` issues exactly one request to an `InstrumentListing` and reports the
//! outcome. Loading consumes the loader, so a second load on the same loader does not
//! compile. Installing the records into the table is the reconciler's job
//! (`UpdateReconciler::install_snapshot`), which keeps the table single-owner.

use async_trait::async_trait;
use log::{error, info};
use reqwest::Client;
use stock_common::Instrument;
use strum_macros::Display;
use url::Url;

use crate::config::BoardConfig;
use crate::error::FeedError;

/// Lifecycle of the snapshot as seen by the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum LoadState {
    /// No snapshot has been installed (yet, or because the load failed).
    Uninitialized,
    /// A snapshot has been installed.
    Loaded,
}

/// Source of the full instrument listing.
#[async_trait]
pub trait InstrumentListing: Send + Sync {
    /// Fetch every instrument, in provider order.
    async fn fetch_all(&self) -> Result<Vec<Instrument>, FeedError>;
}

/// Listing collaborator reached over HTTP GET.
#[derive(Debug, Clone)]
pub struct HttpInstrumentListing {
    client: Client,
    url: Url,
}

impl HttpInstrumentListing {
    /// Listing at `url` with a default HTTP client.
    pub fn new(url: Url) -> Self {
        Self {
            client: Client::new(),
            url,
        }
    }

    /// Listing configured from `config` (URL and optional request timeout).
    pub fn from_config(config: &BoardConfig) -> Result<Self, FeedError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            url: config.snapshot_url.clone(),
        })
    }

    /// Endpoint this listing queries.
    pub fn url(&self) -> &Url {
        &self.url
    }
}

#[async_trait]
impl InstrumentListing for HttpInstrumentListing {
    async fn fetch_all(&self) -> Result<Vec<Instrument>, FeedError> {
        let response = self.client.get(self.url.clone()).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::SnapshotStatus {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("").to_string(),
            });
        }

        let body = response.bytes().await?;
        Instrument::list_from_json(&body).map_err(FeedError::SnapshotBody)
    }
}

/// Fetches the initial listing exactly once.
pub struct SnapshotLoader<L> {
    listing: L,
}

impl<L: InstrumentListing> SnapshotLoader<L> {
    /// Wrap a listing collaborator.
    pub fn new(listing: L) -> Self {
        Self { listing }
    }

    /// Issue the single listing request.
    ///
    /// Failures are logged here and returned to the caller; nothing is retried.
    pub async fn load(self) -> Result<Vec<Instrument>, FeedError> {
        match self.listing.fetch_all().await {
            Ok(instruments) => {
                info!("Snapshot fetched: {} instruments", instruments.len());
                Ok(instruments)
            }
            Err(e) => {
                error!("Failed to fetch snapshot: {}", e);
                Err(e)
            }
        }
    }
}
