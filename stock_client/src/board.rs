//! The live board: one view owning one snapshot load and one update subscription.
//!
//! `LiveBoard::run` is the whole lifetime of the view. It opens the subscription, starts
//! the snapshot request and multiplexes both on the current task with `tokio::select!`,
//! so the table is mutated from a single place without locks. The view is torn down
//! when the `shutdown` future resolves (orderly close) or when the `run` future is
//! dropped (the subscription and the in-flight snapshot request are dropped with it).

use std::future::Future;

use log::{debug, info, warn};

use crate::config::BoardConfig;
use crate::model::change::ChangeSink;
use crate::model::table::InstrumentTable;
use crate::reconciler::{ReconcileStats, UpdateReconciler};
use crate::snapshot::{InstrumentListing, LoadState, SnapshotLoader};
use crate::subscription::{ConnectionState, FeedEvent, UpdateSubscription};

/// Final state of a board after teardown.
#[derive(Debug, Clone)]
pub struct BoardSummary {
    /// Table as last displayed.
    pub table: InstrumentTable,
    /// Whether the snapshot was ever installed.
    pub load_state: LoadState,
    /// Reconciliation counters.
    pub stats: ReconcileStats,
    /// Connection state right before teardown.
    pub connection: ConnectionState,
}

/// View composing a `SnapshotLoader`, an `UpdateSubscription` and an `UpdateReconciler`.
pub struct LiveBoard<L, S> {
    config: BoardConfig,
    listing: L,
    sink: S,
}

impl<L, S> LiveBoard<L, S>
where
    L: InstrumentListing,
    S: ChangeSink,
{
    /// Board reading the listing from `listing` and publishing changes to `sink`.
    pub fn new(config: BoardConfig, listing: L, sink: S) -> Self {
        Self {
            config,
            listing,
            sink,
        }
    }

    /// Run the view until `shutdown` resolves.
    pub async fn run<F>(self, shutdown: F) -> BoardSummary
    where
        F: Future<Output = ()>,
    {
        let LiveBoard {
            config,
            listing,
            sink,
        } = self;

        let mut reconciler = UpdateReconciler::from_config(&config, sink);
        let mut subscription =
            UpdateSubscription::open(config.updates_url.clone(), config.reconnect.clone());
        let snapshot = SnapshotLoader::new(listing).load();
        tokio::pin!(snapshot);
        tokio::pin!(shutdown);

        let mut snapshot_pending = true;
        let mut stream_live = true;
        info!(
            "Board started (unknown ids: {}, startup barrier: {})",
            config.unknown_ids, config.startup_barrier
        );

        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    info!("Board shutting down");
                    break;
                }
                result = &mut snapshot, if snapshot_pending => {
                    snapshot_pending = false;
                    if let Err(e) = reconciler.install_snapshot(result) {
                        debug!("Board continues without snapshot: {}", e);
                    }
                }
                event = subscription.next(), if stream_live => match event {
                    Some(FeedEvent::Message(payload)) => {
                        let _ = reconciler.apply_message(&payload);
                    }
                    Some(FeedEvent::Connected) => debug!("Update channel connected"),
                    Some(FeedEvent::Disconnected(e)) => warn!("Updates interrupted: {}", e),
                    None => {
                        stream_live = false;
                        warn!("Update channel finished; showing last known prices");
                    }
                },
            }
        }

        let connection = subscription.state();
        subscription.close().await;

        let (table, load_state, stats) = reconciler.into_parts();
        info!(
            "Board stopped: {} rows, {} updates applied, {} malformed, {} ignored",
            table.len(),
            stats.applied(),
            stats.malformed,
            stats.ignored_unknown
        );
        BoardSummary {
            table,
            load_state,
            stats,
            connection,
        }
    }
}
