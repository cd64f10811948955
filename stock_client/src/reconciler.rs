//! Snapshot + stream reconciliation.
//!
//! `UpdateReconciler` is the single owner of the `InstrumentTable`. It installs the
//! snapshot once, then applies every stream update as an upsert-by-id in arrival order.
//!
//! Rules:
//! - An update replaces the matching row wholesale; it is never merged field by field.
//! - Unknown ids follow the configured `UnknownIdPolicy`.
//! - Malformed payloads are dropped here and never reach the table.
//! - There is no staleness check; the last update to arrive wins.
//! - Until the snapshot resolves (success or failure) updates are held back by the
//!   startup barrier and replayed afterwards in arrival order.
//! - Each successful apply emits exactly one change notification.

use std::collections::VecDeque;

use log::{debug, info, warn};
use stock_common::Instrument;

use crate::config::BoardConfig;
use crate::error::FeedError;
use crate::model::change::{ChangeSink, TableChange};
use crate::model::table::{InstrumentTable, Upsert};
use crate::policy::UnknownIdPolicy;
use crate::snapshot::LoadState;

/// Counters of everything the reconciler has seen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileStats {
    /// Updates that replaced an existing row.
    pub replaced: u64,
    /// Updates appended under `insert-unknown`.
    pub inserted: u64,
    /// Updates ignored because their id is unknown.
    pub ignored_unknown: u64,
    /// Payloads that could not be decoded.
    pub malformed: u64,
    /// Updates held back by the startup barrier.
    pub buffered: u64,
    /// Held-back updates discarded because the barrier buffer was full.
    pub overflowed: u64,
}

impl ReconcileStats {
    /// Updates that mutated the table.
    pub fn applied(&self) -> u64 {
        self.replaced + self.inserted
    }
}

/// What happened to one update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// Row at `position` replaced.
    Replaced {
        /// Row position.
        position: usize,
    },
    /// New row appended at `position`.
    Inserted {
        /// Row position.
        position: usize,
    },
    /// Unknown id, table untouched.
    Ignored,
    /// Held back until the snapshot resolves.
    Buffered,
}

enum Barrier {
    Holding(VecDeque<Instrument>),
    Released,
}

/// Owner and sole mutator of the instrument table.
pub struct UpdateReconciler<S> {
    table: InstrumentTable,
    load_state: LoadState,
    policy: UnknownIdPolicy,
    barrier: Barrier,
    barrier_capacity: usize,
    sink: S,
    stats: ReconcileStats,
}

impl<S: ChangeSink> UpdateReconciler<S> {
    /// Reconciler with an empty table.
    ///
    /// With `startup_barrier` off, updates that arrive before the snapshot are applied
    /// to the empty table immediately (and usually rejected as unknown).
    pub fn new(
        policy: UnknownIdPolicy,
        startup_barrier: bool,
        barrier_capacity: usize,
        sink: S,
    ) -> Self {
        let barrier = if startup_barrier {
            Barrier::Holding(VecDeque::new())
        } else {
            Barrier::Released
        };
        Self {
            table: InstrumentTable::new(),
            load_state: LoadState::Uninitialized,
            policy,
            barrier,
            barrier_capacity: barrier_capacity.max(1),
            sink,
            stats: ReconcileStats::default(),
        }
    }

    /// Reconciler configured from `config`.
    pub fn from_config(config: &BoardConfig, sink: S) -> Self {
        Self::new(
            config.unknown_ids,
            config.startup_barrier,
            config.barrier_capacity,
            sink,
        )
    }

    /// Resolve the snapshot: install it on success, keep the table on failure.
    ///
    /// Either way the startup barrier opens and held-back updates are replayed in
    /// arrival order. The error, if any, is handed back for the caller to report.
    pub fn install_snapshot(
        &mut self,
        snapshot: Result<Vec<Instrument>, FeedError>,
    ) -> Result<usize, FeedError> {
        let result = match snapshot {
            Ok(records) => {
                let duplicates = self.table.replace_all(records);
                if duplicates > 0 {
                    warn!("Snapshot contained {} duplicate ids", duplicates);
                }
                self.load_state = LoadState::Loaded;
                info!("Snapshot installed: {} rows", self.table.len());
                self.notify(TableChange::Loaded {
                    rows: self.table.len(),
                });
                Ok(self.table.len())
            }
            Err(e) => {
                warn!("Snapshot unavailable; table stays {}", self.load_state);
                Err(e)
            }
        };

        if let Barrier::Holding(held) = std::mem::replace(&mut self.barrier, Barrier::Released) {
            if !held.is_empty() {
                info!("Replaying {} updates held during startup", held.len());
            }
            for record in held {
                self.apply(record);
            }
        }
        result
    }

    /// Decode and apply one raw stream payload.
    ///
    /// A payload that does not decode is counted, logged at debug level and returned as
    /// `FeedError::UpdateParse`; the table is not touched.
    pub fn apply_message(&mut self, payload: &[u8]) -> Result<ApplyOutcome, FeedError> {
        match Instrument::from_json(payload) {
            Ok(record) => Ok(self.accept(record)),
            Err(e) => {
                self.stats.malformed += 1;
                debug!(
                    "Dropping malformed update ({}): {}",
                    e,
                    String::from_utf8_lossy(payload)
                );
                Err(FeedError::UpdateParse(e))
            }
        }
    }

    /// Apply an already decoded update, honouring the startup barrier.
    pub fn accept(&mut self, record: Instrument) -> ApplyOutcome {
        match &mut self.barrier {
            Barrier::Holding(held) => {
                if held.len() >= self.barrier_capacity {
                    if let Some(dropped) = held.pop_front() {
                        warn!("Startup buffer full; dropping held update for {}", dropped.id);
                        self.stats.overflowed += 1;
                    }
                }
                held.push_back(record);
                self.stats.buffered += 1;
                ApplyOutcome::Buffered
            }
            Barrier::Released => self.apply(record),
        }
    }

    fn apply(&mut self, record: Instrument) -> ApplyOutcome {
        let id = record.id.clone();
        match self.table.upsert(record, self.policy) {
            Upsert::Replaced { position } => {
                self.stats.replaced += 1;
                self.notify(TableChange::Updated { id, position });
                ApplyOutcome::Replaced { position }
            }
            Upsert::Inserted { position } => {
                self.stats.inserted += 1;
                info!("Inserted new instrument {} at row {}", id, position);
                self.notify(TableChange::Inserted { id, position });
                ApplyOutcome::Inserted { position }
            }
            Upsert::Rejected => {
                self.stats.ignored_unknown += 1;
                debug!("Ignoring update for unknown id {}", id);
                ApplyOutcome::Ignored
            }
        }
    }

    fn notify(&self, change: TableChange) {
        if let Err(e) = self.sink.notify(change, &self.table) {
            debug!("Change notification not delivered: {}", e);
        }
    }

    /// The live table.
    pub fn table(&self) -> &InstrumentTable {
        &self.table
    }

    /// Whether a snapshot has been installed.
    pub fn load_state(&self) -> LoadState {
        self.load_state
    }

    /// `true` while updates are being held back for the snapshot.
    pub fn is_holding(&self) -> bool {
        matches!(self.barrier, Barrier::Holding(_))
    }

    /// Counters so far.
    pub fn stats(&self) -> ReconcileStats {
        self.stats
    }

    /// Give up ownership of the table.
    pub fn into_parts(self) -> (InstrumentTable, LoadState, ReconcileStats) {
        (self.table, self.load_state, self.stats)
    }
}
