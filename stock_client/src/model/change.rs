//! Collection-changed notifications for the presentation layer.
//!
//! Every successful mutation of the table produces exactly one `TableChange`. The
//! reconciler hands it to a `ChangeSink` together with the table it just mutated; the
//! crossbeam implementation packs both into a `Notification` for a renderer thread.

use chrono::{DateTime, Utc};
use crossbeam_channel::Sender;
use stock_common::Instrument;

use crate::error::FeedError;
use crate::model::table::InstrumentTable;

/// What changed in the table.
#[derive(Debug, Clone, PartialEq)]
pub enum TableChange {
    /// The snapshot was installed.
    Loaded {
        /// Number of rows after the install.
        rows: usize,
    },
    /// An existing row was replaced by a stream update.
    Updated {
        /// Id of the row.
        id: String,
        /// Row position.
        position: usize,
    },
    /// A stream update for an unknown id was appended.
    Inserted {
        /// Id of the new row.
        id: String,
        /// Row position.
        position: usize,
    },
}

/// A change together with the rows to render.
#[derive(Debug, Clone)]
pub struct Notification {
    /// The change that triggered this notification.
    pub change: TableChange,
    /// All rows in display order, as of this change.
    pub rows: Vec<Instrument>,
    /// Time the change was applied.
    pub at: DateTime<Utc>,
}

/// Receiver of collection-changed notifications.
pub trait ChangeSink {
    /// Called once per successful mutation, after `table` has been updated.
    fn notify(&self, change: TableChange, table: &InstrumentTable) -> Result<(), FeedError>;
}

impl ChangeSink for Sender<Notification> {
    fn notify(&self, change: TableChange, table: &InstrumentTable) -> Result<(), FeedError> {
        let notification = Notification {
            change,
            rows: table.rows().to_vec(),
            at: Utc::now(),
        };
        self.send(notification)
            .map_err(|e| FeedError::ChannelSend(e.to_string()))
    }
}

/// Sink that drops every notification. Useful when only the final table matters.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl ChangeSink for NullSink {
    fn notify(&self, _change: TableChange, _table: &InstrumentTable) -> Result<(), FeedError> {
        Ok(())
    }
}
