//! Stock board client: keeps a table of instruments current by merging a one-shot
//! HTTP snapshot with a live WebSocket stream of per-instrument updates.
//!
//! Building blocks:
//! - `snapshot` — `SnapshotLoader` and the `InstrumentListing` collaborator (HTTP).
//! - `subscription` — `UpdateSubscription`, the owned and cancellable live channel.
//! - `reconciler` — `UpdateReconciler`, sole owner and mutator of the table.
//! - `board` — `LiveBoard`, the view tying the three together on one task.
//! - `model` — the ordered `InstrumentTable` and change notifications.
//! - `policy` / `config` — explicit policy switches and endpoint configuration.
//! - `render` — text formatting of the table.
#![warn(missing_docs)]
pub mod board;
pub mod config;
pub mod error;
pub mod model;
pub mod policy;
pub mod reconciler;
pub mod render;
pub mod result;
pub mod snapshot;
pub mod subscription;

pub use board::{BoardSummary, LiveBoard};
pub use config::BoardConfig;
pub use error::FeedError;
pub use result::Result;
