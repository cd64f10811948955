//!
//! Common types and utilities shared by the stock board client and anything that
//! speaks the same wire contract.
//!
//! This crate aggregates:
//! - `error` — wire-level error type `ModelError`.
//! - `result` — handy `Result<T, ModelError>` alias.
//! - `instrument` — the `Instrument` record exchanged over HTTP and WebSocket.
//! - `net` — endpoint paths, default ports and URL helpers.
#![warn(missing_docs)]
pub mod error;
pub mod instrument;
pub mod net;
pub mod result;

pub use error::ModelError;
pub use instrument::Instrument;
pub use result::Result;
