//! Result alias for the client crate, defaulting to `FeedError`.
use crate::error::FeedError;

/// Crate-wide `Result` alias with `FeedError` as the default error.
pub type Result<T, E = FeedError> = std::result::Result<T, E>;
