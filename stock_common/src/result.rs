//! Result type alias shared across the workspace.
//!
//! This module defines a convenient alias that defaults the error type to the
//! common `ModelError`, so functions can simply return `Result<T>`.
use crate::error::ModelError;

/// Workspace-wide `Result` alias with `ModelError` as the default error.
pub type Result<T, E = ModelError> = std::result::Result<T, E>;
