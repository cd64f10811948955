//! Error types for the wire contract.
//!
//! `ModelError` covers everything that can go wrong while turning bytes from the
//! provider into an `Instrument`, and while deriving endpoint URLs.
use std::string::FromUtf8Error;

use thiserror::Error;

/// Decoding and addressing failures shared by client components.
#[derive(Error, Debug)]
pub enum ModelError {
    /// Failure while decoding JSON via serde_json.
    #[error("JSON deserialization error: {0}")]
    SerdeJson(#[from] serde_json::Error),

    /// Payload was valid JSON but violated a record invariant.
    #[error("Invalid instrument record: {0}")]
    InvalidRecord(String),

    /// UTF-8 conversion error when a frame is not valid text.
    #[error("UTF-8 error: {0}")]
    Utf8(#[from] FromUtf8Error),

    /// Endpoint URL could not be parsed or joined.
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// Base URL uses a scheme with no WebSocket counterpart.
    #[error("Unsupported URL scheme: {0}")]
    UnsupportedScheme(String),
}
