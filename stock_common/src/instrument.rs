//! Instrument record exchanged with the data provider.
//!
//! An `Instrument` is the unit of both the one-shot listing (a JSON array of records)
//! and the live stream (one JSON record per message). Every stream message carries the
//! full authoritative state of one instrument, never a partial patch.

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// A tradable instrument shown as one row of the board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Instrument {
    /// Opaque stable identifier, unique within a collection.
    pub id: String,
    /// Display ticker.
    pub symbol: String,
    /// Reference price captured at session open.
    pub open_price: f64,
    /// Latest known price.
    pub current_price: f64,
    /// Server-declared update cadence in seconds. Informational only.
    #[serde(rename = "refreshInterval")]
    pub refresh_interval_seconds: u32,
}

impl Instrument {
    /// Create a new instrument record.
    pub fn new(
        id: impl Into<String>,
        symbol: impl Into<String>,
        open_price: f64,
        current_price: f64,
        refresh_interval_seconds: u32,
    ) -> Self {
        Self {
            id: id.into(),
            symbol: symbol.into(),
            open_price,
            current_price,
            refresh_interval_seconds,
        }
    }

    /// Decode a single record from a stream payload.
    ///
    /// Unknown fields (the provider also sends `name` and `market`) are ignored.
    /// Fails on invalid JSON, missing or mistyped fields, and on records that
    /// violate [`Self::validate`].
    pub fn from_json(payload: &[u8]) -> Result<Self, ModelError> {
        let instrument: Instrument = serde_json::from_slice(payload)?;
        instrument.validate()?;
        Ok(instrument)
    }

    /// Decode a listing body into an ordered sequence of records.
    pub fn list_from_json(body: &[u8]) -> Result<Vec<Self>, ModelError> {
        let instruments: Vec<Instrument> = serde_json::from_slice(body)?;
        for instrument in &instruments {
            instrument.validate()?;
        }
        Ok(instruments)
    }

    /// Check record invariants that serde cannot express.
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.id.is_empty() {
            return Err(ModelError::InvalidRecord("empty id".to_string()));
        }
        if !self.open_price.is_finite() || !self.current_price.is_finite() {
            return Err(ModelError::InvalidRecord(format!(
                "non-finite price for id {}",
                self.id
            )));
        }
        Ok(())
    }
}
