//! Ordered instrument collection keyed by `id`.
//!
//! The table keeps rows in snapshot order and an `id → position` index next to them.
//! Rows are only ever replaced in place or appended; nothing is removed or reordered,
//! so positions handed out in change notifications stay valid for the table's life.

use std::collections::HashMap;

use log::warn;
use stock_common::Instrument;

use crate::policy::UnknownIdPolicy;

/// Result of a single upsert against the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    /// An existing row was replaced wholesale.
    Replaced {
        /// Row position of the replaced entry.
        position: usize,
    },
    /// The record was appended as a new row.
    Inserted {
        /// Row position of the new entry.
        position: usize,
    },
    /// The id is unknown and the policy forbids inserting it.
    Rejected,
}

/// Ordered sequence of instruments with at most one row per id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InstrumentTable {
    rows: Vec<Instrument>,
    index: HashMap<String, usize>,
}

impl InstrumentTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace every row with `records`, preserving their order.
    ///
    /// A repeated id keeps the position of its first occurrence and the fields of its
    /// last one. Returns the number of duplicates collapsed this way.
    pub fn replace_all(&mut self, records: Vec<Instrument>) -> usize {
        self.rows.clear();
        self.index.clear();
        self.rows.reserve(records.len());

        let mut duplicates = 0;
        for record in records {
            if let Some(&position) = self.index.get(&record.id) {
                warn!("Duplicate id {} in snapshot; keeping the later record", record.id);
                self.rows[position] = record;
                duplicates += 1;
            } else {
                self.index.insert(record.id.clone(), self.rows.len());
                self.rows.push(record);
            }
        }
        duplicates
    }

    /// Apply `record` by id: replace the matching row, or handle an unknown id per `policy`.
    pub fn upsert(&mut self, record: Instrument, policy: UnknownIdPolicy) -> Upsert {
        if let Some(&position) = self.index.get(&record.id) {
            self.rows[position] = record;
            return Upsert::Replaced { position };
        }
        match policy {
            UnknownIdPolicy::RejectUnknown => Upsert::Rejected,
            UnknownIdPolicy::InsertUnknown => {
                let position = self.rows.len();
                self.index.insert(record.id.clone(), position);
                self.rows.push(record);
                Upsert::Inserted { position }
            }
        }
    }

    /// Row position of `id`, if present.
    pub fn position(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    /// Row for `id`, if present.
    pub fn get(&self, id: &str) -> Option<&Instrument> {
        self.position(id).map(|position| &self.rows[position])
    }

    /// All rows in display order.
    pub fn rows(&self) -> &[Instrument] {
        &self.rows
    }

    /// Iterate rows in display order.
    pub fn iter(&self) -> std::slice::Iter<'_, Instrument> {
        self.rows.iter()
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// `true` when the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Ids in display order.
    pub fn ids(&self) -> Vec<&str> {
        self.rows.iter().map(|row| row.id.as_str()).collect()
    }
}

impl<'a> IntoIterator for &'a InstrumentTable {
    type Item = &'a Instrument;
    type IntoIter = std::slice::Iter<'a, Instrument>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
