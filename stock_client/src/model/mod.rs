//! In-memory state of the board.
//!
//! - `table` — the ordered, id-keyed instrument collection.
//! - `change` — change notifications delivered to the presentation layer.
pub mod change;
pub mod table;
