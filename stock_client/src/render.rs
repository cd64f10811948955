//! Text rendering of the board.
//!
//! This is the thin presentation layer: prices with two decimals, the refresh cadence
//! as "<n> seconds", and a fixed-column table with a header row.

use std::fmt::Write;
use std::io;

use crossbeam_channel::Receiver;
use stock_common::Instrument;

use crate::model::change::{Notification, TableChange};

const HEADERS: [&str; 4] = ["Symbol", "Open Price", "Current Price", "Refresh Interval"];

/// One display row, all cells already formatted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow {
    /// Ticker cell.
    pub symbol: String,
    /// Open price cell.
    pub open_price: String,
    /// Current price cell.
    pub current_price: String,
    /// Refresh interval cell.
    pub refresh_interval: String,
}

impl TableRow {
    fn cells(&self) -> [&str; 4] {
        [
            &self.symbol,
            &self.open_price,
            &self.current_price,
            &self.refresh_interval,
        ]
    }
}

impl From<&Instrument> for TableRow {
    fn from(instrument: &Instrument) -> Self {
        Self {
            symbol: instrument.symbol.clone(),
            open_price: format_price(instrument.open_price),
            current_price: format_price(instrument.current_price),
            refresh_interval: format!("{} seconds", instrument.refresh_interval_seconds),
        }
    }
}

/// Price with exactly two decimals.
pub fn format_price(price: f64) -> String {
    format!("{:.2}", price)
}

/// Render `instruments` as an aligned text table, one line per row plus a header.
pub fn render_table(instruments: &[Instrument]) -> String {
    let rows: Vec<TableRow> = instruments.iter().map(TableRow::from).collect();

    let mut widths = HEADERS.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row.cells()) {
            *width = (*width).max(cell.len());
        }
    }

    let mut out = String::new();
    write_line(&mut out, HEADERS, &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    let _ = writeln!(out, "{}", rule.join("-+-"));
    for row in &rows {
        write_line(&mut out, row.cells(), &widths);
    }
    out
}

fn write_line(out: &mut String, cells: [&str; 4], widths: &[usize; 4]) {
    let line: Vec<String> = cells
        .iter()
        .zip(widths)
        .enumerate()
        .map(|(column, (cell, width))| {
            if column == 0 {
                format!("{:<width$}", cell, width = *width)
            } else {
                format!("{:>width$}", cell, width = *width)
            }
        })
        .collect();
    let _ = writeln!(out, "{}", line.join(" | ").trim_end());
}

/// Render a notification: a status line followed by the table.
pub fn render_notification(notification: &Notification) -> String {
    let status = match &notification.change {
        TableChange::Loaded { rows } => format!("snapshot loaded ({} instruments)", rows),
        TableChange::Updated { id, .. } => format!("updated {}", id),
        TableChange::Inserted { id, .. } => format!("new instrument {}", id),
    };
    format!(
        "[{}] {}\n{}",
        notification.at.format("%H:%M:%S"),
        status,
        render_table(&notification.rows)
    )
}

/// Print the empty board, then the board after every notification, until the sender
/// side of `notifications` is dropped.
pub fn render_loop<W: io::Write>(
    notifications: Receiver<Notification>,
    mut out: W,
) -> io::Result<()> {
    writeln!(out, "{}", render_table(&[]))?;
    out.flush()?;
    for notification in notifications.iter() {
        writeln!(out, "{}", render_notification(&notification))?;
        out.flush()?;
    }
    Ok(())
}
