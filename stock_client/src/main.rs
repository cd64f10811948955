//! Stock board client. Fetches the instrument listing once, then keeps prices current
//! from the provider's live WebSocket channel and re-renders the table on every change.
//!
//! Usage example (CLI):
//! ```bash
//! stock_client --server http://localhost:8080 --unknown-ids insert-unknown
//! ```
//!
//! The board runs on a single-threaded tokio runtime; rendering happens on a separate
//! thread fed through a crossbeam channel so a slow terminal never stalls reconciliation.
#![warn(missing_docs)]
mod args;

use std::io;
use std::thread;

use clap::Parser;
use crossbeam_channel::unbounded;
use log::{error, info};
use stock_client::model::change::Notification;
use stock_client::render::render_loop;
use stock_client::snapshot::HttpInstrumentListing;
use stock_client::{FeedError, LiveBoard, Result};
use tokio::sync::watch;

use crate::args::Args;

fn main() -> Result<(), FeedError> {
    init_logger();
    let args = Args::parse();
    let config = args.to_config()?;
    info!(
        "Snapshot from {}, updates from {}",
        config.snapshot_url, config.updates_url
    );

    let (stop_tx, mut stop_rx) = watch::channel(false);
    ctrlc::set_handler(move || {
        info!("Ctrl+C received. Shutting down board...");
        let _ = stop_tx.send(true);
    })
    .map_err(|e| FeedError::Io(io::Error::other(e)))?;

    let (notify_tx, notify_rx) = unbounded::<Notification>();
    let renderer = thread::spawn(move || {
        if let Err(e) = render_loop(notify_rx, io::stdout().lock()) {
            error!("Renderer failed: {}", e);
        }
        info!("Renderer stopping...");
    });

    let listing = HttpInstrumentListing::from_config(&config)?;
    let board = LiveBoard::new(config, listing, notify_tx);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let summary = runtime.block_on(board.run(async move {
        let _ = stop_rx.wait_for(|stop| *stop).await;
    }));

    if renderer.join().is_err() {
        error!("Renderer thread panicked");
    }
    info!(
        "Final board: {} instruments, snapshot {}, last connection state {}",
        summary.table.len(),
        summary.load_state,
        summary.connection
    );
    Ok(())
}

fn init_logger() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();
}
