//! Streams markers from the topic to a writer as JSON lines

use std::io::{self, Write};
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::warn;
use vrx_markers::Marker;

/// Outcome of draining the marker topic
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PrintStats {
    /// Markers written to the output
    pub printed: usize,
    /// Markers overwritten in the channel before they could be printed
    pub lost: u64,
}

/// Write every marker received on `rx` until all publishers are gone
pub async fn print_markers<W: Write>(
    mut rx: broadcast::Receiver<Marker>,
    out: &mut W,
) -> io::Result<PrintStats> {
    let mut stats = PrintStats::default();
    loop {
        match rx.recv().await {
            Ok(marker) => {
                let json = serde_json::to_string(&marker)?;
                writeln!(out, "{}", json)?;
                out.flush()?;
                stats.printed += 1;
            }
            Err(RecvError::Lagged(n)) => {
                warn!(skipped = n, "Marker printer lagged");
                stats.lost += n;
            }
            Err(RecvError::Closed) => break,
        }
    }
    Ok(stats)
}
