//! Decoded barcodes arriving as messages.
//!
//! Whatever decodes barcodes (a camera pipeline, a keyboard-wedge scanner)
//! only sends [`CaptureEvent`]s; the lookup loop consumes them one at a time.

use anyhow::Result;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureEvent {
    /// A barcode or product number read from the capture device.
    Decoded(String),
}

/// Forward each non-blank line from `reader` as a decoded identifier.
///
/// Stops at end of input or when the receiving side is gone, and returns
/// how many events were sent.
///
/// # Errors
///
/// Returns an error if reading from `reader` fails.
pub async fn forward_lines<R>(reader: R, events: mpsc::Sender<CaptureEvent>) -> Result<usize>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut sent = 0;

    while let Some(line) = lines.next_line().await? {
        let code = line.trim();
        if code.is_empty() {
            continue;
        }

        debug!("Captured {}", code);
        if events.send(CaptureEvent::Decoded(code.to_string())).await.is_err() {
            break;
        }
        sent += 1;
    }

    Ok(sent)
}
