//! Line-oriented terminal input.
//!
//! Reads stdin line by line and forwards each line to the application over an
//! async channel. The channel closing tells the app that input ended.

use crate::{AppError, AppResult};

use std::panic::Location;

use error_location::ErrorLocation;
use tokio::{
    io::{AsyncBufReadExt, AsyncRead, BufReader},
    sync::{mpsc, watch},
};
use tracing::{debug, info, instrument, warn};

/// Forwards terminal lines to the application.
pub struct TerminalInput<R> {
    reader: R,
    line_tx: mpsc::Sender<String>,
}

impl TerminalInput<tokio::io::Stdin> {
    /// Read from the process's stdin.
    pub fn stdin(line_tx: mpsc::Sender<String>) -> Self {
        Self::new(tokio::io::stdin(), line_tx)
    }
}

impl<R: AsyncRead + Unpin> TerminalInput<R> {
    /// Read lines from `reader`.
    pub fn new(reader: R, line_tx: mpsc::Sender<String>) -> Self {
        Self { reader, line_tx }
    }

    /// Forward lines until input ends or shutdown is signalled.
    ///
    /// Dropping `self` on return closes the channel.
    #[instrument(skip(self, shutdown_rx))]
    pub async fn run(self, mut shutdown_rx: watch::Receiver<bool>) -> AppResult<()> {
        let mut lines = BufReader::new(self.reader).lines();

        loop {
            tokio::select! {
                _ = shutdown_rx.changed() => {
                    info!("Terminal input shutting down");
                    break;
                }
                line = lines.next_line() => {
                    match line {
                        Ok(Some(line)) => {
                            self.line_tx.send(line).await.map_err(|e| {
                                AppError::ChannelSendFailed {
                                    message: format!("Failed to forward input line: {}", e),
                                    location: ErrorLocation::from(Location::caller()),
                                }
                            })?;
                        }
                        Ok(None) => {
                            debug!("Input closed");
                            break;
                        }
                        Err(e) => {
                            warn!(error = %e, "Failed to read input");
                            break;
                        }
                    }
                }
            }
        }

        Ok(())
    }
}
