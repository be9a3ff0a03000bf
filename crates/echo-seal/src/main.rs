//! Echo Seal: record a voice message, seal it into an image, unseal it again.

mod app;
mod app_command;
mod config;
mod error;
mod output_handler;
mod presenter;
mod terminal;

pub(crate) use {
    app::App,
    app_command::{AppCommand, HistorySelector, InputMode},
    error::{AppError, Result as AppResult},
    output_handler::OutputHandler,
    presenter::Presenter,
    terminal::TerminalInput,
};

use crate::config::Config;

use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tracing::error;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "echo_seal=info,echo_seal_core=info";

/// Application entry point.
fn main() {
    // Logs go to stderr so they never interleave with the prompt on stdout.
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to load config: {:?}", e);
            std::process::exit(1);
        }
    };

    let data_dir = match Config::data_dir() {
        Ok(d) => d,
        Err(e) => {
            error!("Failed to resolve data directory: {:?}", e);
            std::process::exit(1);
        }
    };

    // Single-threaded: the capture stream handle is not Send on every
    // platform, so the controller stays on the runtime's only thread.
    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            error!("Failed to create tokio runtime: {:?}", e);
            std::process::exit(1);
        }
    };

    let exit_code = rt.block_on(async {
        let (line_tx, line_rx) = mpsc::channel(32);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let app = match App::new(config, &data_dir, line_rx, shutdown_tx) {
            Ok(app) => app,
            Err(e) => {
                error!("Failed to start: {:?}", e);
                return 1;
            }
        };
        let terminal = TerminalInput::stdin(line_tx);

        let (input_result, app_result) = tokio::join!(terminal.run(shutdown_rx), app.run());

        if let Err(e) = input_result {
            error!(error = ?e, "Terminal input error");
        }
        match app_result {
            Ok(()) => 0,
            Err(e) => {
                error!(error = ?e, "App error");
                1
            }
        }
    });

    // Stdin reads block a worker thread that never returns on its own.
    rt.shutdown_timeout(Duration::from_secs(1));
    std::process::exit(exit_code);
}
