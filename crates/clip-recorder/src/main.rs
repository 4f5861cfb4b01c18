//! Clip Recorder: capture system audio in chunks and save it as `recording.wav`.

mod app;
mod app_command;
mod config;
mod error;
mod input_handler;
mod status_view;

pub(crate) use {
    app::App,
    app_command::AppCommand,
    error::{AppError, Result as AppResult},
    input_handler::InputHandler,
    status_view::StatusView,
};

use crate::config::Config;

use std::{io, sync::Arc, time::Duration};

use clip_recorder_core::{
    CpalProvider, DownloadSaver, EventSink, RecorderEvent, RecordingController,
};
use tokio::sync::mpsc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "clip_recorder=info,clip_recorder_core=info";

/// Application entry point.
fn main() {
    // stderr keeps log lines out of the status view on stdout.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_writer(io::stderr)
        .init();

    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to load config: {:?}", e);
            std::process::exit(1);
        }
    };

    // Current-thread runtime: the controller holds cpal streams, which are
    // not Send on every platform.
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

    rt.block_on(async {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let sink: EventSink = Arc::new(move |event: RecorderEvent| {
            // Closed only during shutdown.
            let _ = event_tx.send(event);
        });

        let (command_tx, command_rx) = mpsc::channel(32);
        let forwarder = InputHandler::new(command_tx).spawn();

        let saver = DownloadSaver::new(
            config.output.directory.clone(),
            config.output.on_conflict.into(),
        );
        info!(output_dir = ?saver.directory(), "Recordings will be saved here");

        let controller = RecordingController::new(
            Box::new(CpalProvider::new()),
            Box::new(saver),
            sink,
            config.capture.to_request(),
        );

        let app = App::new(
            controller,
            config,
            command_rx,
            event_rx,
            StatusView::new(io::stdout()),
        );

        if let Err(e) = app.run(forwarder).await {
            error!(error = ?e, "App error");
        }
    });

    // A forwarder parked on stdin never returns on its own.
    rt.shutdown_timeout(Duration::from_millis(100));
}
