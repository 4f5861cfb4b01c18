use crate::{
    AppCommand, AppError, AppResult, StatusView,
    config::Config,
    input_handler::CommandInput,
    status_view::{CAPTURE_ALERT, StatusSnapshot},
};

use clip_recorder_core::{
    AudioPlayer, CpalProvider, RecorderError, RecorderEvent, RecordingController, RecordingState,
};

use std::{io::Write, panic::Location, time::Duration};

use error_location::ErrorLocation;
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

/// Main application state.
///
/// Owns the controller on the runtime thread. Audio callbacks reach it only
/// through `event_rx`; stdin reaches it only through `command_rx`. Capture
/// requests opened by `start` are resolved on a later loop turn through
/// `pending_rx`.
pub struct App<W: Write> {
    pub(crate) controller: RecordingController,
    pub(crate) config: Config,
    pub(crate) command_rx: mpsc::Receiver<CommandInput>,
    pub(crate) event_rx: mpsc::UnboundedReceiver<RecorderEvent>,
    pub(crate) pending_tx: mpsc::UnboundedSender<Uuid>,
    pub(crate) pending_rx: mpsc::UnboundedReceiver<Uuid>,
    pub(crate) view: StatusView<W>,
    pub(crate) player: Option<AudioPlayer>,
    /// Set after warning that `start` would discard an unsaved clip.
    pub(crate) discard_warned: bool,
}

impl<W: Write> App<W> {
    /// Assemble the app around a controller and its channels.
    pub(crate) fn new(
        controller: RecordingController,
        config: Config,
        command_rx: mpsc::Receiver<CommandInput>,
        event_rx: mpsc::UnboundedReceiver<RecorderEvent>,
        view: StatusView<W>,
    ) -> Self {
        let (pending_tx, pending_rx) = mpsc::unbounded_channel();
        Self {
            controller,
            config,
            command_rx,
            event_rx,
            pending_tx,
            pending_rx,
            view,
            player: None,
            discard_warned: false,
        }
    }

    /// Run the main application event loop.
    ///
    /// `forwarder` is the stdin task; it is joined with a timeout on exit.
    #[instrument(skip_all)]
    pub(crate) async fn run(mut self, forwarder: JoinHandle<()>) -> AppResult<()> {
        info!("Clip recorder starting");
        self.report(|view| view.help());
        self.show_status();

        loop {
            // Recorder events first, then pending requests, then input, so a
            // command never overtakes audio that was already captured.
            tokio::select! {
                biased;

                Some(event) = self.event_rx.recv() => {
                    if self.controller.on_event(event) {
                        self.on_stopped();
                    }
                }

                Some(session_id) = self.pending_rx.recv() => {
                    if let Err(e) = self.finish_start(session_id) {
                        error!(session_id = %session_id, error = ?e, "Failed to finish start");
                    }
                }

                input = self.command_rx.recv() => {
                    match input {
                        Some(Ok(AppCommand::Shutdown)) | None => {
                            info!("Shutdown requested");
                            break;
                        }
                        Some(Ok(cmd)) => {
                            if let Err(e) = self.handle_command(cmd) {
                                error!(command = ?cmd, error = ?e, "Failed to handle command");
                            }
                        }
                        Some(Err(AppError::UnknownCommand { input, .. })) => {
                            debug!(input = %input, "Unknown command");
                            self.report(|view| {
                                view.notice(&format!(
                                    "Unknown command {:?}. Type \"help\" for the command list.",
                                    input
                                ))
                            });
                        }
                        Some(Err(e)) => error!(error = ?e, "Input error"),
                    }
                }
            }
        }

        self.player = None;
        self.controller.abort();

        // Drop command_rx so a forwarder that reads one more line exits on
        // its next send.
        drop(self.command_rx);

        match tokio::time::timeout(Duration::from_secs(1), forwarder).await {
            Ok(Ok(())) => debug!("Input forwarder stopped cleanly"),
            Ok(Err(e)) => warn!(error = ?e, "Input forwarder task panicked"),
            Err(_) => debug!(
                "Input forwarder did not stop within timeout, \
                   will be cleaned up on exit"
            ),
        }

        info!("Clip recorder shut down successfully");

        Ok(())
    }

    pub(crate) fn handle_command(&mut self, cmd: AppCommand) -> AppResult<()> {
        self.release_finished_player();

        match cmd {
            AppCommand::Start => self.start_recording(),
            AppCommand::Stop => self.stop_recording(),
            AppCommand::Save => self.save_recording(),
            AppCommand::Play => self.play_recording(),
            AppCommand::Status => self.write_status(),
            AppCommand::Devices => self.list_devices(),
            AppCommand::Help => Ok(self.view.help()?),
            AppCommand::Shutdown => Ok(()),
        }
    }

    /// Open a capture request; the stream is obtained in [`finish_start`](Self::finish_start).
    #[instrument(skip(self))]
    fn start_recording(&mut self) -> AppResult<()> {
        if self.config.behavior.confirm_discard_unsaved
            && self.controller.has_unsaved_result()
            && !self.discard_warned
        {
            self.discard_warned = true;
            warn!(
                session_id = %self.controller.session().id(),
                "Start would discard an unsaved recording, awaiting confirmation"
            );
            self.view.notice(
                "The current recording has not been saved. \
                 Enter \"start\" again to discard it, or \"save\" to keep it.",
            )?;
            return Ok(());
        }

        let Some((session_id, discarded)) = self.controller.begin_request() else {
            self.view.notice("A recording is already in progress.")?;
            return Ok(());
        };

        // The previous clip is gone; its preview goes too.
        self.player = None;
        self.discard_warned = false;

        if let Some(d) = discarded.filter(|d| !d.saved) {
            self.view
                .notice(&format!("Discarded unsaved recording ({} bytes).", d.bytes))?;
        }

        self.pending_tx
            .send(session_id)
            .map_err(|e| AppError::ChannelSendFailed {
                message: format!("Failed to queue capture request: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        self.write_status()
    }

    /// Resolve the capture request opened by `start`.
    #[instrument(skip(self))]
    pub(crate) fn finish_start(&mut self, session_id: Uuid) -> AppResult<()> {
        match self.controller.resolve_request(session_id) {
            Ok(()) => {
                if self.controller.state() != RecordingState::Recording {
                    return Ok(());
                }
                info!(session_id = %session_id, "Recording session live");
                self.write_status()
            }
            Err(e) => {
                error!(session_id = %session_id, error = ?e, "Failed to start recording");
                let alert = match e {
                    RecorderError::CaptureUnavailable { .. } => CAPTURE_ALERT,
                    _ => "Failed to start recording. The capture device could not be started.",
                };
                self.view.alert(alert)?;
                self.write_status()
            }
        }
    }

    #[instrument(skip(self))]
    fn stop_recording(&mut self) -> AppResult<()> {
        if self.controller.stop() {
            self.view.notice("Stopping...")?;
        } else if self.controller.session().stop_requested() {
            self.view.notice("Already stopping, waiting for the last chunk...")?;
        } else {
            self.view.notice("Not recording.")?;
        }
        Ok(())
    }

    #[instrument(skip(self))]
    fn save_recording(&mut self) -> AppResult<()> {
        match self.controller.save() {
            Ok(Some(path)) => {
                self.discard_warned = false;
                self.view.notice(&format!("Saved {}", path.display()))?;
            }
            Ok(None) => self.view.notice("Nothing to save yet.")?,
            Err(e) => {
                error!(error = ?e, "Failed to save recording");
                self.view.alert("Failed to save recording.")?;
            }
        }
        Ok(())
    }

    #[instrument(skip(self))]
    fn play_recording(&mut self) -> AppResult<()> {
        let Some(source) = self.controller.playback_source() else {
            self.view.notice("Nothing to play yet.")?;
            return Ok(());
        };

        // Replacing the player stops the previous preview.
        self.player = None;
        match AudioPlayer::play(source) {
            Ok(player) => {
                self.view.notice(&format!(
                    "Playing {:.1} s",
                    player.duration().as_secs_f64()
                ))?;
                self.player = Some(player);
            }
            Err(e) => {
                error!(error = ?e, "Failed to play recording");
                self.view.alert("Failed to play recording.")?;
            }
        }
        Ok(())
    }

    fn list_devices(&mut self) -> AppResult<()> {
        let names = CpalProvider::new().input_device_names()?;
        if names.is_empty() {
            self.view.notice("No capture devices found.")?;
            return Ok(());
        }

        self.view.notice("Capture devices:")?;
        for name in names {
            self.view.notice(&format!("  {}", name))?;
        }
        Ok(())
    }

    pub(crate) fn on_stopped(&mut self) {
        if let Some(recording) = self.controller.result() {
            let message = format!(
                "Recording ready: {:.1} s. Enter \"save\" or \"play\".",
                recording.duration().as_secs_f64()
            );
            self.report(|view| view.notice(&message));
        }
        self.show_status();
    }

    fn release_finished_player(&mut self) {
        if self.player.as_ref().is_some_and(AudioPlayer::is_finished) {
            self.player = None;
            debug!("Finished preview released");
        }
    }

    fn write_status(&mut self) -> AppResult<()> {
        let status = StatusSnapshot::of(&self.controller);
        Ok(self.view.render(&status)?)
    }

    fn show_status(&mut self) {
        if let Err(e) = self.write_status() {
            error!(error = ?e, "Failed to render status");
        }
    }

    fn report(&mut self, write: impl FnOnce(&mut StatusView<W>) -> std::io::Result<()>) {
        if let Err(e) = write(&mut self.view) {
            error!(error = ?e, "Failed to write to terminal");
        }
    }
}
