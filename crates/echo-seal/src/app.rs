use crate::{
    AppCommand, AppError, AppResult, HistorySelector, InputMode, OutputHandler, Presenter,
    config::Config,
};

use std::{io::Stdout, panic::Location, path::Path, time::Instant};

use echo_seal_core::{
    AudioCapture, ControllerEvents, ControllerOptions, Credential, CpalBackend, DecodeError,
    DecodePipeline, HistoryStore, JsonFileBackend, NOTICE_EMPTY_CREDENTIAL, RecordingPhase,
    SealArtifact, SealController, SealPipeline, SealVault, ServiceClient, SharedHistory,
    ToastNotification, UiEvent, check_image_format,
};
use error_location::ErrorLocation;
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, instrument, warn};

/// Shown once a seal has been decoded.
const NOTICE_DECRYPTED: &str = "Message decrypted successfully!";

/// Whether the main loop keeps going.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

/// Main application state.
///
/// Owns the controller and everything the terminal front-end needs. All
/// state changes happen on the task running [`App::run`].
pub struct App {
    controller: SealController,
    controller_events: ControllerEvents,
    ui_rx: mpsc::UnboundedReceiver<UiEvent>,
    decoder: DecodePipeline,
    decode_tx: mpsc::UnboundedSender<Result<String, DecodeError>>,
    decode_rx: mpsc::UnboundedReceiver<Result<String, DecodeError>>,
    history: SharedHistory,
    vault: SealVault,
    output: Option<OutputHandler>,
    presenter: Presenter<Stdout>,
    config: Config,
    line_rx: mpsc::Receiver<String>,
    shutdown_tx: watch::Sender<bool>,
    pending_unseal: Option<Vec<u8>>,
}

impl App {
    /// Build the application from configuration.
    #[track_caller]
    #[instrument(skip_all)]
    pub fn new(
        config: Config,
        data_dir: &Path,
        line_rx: mpsc::Receiver<String>,
        shutdown_tx: watch::Sender<bool>,
    ) -> AppResult<Self> {
        let client = ServiceClient::new(
            config.service.base_url.clone(),
            config.service.request_timeout(),
        )
        .map_err(|e| AppError::ConfigError {
            reason: format!("Failed to build HTTP client: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        let history =
            HistoryStore::open(Box::new(JsonFileBackend::in_dir(data_dir)))?.into_shared();
        let vault = SealVault::new(data_dir.join("seals"));
        let pipeline = SealPipeline::new(client.clone(), history.clone(), vault.clone());

        let capture = AudioCapture::new(Box::new(CpalBackend::new(
            config.audio.selected_device.clone(),
        )));
        let options = ControllerOptions {
            max_recording_secs: config.audio.max_recording_secs,
            ..ControllerOptions::default()
        };

        let (ui_tx, ui_rx) = mpsc::unbounded_channel();
        let (controller, controller_events) =
            SealController::new(capture, pipeline, options, ui_tx);
        let (decode_tx, decode_rx) = mpsc::unbounded_channel();

        // Clipboard is optional; headless sessions still seal and unseal.
        let output = match OutputHandler::new() {
            Ok(output) => Some(output),
            Err(e) => {
                warn!(error = %e, "Clipboard unavailable");
                None
            }
        };

        Ok(Self {
            controller,
            controller_events,
            ui_rx,
            decoder: DecodePipeline::new(client),
            decode_tx,
            decode_rx,
            history,
            vault,
            output,
            presenter: Presenter::stdout(),
            config,
            line_rx,
            shutdown_tx,
            pending_unseal: None,
        })
    }

    /// Run the main application event loop.
    #[instrument(skip(self))]
    pub async fn run(mut self) -> AppResult<()> {
        info!(base_url = %self.config.service.base_url, "Echo Seal starting");

        self.presenter.help()?;
        self.presenter.phase(RecordingPhase::Idle)?;
        self.presenter.prompt(InputMode::Command)?;

        loop {
            tokio::select! {
                line = self.line_rx.recv() => {
                    let Some(line) = line else {
                        info!("Input closed, shutting down");
                        break;
                    };
                    let mode = self.input_mode();
                    let command = AppCommand::parse(&line, mode);
                    if self.handle_command(command).await == Flow::Quit {
                        info!("Shutdown requested");
                        break;
                    }
                    self.presenter.prompt(self.input_mode())?;
                }

                Some(event) = self.controller_events.recv() => {
                    self.controller.handle(event);
                }

                Some(event) = self.ui_rx.recv() => {
                    self.handle_ui_event(event)?;
                }

                Some(result) = self.decode_rx.recv() => {
                    self.handle_decoded(result)?;
                    self.presenter.prompt(self.input_mode())?;
                }
            }
        }

        self.controller.shutdown();
        if self.shutdown_tx.send(true).is_err() {
            debug!("Terminal input already stopped");
        }
        info!("Echo Seal shut down successfully");

        Ok(())
    }

    fn input_mode(&self) -> InputMode {
        if self.pending_unseal.is_some() {
            InputMode::UnsealCredential
        } else if self.controller.phase() == RecordingPhase::AwaitingCredential {
            InputMode::SealCredential
        } else {
            InputMode::Command
        }
    }

    async fn handle_command(&mut self, command: AppCommand) -> Flow {
        let result = match command {
            AppCommand::Quit => return Flow::Quit,
            AppCommand::Toggle => self.toggle(),
            AppCommand::Record => self.controller.start().map(|_| ()).map_err(AppError::from),
            AppCommand::Stop => self.controller.stop().map_err(AppError::from),
            AppCommand::Reset => self.controller.reset().map_err(AppError::from),
            AppCommand::Unseal { path } => self.select_unseal_image(&path).await,
            AppCommand::Credential(credential) => self.credential(credential),
            AppCommand::Cancel => self.cancel(),
            AppCommand::History => self.list_history().await,
            AppCommand::Delete(selector) => self.delete_seal(selector).await,
            AppCommand::Copy(selector) => self.copy_seal(selector).await,
            AppCommand::Open(selector) => self.open_seal(selector).await,
            AppCommand::Help => self.presenter.help().map_err(AppError::from),
            AppCommand::Unknown(input) => self.notify(ToastNotification::warning(format!(
                "Unknown command: {}. Type help for commands.",
                input
            ))),
        };

        if let Err(e) = result {
            // Controller errors already raised their own notice.
            match e {
                AppError::Controller { .. } => debug!(error = %e, "Command rejected"),
                _ => {
                    error!(error = %e, "Command failed");
                    let toast = ToastNotification::error(e.notice_text());
                    if let Err(e) = self.notify(toast) {
                        error!(error = %e, "Failed to render notice");
                    }
                }
            }
        }

        Flow::Continue
    }

    fn toggle(&mut self) -> AppResult<()> {
        match self.controller.phase() {
            RecordingPhase::Idle => self.controller.start().map(|_| ())?,
            RecordingPhase::Recording => self.controller.stop()?,
            RecordingPhase::Succeeded | RecordingPhase::Failed => self.controller.reset()?,
            RecordingPhase::Submitting => {
                self.notify(ToastNotification::info("Seal is still being created"))?
            }
            RecordingPhase::AwaitingCredential => {}
        }
        Ok(())
    }

    fn credential(&mut self, credential: String) -> AppResult<()> {
        let Some(image) = self.pending_unseal.take() else {
            return self.controller.submit(credential).map_err(AppError::from);
        };

        let Some(credential) = Credential::parse(credential) else {
            self.pending_unseal = Some(image);
            return self.notify(ToastNotification::warning(NOTICE_EMPTY_CREDENTIAL));
        };

        let decoder = self.decoder.clone();
        let decode_tx = self.decode_tx.clone();
        tokio::spawn(async move {
            let result = decoder.decode(image, credential.expose()).await;
            drop(credential);
            if decode_tx.send(result).is_err() {
                debug!("App gone before decode finished");
            }
        });

        self.notify(ToastNotification::info("Decrypting..."))
    }

    fn cancel(&mut self) -> AppResult<()> {
        if self.pending_unseal.take().is_some() {
            return self.notify(ToastNotification::info("Unseal cancelled"));
        }
        self.controller.cancel().map_err(AppError::from)
    }

    #[instrument(skip(self))]
    async fn select_unseal_image(&mut self, path: &Path) -> AppResult<()> {
        if matches!(
            self.controller.phase(),
            RecordingPhase::Recording | RecordingPhase::AwaitingCredential
        ) {
            return self.notify(ToastNotification::info(
                "Finish the current recording before unsealing",
            ));
        }

        let bytes = tokio::fs::read(path).await?;
        let format = check_image_format(&bytes)?;

        info!(path = %path.display(), format = ?format, "Seal image selected");
        self.pending_unseal = Some(bytes);
        Ok(())
    }

    fn handle_decoded(&mut self, result: Result<String, DecodeError>) -> AppResult<()> {
        let message = match result {
            Ok(message) => message,
            Err(e) => {
                warn!(error = %e, "Unseal failed");
                return self.notify(ToastNotification::error(e.notice_text()));
            }
        };

        self.presenter.decoded(&message)?;
        self.notify(ToastNotification::success(NOTICE_DECRYPTED))?;

        if !self.config.behavior.copy_decoded_to_clipboard {
            return Ok(());
        }

        if let Some(output) = self.output.as_mut() {
            match output.copy_text(&message) {
                Ok(()) => self.notify(ToastNotification::success("Message copied to clipboard"))?,
                Err(e) => warn!(error = %e, "Failed to copy decoded message"),
            }
        }

        Ok(())
    }

    fn handle_ui_event(&mut self, event: UiEvent) -> AppResult<()> {
        match event {
            UiEvent::PhaseChanged(phase) => {
                self.presenter.phase(phase)?;
                if phase != RecordingPhase::AwaitingCredential {
                    self.presenter.prompt(self.input_mode())?;
                }
            }
            UiEvent::Elapsed(secs) => self.presenter.elapsed(secs)?,
            UiEvent::Signal(frame) => self.presenter.signal(frame)?,
            UiEvent::Toast(toast) => self.notify(toast)?,
            UiEvent::Sealed(artifact) => {
                self.presenter.sealed(&artifact)?;
                if self.config.behavior.open_seal_after_create {
                    self.open_path(artifact.image_reference())?;
                }
            }
        }
        Ok(())
    }

    fn notify(&mut self, toast: ToastNotification) -> AppResult<()> {
        self.presenter.prune_toasts(Instant::now());
        self.presenter.toast(toast)?;
        Ok(())
    }

    async fn resolve(&self, selector: HistorySelector) -> AppResult<SealArtifact> {
        let history = self.history.lock().await;
        let found = match selector {
            HistorySelector::Index(n) => history.get_index(n - 1),
            HistorySelector::Id(id) => history.get(id),
        };

        found.cloned().ok_or_else(|| AppError::NoSuchSeal {
            selector: match selector {
                HistorySelector::Index(n) => format!("#{}", n),
                HistorySelector::Id(id) => id.to_string(),
            },
            location: ErrorLocation::from(Location::caller()),
        })
    }

    async fn list_history(&mut self) -> AppResult<()> {
        let entries = self.history.lock().await.entries().to_vec();
        self.presenter.history(&entries)?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_seal(&mut self, selector: HistorySelector) -> AppResult<()> {
        let artifact = self.resolve(selector).await?;
        self.controller.pipeline().delete(artifact.id()).await?;

        self.notify(ToastNotification::success("Seal deleted"))
    }

    #[instrument(skip(self))]
    async fn copy_seal(&mut self, selector: HistorySelector) -> AppResult<()> {
        let artifact = self.resolve(selector).await?;
        let bytes = self.vault.read(artifact.image_reference()).await?;

        let Some(output) = self.output.as_mut() else {
            return Err(AppError::ClipboardError {
                reason: "Clipboard unavailable".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        };
        output.copy_image(&bytes)?;

        self.notify(ToastNotification::success("Seal image copied to clipboard"))
    }

    #[instrument(skip(self))]
    async fn open_seal(&mut self, selector: HistorySelector) -> AppResult<()> {
        let artifact = self.resolve(selector).await?;
        self.open_path(artifact.image_reference())
    }

    fn open_path(&self, path: &Path) -> AppResult<()> {
        open::that(path)?;
        info!(path = %path.display(), "Opened seal");
        Ok(())
    }
}
