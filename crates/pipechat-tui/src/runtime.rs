//! Async runtime
//!
//! Event loop that drives terminal I/O and feeds the App state machine.
//! Uses `tokio::select!` to handle terminal events, server frames, finished
//! uploads and session timers concurrently.

use std::{io, path::PathBuf, time::Instant};

use crossterm::event::{Event, EventStream, KeyCode, KeyEventKind, KeyModifiers};
use futures::StreamExt;
use pipechat_client::{
    Environment, SessionConfig, SessionError, UploadId,
    transport::{self, ConnectedClient, TransportEvent},
    uploader::{UploadError, Uploader},
};
use thiserror::Error;
use tokio::sync::mpsc;

use crate::{
    App, AppAction, AppEvent, InputState, KeyInput, SystemEnv,
    config::{Args, ConfigError},
    terminal::TerminalGuard,
};

/// Finished uploads waiting to be handed to the App.
const UPLOAD_CHANNEL_CAPACITY: usize = 16;

/// Runtime errors.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// I/O error from terminal operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Bad command-line configuration.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The session refused the configuration.
    #[error("session error: {0}")]
    Session(#[from] SessionError),

    /// The HTTP client could not be built.
    #[error("upload client error: {0}")]
    Upload(#[from] UploadError),
}

/// Async runtime for the TUI.
///
/// Owns the terminal, the App, the line editor and the connection. Every
/// state change goes through the App; the runtime only executes the
/// [`AppAction`]s it returns.
pub struct Runtime {
    env: SystemEnv,
    app: App<SystemEnv>,
    input: InputState,
    server: String,
    initial_room: Option<String>,
    connection: Option<ConnectedClient>,
    uploader: Uploader,
    upload_tx: mpsc::Sender<AppEvent>,
    upload_rx: mpsc::Receiver<AppEvent>,
    terminal: TerminalGuard,
}

impl Runtime {
    /// Build the runtime from command-line arguments.
    ///
    /// Configuration is validated before the terminal switches to raw mode,
    /// so errors print normally.
    pub fn new(args: &Args) -> Result<Self, RuntimeError> {
        let uploader = Uploader::new(args.upload_endpoint()?)?;
        let env = SystemEnv::new();
        let app = App::new(env.clone(), SessionConfig::new(&args.user), !args.no_notify)?;
        let (upload_tx, upload_rx) = mpsc::channel(UPLOAD_CHANNEL_CAPACITY);
        let terminal = TerminalGuard::new()?;

        Ok(Self {
            env,
            app,
            input: InputState::new(),
            server: args.server.clone(),
            initial_room: args.room.clone(),
            connection: None,
            uploader,
            upload_tx,
            upload_rx,
            terminal,
        })
    }

    /// Run the main event loop until the user quits.
    pub async fn run(mut self) -> Result<(), RuntimeError> {
        let (cols, rows) = self.terminal.size()?;
        let actions = self.app.handle(AppEvent::Resize(cols, rows));
        self.process_actions(actions).await?;
        self.terminal.set_title(self.app.title())?;

        if self.connect().await? {
            return Ok(());
        }

        let mut event_stream = EventStream::new();

        loop {
            let deadline = self.app.session().next_deadline();
            let should_quit = tokio::select! {
                // Terminal events
                maybe_event = event_stream.next() => {
                    match maybe_event {
                        Some(Ok(event)) => self.handle_terminal_event(event).await?,
                        Some(Err(e)) => return Err(RuntimeError::Io(e)),
                        None => true,
                    }
                }

                // Frames from server
                Some(event) = next_transport_event(&mut self.connection) => {
                    self.handle_transport_event(event).await?
                }

                // Finished uploads
                Some(event) = self.upload_rx.recv() => {
                    let actions = self.app.handle(event);
                    self.process_actions(actions).await?
                }

                // Session timers
                () = timer_due(&self.env, deadline) => {
                    let now = self.env.now();
                    let actions = self.app.handle(AppEvent::Tick { now });
                    self.process_actions(actions).await?
                }
            };

            if should_quit {
                break;
            }
        }

        if let Some(conn) = &self.connection {
            conn.stop();
        }
        Ok(())
    }

    /// Open the WebSocket and join the startup room. Returns whether to
    /// quit.
    async fn connect(&mut self) -> Result<bool, RuntimeError> {
        tracing::info!(server = %self.server, "connecting");

        let actions = match transport::connect(&self.server).await {
            Ok(client) => {
                tracing::info!("connected");
                self.connection = Some(client);
                let mut actions = self.app.handle(AppEvent::Connected);
                if let Some(room) = self.initial_room.take() {
                    actions.extend(self.app.join(room, None));
                }
                actions
            },
            Err(e) => {
                tracing::warn!(error = %e, "connect failed");
                self.app.handle(AppEvent::Disconnected { reason: e.to_string() })
            },
        };

        self.process_actions(actions).await
    }

    /// Handle a terminal event and return whether to quit.
    async fn handle_terminal_event(&mut self, event: Event) -> Result<bool, RuntimeError> {
        let actions = match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL)
                {
                    return Ok(true);
                }
                match convert_key(key.code) {
                    Some(key_input) => self.input.handle_key(key_input, &mut self.app),
                    None => return Ok(false),
                }
            },
            Event::Resize(cols, rows) => self.app.handle(AppEvent::Resize(cols, rows)),
            Event::FocusGained => self.app.handle(AppEvent::FocusGained),
            Event::FocusLost => self.app.handle(AppEvent::FocusLost),
            _ => return Ok(false),
        };

        self.process_actions(actions).await
    }

    async fn handle_transport_event(&mut self, event: TransportEvent) -> Result<bool, RuntimeError> {
        let app_event = match event {
            TransportEvent::Frame(raw) => AppEvent::Frame(raw),
            TransportEvent::Closed { reason } => {
                tracing::info!(%reason, "connection closed");
                self.connection = None;
                AppEvent::Disconnected { reason }
            },
        };

        let actions = self.app.handle(app_event);
        self.process_actions(actions).await
    }

    /// Process actions returned by the app. Returns true if should quit.
    ///
    /// Uses iterative processing to avoid async recursion between actions and
    /// events.
    async fn process_actions(
        &mut self,
        initial_actions: Vec<AppAction>,
    ) -> Result<bool, RuntimeError> {
        let mut pending_actions = initial_actions;

        while !pending_actions.is_empty() {
            let actions = std::mem::take(&mut pending_actions);

            for action in actions {
                match action {
                    AppAction::Render => self.terminal.draw(&self.app, &self.input)?,
                    AppAction::Quit => return Ok(true),
                    AppAction::Send(frame) => self.send(frame).await,
                    AppAction::SetTitle(title) => self.terminal.set_title(&title)?,
                    AppAction::PrepareUpload { path } => {
                        pending_actions.extend(self.prepare_upload(path).await);
                    },
                    AppAction::Upload { id, path } => self.spawn_upload(id, path),
                }
            }
        }
        Ok(false)
    }

    async fn send(&mut self, frame: String) {
        let Some(conn) = &self.connection else {
            tracing::warn!(%frame, "dropping frame, not connected");
            return;
        };
        if conn.to_server.send(frame).await.is_err() {
            tracing::warn!("connection task is gone");
        }
    }

    /// Stat the file so the session can check the size before anything is
    /// read.
    async fn prepare_upload(&mut self, path: PathBuf) -> Vec<AppAction> {
        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => self.app.start_upload(path, meta.len()),
            Ok(_) => {
                self.app.set_status(format!("{} is not a file", path.display()));
                vec![AppAction::Render]
            },
            Err(e) => {
                self.app.set_status(format!("Cannot read {}: {e}", path.display()));
                vec![AppAction::Render]
            },
        }
    }

    fn spawn_upload(&self, id: UploadId, path: PathBuf) {
        let uploader = self.uploader.clone();
        let results = self.upload_tx.clone();

        tokio::spawn(async move {
            let result = uploader.upload(&path).await.map_err(|e| {
                tracing::warn!(path = %path.display(), error = %e, "upload failed");
                e.to_string()
            });
            let _ = results.send(AppEvent::UploadFinished { id, result }).await;
        });
    }
}

/// Next event from the connection, or never if there is none.
async fn next_transport_event(connection: &mut Option<ConnectedClient>) -> Option<TransportEvent> {
    match connection {
        Some(conn) => conn.from_server.recv().await,
        None => std::future::pending().await,
    }
}

/// Sleep until `deadline`, or never if no timer is pending.
async fn timer_due(env: &SystemEnv, deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => env.sleep(deadline.saturating_duration_since(env.now())).await,
        None => std::future::pending().await,
    }
}

/// Convert crossterm `KeyCode` to `KeyInput`.
fn convert_key(code: KeyCode) -> Option<KeyInput> {
    match code {
        KeyCode::Char(c) => Some(KeyInput::Char(c)),
        KeyCode::Enter => Some(KeyInput::Enter),
        KeyCode::Backspace => Some(KeyInput::Backspace),
        KeyCode::Delete => Some(KeyInput::Delete),
        KeyCode::Tab => Some(KeyInput::Tab),
        KeyCode::Esc => Some(KeyInput::Esc),
        KeyCode::Left => Some(KeyInput::Left),
        KeyCode::Right => Some(KeyInput::Right),
        KeyCode::Home => Some(KeyInput::Home),
        KeyCode::End => Some(KeyInput::End),
        _ => None,
    }
}
