//! Debounced auto-save for interview notes.
//!
//! One controller task runs per open detail session. Edits restart a debounce
//! window; when it expires a save is attempted. At most one save is in flight
//! at a time: an attempt made while one is running only raises a pending flag,
//! and exactly one follow-up attempt runs shortly after the running save
//! resolves, carrying whatever the note holds by then.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::warn;

use crate::book::TalentBook;
use crate::config::Config;
use crate::errors::ApiError;

mod controller;
pub mod status;

pub use status::SaveStatus;

/// Where confirmed notes are written. `ApiClient` is the production store.
#[async_trait]
pub trait NoteStore: Send + Sync {
    async fn save_note(&self, phone: &str, content: &str) -> Result<(), ApiError>;
}

#[derive(Debug, Clone, Copy)]
pub struct AutoSaveSettings {
    /// Idle time after the last edit before a save fires.
    pub debounce: Duration,
    /// Extra delay before a paste restarts the debounce window.
    pub paste_settle: Duration,
    /// Delay between a save resolving and its pending follow-up.
    pub follow_up: Duration,
}

impl Default for AutoSaveSettings {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(2000),
            paste_settle: Duration::from_millis(100),
            follow_up: Duration::from_millis(100),
        }
    }
}

impl From<&Config> for AutoSaveSettings {
    fn from(config: &Config) -> Self {
        Self {
            debounce: config.autosave_debounce,
            ..Self::default()
        }
    }
}

pub(crate) enum Command {
    Edit(String),
    Paste(String),
    Close(oneshot::Sender<()>),
}

/// Handle to a running auto-save controller.
pub struct AutoSave {
    phone: String,
    commands: mpsc::UnboundedSender<Command>,
    status: watch::Receiver<SaveStatus>,
    task: JoinHandle<()>,
}

impl AutoSave {
    /// Starts a controller for `phone`, treating `initial` as already saved.
    pub fn spawn(
        phone: impl Into<String>,
        initial: impl Into<String>,
        store: Arc<dyn NoteStore>,
        book: TalentBook,
        settings: AutoSaveSettings,
    ) -> Self {
        let phone = phone.into();
        let (commands, rx) = mpsc::unbounded_channel();
        let (status_tx, status) = watch::channel(SaveStatus::Idle);

        let session = controller::Session::new(
            phone.clone(),
            initial.into(),
            store,
            book,
            settings,
            status_tx,
        );
        let task = tokio::spawn(session.run(rx));

        Self {
            phone,
            commands,
            status,
            task,
        }
    }

    /// The note text changed (typing).
    pub fn edit(&self, content: impl Into<String>) {
        self.send(Command::Edit(content.into()));
    }

    /// The note text changed through a paste.
    pub fn paste(&self, content: impl Into<String>) {
        self.send(Command::Paste(content.into()));
    }

    pub fn status(&self) -> watch::Receiver<SaveStatus> {
        self.status.clone()
    }

    #[cfg(test)]
    pub fn current_status(&self) -> SaveStatus {
        self.status.borrow().clone()
    }

    /// Saves anything not yet persisted, waits for it, and stops the controller.
    pub async fn flush_and_close(self) -> SaveStatus {
        let (ack, done) = oneshot::channel();
        if self.commands.send(Command::Close(ack)).is_ok() {
            let _ = done.await;
        }
        if let Err(e) = self.task.await {
            warn!("Auto-save task for {} ended abnormally: {e}", self.phone);
        }
        let status = self.status.borrow().clone();
        status
    }

    fn send(&self, command: Command) {
        if self.commands.send(command).is_err() {
            warn!("Auto-save for {} is closed; edit dropped", self.phone);
        }
    }
}
