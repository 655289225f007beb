use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use tokio::sync::{mpsc, watch};
use tokio::time::{sleep_until, Instant};
use tracing::{debug, info, warn};

use super::{AutoSaveSettings, Command, NoteStore, SaveStatus};
use crate::book::TalentBook;
use crate::errors::{ApiError, Operation};
use crate::models::MAX_INTERVIEW_RECORD_CHARS;

/// Result of one save request, sent back from the request task.
struct SaveOutcome {
    sent: String,
    result: Result<(), ApiError>,
}

pub(super) struct Session {
    phone: String,
    content: String,
    last_saved: String,
    is_saving: bool,
    pending_save: bool,
    debounce_at: Option<Instant>,
    follow_up_at: Option<Instant>,
    store: Arc<dyn NoteStore>,
    book: TalentBook,
    settings: AutoSaveSettings,
    status: watch::Sender<SaveStatus>,
    done_tx: mpsc::UnboundedSender<SaveOutcome>,
    done_rx: mpsc::UnboundedReceiver<SaveOutcome>,
}

impl Session {
    pub(super) fn new(
        phone: String,
        initial: String,
        store: Arc<dyn NoteStore>,
        book: TalentBook,
        settings: AutoSaveSettings,
        status: watch::Sender<SaveStatus>,
    ) -> Self {
        let (done_tx, done_rx) = mpsc::unbounded_channel();
        Self {
            phone,
            content: initial.clone(),
            last_saved: initial,
            is_saving: false,
            pending_save: false,
            debounce_at: None,
            follow_up_at: None,
            store,
            book,
            settings,
            status,
            done_tx,
            done_rx,
        }
    }

    pub(super) async fn run(mut self, mut commands: mpsc::UnboundedReceiver<Command>) {
        loop {
            let now = Instant::now();
            let debounce_at = self.debounce_at;
            let follow_up_at = self.follow_up_at;

            tokio::select! {
                command = commands.recv() => match command {
                    Some(Command::Edit(text)) => self.on_edit(text, Duration::ZERO),
                    Some(Command::Paste(text)) => {
                        let settle = self.settings.paste_settle;
                        self.on_edit(text, settle);
                    }
                    Some(Command::Close(ack)) => {
                        self.flush().await;
                        let _ = ack.send(());
                        break;
                    }
                    None => {
                        self.flush().await;
                        break;
                    }
                },
                Some(outcome) = self.done_rx.recv() => self.on_saved(outcome).await,
                _ = sleep_until(debounce_at.unwrap_or(now)), if debounce_at.is_some() => {
                    self.debounce_at = None;
                    self.attempt();
                }
                _ = sleep_until(follow_up_at.unwrap_or(now)), if follow_up_at.is_some() => {
                    self.follow_up_at = None;
                    self.attempt();
                }
            }
        }
        debug!("Auto-save for {} stopped", self.phone);
    }

    fn on_edit(&mut self, text: String, settle: Duration) {
        self.content = text;
        self.debounce_at = Some(Instant::now() + settle + self.settings.debounce);
        self.publish(SaveStatus::Waiting);
    }

    /// One save attempt. Never sends while another save is in flight.
    fn attempt(&mut self) {
        if self.is_saving {
            self.pending_save = true;
            return;
        }

        if self.content == self.last_saved {
            self.publish(SaveStatus::Idle);
            return;
        }

        if self.content.chars().count() > MAX_INTERVIEW_RECORD_CHARS {
            self.publish(SaveStatus::too_long());
            return;
        }

        self.is_saving = true;
        self.pending_save = false;
        self.publish(SaveStatus::Saving);

        let sent = self.content.clone();
        let phone = self.phone.clone();
        let store = Arc::clone(&self.store);
        let done = self.done_tx.clone();
        tokio::spawn(async move {
            let result = store.save_note(&phone, &sent).await;
            let _ = done.send(SaveOutcome { sent, result });
        });
    }

    async fn on_saved(&mut self, outcome: SaveOutcome) {
        self.is_saving = false;

        match outcome.result {
            Ok(()) => {
                if !self.book.patch_interview_record(&self.phone, &outcome.sent).await {
                    debug!("Talent {} not in the local book; nothing to patch", self.phone);
                }
                info!("Interview record auto-saved for {}", self.phone);
                // What was sent, not what the editor holds now.
                self.last_saved = outcome.sent;
                self.publish(SaveStatus::Saved { at: Local::now() });
            }
            Err(e) => {
                warn!("Auto-save for {} failed: {e}", self.phone);
                self.publish(SaveStatus::Failed(e.user_message(Operation::SaveNote)));
            }
        }

        if std::mem::take(&mut self.pending_save) {
            self.follow_up_at = Some(Instant::now() + self.settings.follow_up);
        }
    }

    /// Runs any outstanding save to completion before shutdown.
    async fn flush(&mut self) {
        self.debounce_at = None;
        self.follow_up_at = None;
        self.attempt();

        while self.is_saving {
            match self.done_rx.recv().await {
                Some(outcome) => self.on_saved(outcome).await,
                None => break,
            }
            if self.follow_up_at.take().is_some() {
                self.attempt();
            }
        }
    }

    fn publish(&self, status: SaveStatus) {
        self.status.send_replace(status);
    }
}
