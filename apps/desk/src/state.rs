use std::path::PathBuf;
use std::sync::Arc;

use tracing::{info, warn};

use crate::api_client::{ApiClient, ResumeFile};
use crate::autosave::{AutoSave, AutoSaveSettings, NoteStore, SaveStatus};
use crate::book::TalentBook;
use crate::config::Config;
use crate::errors::ApiError;
use crate::models::{BatchUploadReport, RecalculationSummary, Talent};
use crate::viewer::ResumeViewer;

/// The talent currently open in the detail view.
pub struct DetailSession {
    pub talent: Talent,
    pub autosave: AutoSave,
}

/// Everything the desk holds between user actions: the API client, the cached
/// talent list, the resume viewer and the open detail session, if any.
pub struct DeskState {
    pub config: Config,
    pub client: ApiClient,
    pub book: TalentBook,
    pub viewer: ResumeViewer,
    detail: Option<DetailSession>,
}

impl DeskState {
    pub fn new(config: Config) -> Result<Self, ApiError> {
        let client = ApiClient::new(&config)?;
        let viewer = ResumeViewer::from_config(&config);
        Ok(Self {
            config,
            client,
            book: TalentBook::new(),
            viewer,
            detail: None,
        })
    }

    /// Fetches the list (optionally searched) and replaces the local copy.
    pub async fn load_talents(&self, query: Option<&str>) -> Result<Vec<Talent>, ApiError> {
        let talents = self.client.list_talents(query).await?;
        self.book.replace_all(talents.clone()).await;
        Ok(talents)
    }

    /// Opens the detail view for `phone`: starts auto-save on its interview
    /// note and points the viewer at its resume. Any open session is closed
    /// (and flushed) first.
    pub async fn open_talent(&mut self, phone: &str) -> Result<&DetailSession, ApiError> {
        self.close_talent().await;

        let talent = match self.book.get(phone).await {
            Some(talent) => talent,
            None => {
                self.load_talents(None).await?;
                self.book
                    .get(phone)
                    .await
                    .ok_or_else(|| ApiError::NotFound(format!("talent {phone}")))?
            }
        };

        match talent.resume() {
            Some(path) => {
                let url = self.client.resume_url(path);
                if self.viewer.begin(&url) {
                    let fetched = self.client.fetch_resume(path).await;
                    self.viewer.finish(fetched);
                }
            }
            None => self.viewer.show_no_resume(),
        }

        let store: Arc<dyn NoteStore> = Arc::new(self.client.clone());
        let autosave = AutoSave::spawn(
            talent.phone.clone(),
            talent.interview_record.clone(),
            store,
            self.book.clone(),
            AutoSaveSettings::from(&self.config),
        );
        info!("Opened talent {}", talent.phone);

        Ok(&*self.detail.insert(DetailSession { talent, autosave }))
    }

    pub fn detail(&self) -> Option<&DetailSession> {
        self.detail.as_ref()
    }

    /// Closes the detail view, saving any unsaved note first.
    pub async fn close_talent(&mut self) -> Option<SaveStatus> {
        let session = self.detail.take()?;
        let phone = session.talent.phone;
        let status = session.autosave.flush_and_close().await;
        if status.is_error() {
            warn!("Closed talent {phone} with unsaved note: {status}");
        } else {
            info!("Closed talent {phone}");
        }
        Some(status)
    }

    /// Re-extracts the open talent's data from its stored resume.
    pub async fn reparse_current(&mut self) -> Result<Talent, ApiError> {
        let phone = match &self.detail {
            Some(session) => session.talent.phone.clone(),
            None => return Err(ApiError::Validation("No talent is open".to_string())),
        };

        let talent = self.client.reparse_resume(&phone).await?;
        if !self.book.replace(talent.clone()).await {
            warn!("Reparsed talent {phone} is not in the local list");
        }
        if let Some(session) = self.detail.as_mut() {
            session.talent = talent.clone();
        }
        info!("Resume reparsed for {phone}");
        Ok(talent)
    }

    /// Uploads resumes from disk and reloads the list when anything landed.
    pub async fn upload(&self, paths: &[PathBuf]) -> Result<BatchUploadReport, ApiError> {
        let mut files = Vec::with_capacity(paths.len());
        for path in paths {
            files.push(ResumeFile::read(path).await?);
        }

        let report = self.client.upload_resumes(files).await?;
        if report.should_reload() {
            self.reload_quietly().await;
        }
        Ok(report)
    }

    /// Recomputes scores server-side, then reloads the list.
    pub async fn recalculate(&self) -> Result<RecalculationSummary, ApiError> {
        let summary = self.client.recalculate_scores().await?;
        self.reload_quietly().await;
        Ok(summary)
    }

    async fn reload_quietly(&self) {
        if let Err(e) = self.load_talents(None).await {
            warn!("Failed to reload talents: {e}");
        }
    }
}
