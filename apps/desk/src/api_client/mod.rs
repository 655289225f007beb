/// Talent API client. Every request the desk makes goes through here.
///
/// Deadlines are enforced around the whole exchange (send + body read) with a
/// tokio timeout, so an expired request is dropped and reported as
/// `ApiError::Timeout` rather than as a generic network failure.
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, RequestBuilder};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::autosave::NoteStore;
use crate::config::Config;
use crate::errors::ApiError;
use crate::models::upload::UploadResponse;
use crate::models::{BatchUploadReport, RecalculationSummary, Talent};

pub mod upload;

pub use upload::ResumeFile;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InterviewRecordRequest<'a> {
    interview_record: &'a str,
}

#[derive(Debug, Deserialize)]
struct TalentEnvelope {
    #[serde(default)]
    talent: Option<Talent>,
}

#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    note_save_timeout: Duration,
    reparse_timeout: Duration,
}

impl ApiClient {
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        let client = Client::builder().connect_timeout(CONNECT_TIMEOUT).build()?;
        Ok(Self {
            client,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            note_save_timeout: config.note_save_timeout,
            reparse_timeout: config.reparse_timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Absolute URL of a stored resume, as the frame viewer loads it.
    pub fn resume_url(&self, resume_path: &str) -> String {
        self.url(resume_path)
    }

    /// GET /talents, optionally filtered by a server-side search query.
    pub async fn list_talents(&self, query: Option<&str>) -> Result<Vec<Talent>, ApiError> {
        let mut request = self.client.get(self.url("/talents"));
        if let Some(q) = query.map(str::trim).filter(|q| !q.is_empty()) {
            request = request.query(&[("query", q)]);
        }
        let talents: Vec<Talent> = self.call(request, None).await?;
        info!("Loaded {} talents", talents.len());
        Ok(talents)
    }

    /// POST /talent/:phone/interview-record
    pub async fn save_interview_record(
        &self,
        phone: &str,
        content: &str,
    ) -> Result<Option<Talent>, ApiError> {
        let request = self
            .client
            .post(self.url(&format!("/talent/{phone}/interview-record")))
            .json(&InterviewRecordRequest {
                interview_record: content,
            });
        let envelope: TalentEnvelope = self.call(request, Some(self.note_save_timeout)).await?;
        debug!("Interview record saved for {phone} ({} chars)", content.chars().count());
        Ok(envelope.talent)
    }

    /// POST /talent/:phone/reparse-resume
    pub async fn reparse_resume(&self, phone: &str) -> Result<Talent, ApiError> {
        let request = self
            .client
            .post(self.url(&format!("/talent/{phone}/reparse-resume")));
        let envelope: TalentEnvelope = self.call(request, Some(self.reparse_timeout)).await?;
        envelope
            .talent
            .ok_or_else(|| ApiError::Decode("reparse response carried no talent".to_string()))
    }

    /// POST /talents/recalculate-scores
    pub async fn recalculate_scores(&self) -> Result<RecalculationSummary, ApiError> {
        let request = self.client.post(self.url("/talents/recalculate-scores"));
        let summary: RecalculationSummary = self.call(request, None).await?;
        info!(
            "Scores recalculated: total={}, updated={}",
            summary.total_count, summary.updated_count
        );
        Ok(summary)
    }

    /// Uploads one resume or a batch; see [`upload`] for validation rules.
    pub async fn upload_resumes(&self, files: Vec<ResumeFile>) -> Result<BatchUploadReport, ApiError> {
        upload::validate(&files)?;
        let (path, form) = upload::build_form(files)?;
        let request = self.client.post(self.url(path)).multipart(form);
        let response: UploadResponse = self.call(request, None).await?;
        let report = response.into_report();
        info!("{}", report.summary());
        Ok(report)
    }

    /// Downloads a stored resume (`GET /{resumePath}`).
    pub async fn fetch_resume(&self, resume_path: &str) -> Result<Bytes, ApiError> {
        let response = self
            .client
            .get(self.url(resume_path))
            .send()
            .await
            .map_err(network)?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::from_status(status, &body));
        }
        response.bytes().await.map_err(network)
    }

    async fn call<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        deadline: Option<Duration>,
    ) -> Result<T, ApiError> {
        let exchange = async move {
            let response = request.send().await.map_err(network)?;
            let status = response.status();

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                warn!("Talent API returned {}: {}", status, body);
                return Err(ApiError::from_status(status, &body));
            }

            let body = response.bytes().await.map_err(network)?;
            serde_json::from_slice::<T>(&body).map_err(|e| ApiError::Decode(e.to_string()))
        };

        match deadline {
            Some(limit) => tokio::time::timeout(limit, exchange).await.map_err(|_| {
                warn!("Request abandoned after {}ms", limit.as_millis());
                ApiError::Timeout
            })?,
            None => exchange.await,
        }
    }
}

fn network(e: reqwest::Error) -> ApiError {
    if e.is_timeout() {
        ApiError::Timeout
    } else {
        ApiError::Network(e)
    }
}

#[async_trait]
impl NoteStore for ApiClient {
    async fn save_note(&self, phone: &str, content: &str) -> Result<(), ApiError> {
        self.save_interview_record(phone, content).await.map(|_| ())
    }
}
