//! Resume upload request building.
//!
//! Files are validated locally before anything is sent: the batch must be
//! non-empty and every file must be a PDF, by extension and by magic bytes.
//! One file goes to `/talent/upload-resume` as field `resume`; several go to
//! `/talent/upload-resumes` as repeated `resumes[]` fields.

use std::path::Path;

use reqwest::multipart::{Form, Part};
use tracing::debug;

use crate::errors::ApiError;

const PDF_MAGIC: &[u8] = b"%PDF-";
const PDF_MIME: &str = "application/pdf";

pub const SINGLE_UPLOAD_PATH: &str = "/talent/upload-resume";
pub const BATCH_UPLOAD_PATH: &str = "/talent/upload-resumes";

/// A resume file held in memory, ready to be sent.
#[derive(Debug, Clone)]
pub struct ResumeFile {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl ResumeFile {
    #[cfg(test)]
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            bytes,
        }
    }

    pub async fn read(path: &Path) -> Result<Self, ApiError> {
        let bytes = tokio::fs::read(path).await?;
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self { filename, bytes })
    }

    pub fn is_pdf(&self) -> bool {
        let has_extension = Path::new(&self.filename)
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("pdf"))
            .unwrap_or(false);
        has_extension && self.bytes.starts_with(PDF_MAGIC)
    }
}

pub fn validate(files: &[ResumeFile]) -> Result<(), ApiError> {
    if files.is_empty() {
        return Err(ApiError::Validation(
            "No resume selected, please choose a PDF file".to_string(),
        ));
    }
    if let Some(bad) = files.iter().find(|f| !f.is_pdf()) {
        return Err(ApiError::Validation(format!(
            "Only PDF resumes can be uploaded ({} is not a PDF)",
            bad.filename
        )));
    }
    Ok(())
}

/// Picks the endpoint and builds the multipart body for `files`.
pub fn build_form(files: Vec<ResumeFile>) -> Result<(&'static str, Form), ApiError> {
    let single = files.len() == 1;
    let (path, field) = if single {
        (SINGLE_UPLOAD_PATH, "resume")
    } else {
        (BATCH_UPLOAD_PATH, "resumes[]")
    };

    let mut form = Form::new();
    for file in files {
        debug!("Attaching {} ({} bytes) as {field}", file.filename, file.bytes.len());
        let part = Part::bytes(file.bytes)
            .file_name(file.filename)
            .mime_str(PDF_MIME)?;
        form = form.part(field, part);
    }
    Ok((path, form))
}
