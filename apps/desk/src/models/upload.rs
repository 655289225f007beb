//! Batch upload results and their tri-state summary.
//!
//! The server answers a single-file upload and a multi-file upload with the
//! same batch-shaped body, but older deployments answered single uploads with
//! `{message, talent, file}`. Both normalise into [`BatchUploadReport`].

use serde::{Deserialize, Serialize};

use crate::models::talent::Talent;

/// Marker the server puts in the message of a duplicate single upload.
const DUPLICATE_MARKERS: [&str; 2] = ["已存在", "already exists"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadedResume {
    pub filename: String,
    pub talent: Option<Talent>,
    #[serde(default)]
    pub file: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuplicateResume {
    pub filename: String,
    pub existing_talent: Option<Talent>,
    #[serde(default)]
    pub existing_file: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailedResume {
    pub filename: String,
    pub error: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchUploadReport {
    pub total: usize,
    pub successful: usize,
    pub duplicate_count: usize,
    pub failed: usize,
    pub results: Vec<UploadedResume>,
    pub duplicates: Vec<DuplicateResume>,
    pub errors: Vec<FailedResume>,
}

/// Raw response body: the batch fields plus the legacy single-file fields.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct UploadResponse {
    message: Option<String>,
    talent: Option<Talent>,
    file: Option<String>,
    total: Option<usize>,
    successful: Option<usize>,
    duplicate_count: Option<usize>,
    failed: Option<usize>,
    results: Option<Vec<UploadedResume>>,
    duplicates: Option<Vec<DuplicateResume>>,
    errors: Option<Vec<FailedResume>>,
}

impl UploadResponse {
    pub(crate) fn into_report(self) -> BatchUploadReport {
        let legacy_single = self.results.is_none()
            && self.duplicates.is_none()
            && (self.talent.is_some() || self.file.is_some());

        if legacy_single {
            let is_duplicate = self
                .message
                .as_deref()
                .map(|m| DUPLICATE_MARKERS.iter().any(|marker| m.contains(marker)))
                .unwrap_or(false);

            let mut report = BatchUploadReport {
                total: 1,
                ..Default::default()
            };
            if is_duplicate {
                report.duplicate_count = 1;
                report.duplicates.push(DuplicateResume {
                    filename: "resume".to_string(),
                    existing_talent: self.talent,
                    existing_file: self.file,
                });
            } else if self.talent.is_some() {
                report.successful = 1;
                report.results.push(UploadedResume {
                    filename: "resume".to_string(),
                    talent: self.talent,
                    file: self.file,
                });
            }
            return report;
        }

        let results = self.results.unwrap_or_default();
        let duplicates = self.duplicates.unwrap_or_default();
        let errors = self.errors.unwrap_or_default();

        BatchUploadReport {
            total: self
                .total
                .unwrap_or(results.len() + duplicates.len() + errors.len()),
            successful: self.successful.unwrap_or(results.len()),
            duplicate_count: self.duplicate_count.unwrap_or(duplicates.len()),
            failed: self.failed.unwrap_or(errors.len()),
            results,
            duplicates,
            errors,
        }
    }
}

/// Overall verdict of a batch, used to pick the tone of the summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadOutcome {
    Success,
    /// Some files failed while others were stored or already present.
    Partial,
    /// Every file failed.
    Failed,
    /// Nothing new, nothing failed: every file was already on record.
    AlreadyPresent,
}

impl BatchUploadReport {
    pub fn outcome(&self) -> UploadOutcome {
        let (ok, dup, failed) = (self.successful, self.duplicate_count, self.failed);
        if failed > 0 && (ok > 0 || dup > 0) {
            UploadOutcome::Partial
        } else if failed > 0 {
            UploadOutcome::Failed
        } else if dup > 0 && ok == 0 {
            UploadOutcome::AlreadyPresent
        } else {
            UploadOutcome::Success
        }
    }

    pub fn summary(&self) -> String {
        if self.outcome() == UploadOutcome::AlreadyPresent {
            return "Resume already on record, nothing to upload".to_string();
        }
        format!(
            "Processed {} resume(s): {} succeeded, {} already present, {} failed",
            self.total, self.successful, self.duplicate_count, self.failed
        )
    }

    /// The list should be reloaded whenever something new or known came back.
    pub fn should_reload(&self) -> bool {
        self.successful > 0 || self.duplicate_count > 0
    }

    /// Talent worth opening right after the upload: the single new one, or
    /// failing that the single duplicate's existing record.
    pub fn focus_talent(&self) -> Option<&Talent> {
        if self.successful == 1 {
            if let Some(talent) = self.results.first().and_then(|r| r.talent.as_ref()) {
                return Some(talent);
            }
        }
        if self.duplicate_count == 1 {
            return self
                .duplicates
                .first()
                .and_then(|d| d.existing_talent.as_ref());
        }
        None
    }
}
