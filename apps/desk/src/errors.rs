use reqwest::StatusCode;
use thiserror::Error;

/// Errors surfaced by calls against the talent API, plus the local
/// validation failures that stop a request from being sent at all.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Server error: {0}")]
    Server(String),

    #[error("Unexpected status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Request timed out")]
    Timeout,

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Could not decode response: {0}")]
    Decode(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// The user-facing action a request belonged to. Status messages are worded
/// per action because the same HTTP status means different things to each.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    LoadTalents,
    SaveNote,
    ReparseResume,
    Upload,
    Recalculate,
    LoadResume,
}

#[derive(serde::Deserialize)]
struct ErrorBody {
    error: String,
}

impl ApiError {
    /// Maps a non-success status (and its body, if any) onto the taxonomy.
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let message = serde_json::from_str::<ErrorBody>(body)
            .map(|b| b.error)
            .unwrap_or_else(|_| body.trim().to_string());

        match status {
            StatusCode::NOT_FOUND => ApiError::NotFound(message),
            StatusCode::BAD_REQUEST => ApiError::BadRequest(message),
            StatusCode::INTERNAL_SERVER_ERROR => ApiError::Server(message),
            other => ApiError::Status {
                status: other.as_u16(),
                message,
            },
        }
    }

    /// The message shown in the status indicator for a failure of `op`.
    pub fn user_message(&self, op: Operation) -> String {
        match (self, op) {
            (ApiError::Validation(msg), _) => msg.clone(),
            (ApiError::NotFound(_), Operation::SaveNote | Operation::ReparseResume) => {
                "Talent not found".to_string()
            }
            (ApiError::NotFound(_), Operation::LoadResume) => "Resume file not found".to_string(),
            (ApiError::BadRequest(_), Operation::SaveNote) => "Invalid request data".to_string(),
            (ApiError::BadRequest(_), Operation::ReparseResume) => {
                "This talent has no resume file".to_string()
            }
            (ApiError::Server(_), Operation::SaveNote | Operation::ReparseResume) => {
                "Server error, please try again later".to_string()
            }
            (ApiError::Status { status, .. }, Operation::SaveNote) => {
                format!("Save failed ({status})")
            }
            (ApiError::Status { status, .. }, Operation::ReparseResume) => {
                format!("Reparse failed ({status})")
            }
            (ApiError::Timeout, Operation::ReparseResume) => {
                "Request timed out, please check the network connection".to_string()
            }
            (ApiError::Timeout, _) => "Request timed out".to_string(),
            (_, Operation::LoadTalents) => "Could not load talents from the server".to_string(),
            (_, Operation::Upload) => "Upload failed, please try again".to_string(),
            (_, Operation::Recalculate) => {
                "Recalculation failed: network or server error".to_string()
            }
            (_, Operation::LoadResume) => "Failed to load resume".to_string(),
            (_, Operation::SaveNote) => "Save failed".to_string(),
            (_, Operation::ReparseResume) => "Reparse failed".to_string(),
        }
    }
}
