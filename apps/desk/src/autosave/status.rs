use std::fmt;

use chrono::{DateTime, Local};

use crate::models::MAX_INTERVIEW_RECORD_CHARS;

/// Colour class of the status indicator under the note editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusTone {
    Muted,
    Success,
    Warning,
    Danger,
}

/// What the note editor's status indicator currently shows.
#[derive(Debug, Clone, PartialEq)]
pub enum SaveStatus {
    /// Nothing unsaved: the note matches what the server last confirmed.
    Idle,
    /// An edit is waiting out the debounce window.
    Waiting,
    Saving,
    Saved { at: DateTime<Local> },
    /// Rejected locally; nothing was sent.
    Invalid(String),
    Failed(String),
}

impl SaveStatus {
    pub fn too_long() -> Self {
        SaveStatus::Invalid(format!(
            "Content too long (over {MAX_INTERVIEW_RECORD_CHARS} characters)"
        ))
    }

    pub fn tone(&self) -> StatusTone {
        match self {
            SaveStatus::Idle | SaveStatus::Waiting => StatusTone::Muted,
            SaveStatus::Saving => StatusTone::Warning,
            SaveStatus::Saved { .. } => StatusTone::Success,
            SaveStatus::Invalid(_) | SaveStatus::Failed(_) => StatusTone::Danger,
        }
    }

    pub fn is_error(&self) -> bool {
        self.tone() == StatusTone::Danger
    }
}

impl fmt::Display for SaveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SaveStatus::Idle => write!(f, "Saved"),
            SaveStatus::Waiting => write!(f, "Waiting to save..."),
            SaveStatus::Saving => write!(f, "Saving..."),
            SaveStatus::Saved { at } => write!(f, "Saved at {}", at.format("%H:%M:%S")),
            SaveStatus::Invalid(msg) | SaveStatus::Failed(msg) => write!(f, "{msg}"),
        }
    }
}
