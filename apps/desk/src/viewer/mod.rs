//! Resume viewer for the talent detail view.
//!
//! Two strategies exist. The frame viewer points an embedded frame at the
//! resume URL and is the default. The canvas viewer parses the PDF and renders
//! each page itself, tracking the centered page while scrolling.

use bytes::Bytes;
use tracing::{debug, warn};

use crate::config::{Config, ViewerMode};
use crate::errors::{ApiError, Operation};

pub mod canvas;
pub mod canvas_viewer;
pub mod document;
pub mod frame;
pub mod layout;
pub mod navigation;

pub use canvas::{ScaleMode, Viewport};
pub use canvas_viewer::CanvasViewer;
use frame::FrameViewer;
pub use navigation::{Key, KeyAction};

/// Modal body size the canvas viewer lays pages into until told otherwise.
pub const DEFAULT_CONTAINER: Viewport = Viewport {
    width: 840.0,
    height: 1000.0,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewerStatus {
    Empty,
    NoResume,
    Loading,
    /// Page count is only known to the canvas strategy.
    Ready { pages: Option<u32> },
    Failed(String),
}

pub enum Backend {
    Frame(FrameViewer),
    Canvas(CanvasViewer),
}

pub struct ResumeViewer {
    backend: Backend,
    current_url: Option<String>,
    status: ViewerStatus,
}

impl ResumeViewer {
    pub fn new(mode: ViewerMode, pixel_ratio: f32) -> Self {
        let backend = match mode {
            ViewerMode::Frame => Backend::Frame(FrameViewer::new()),
            ViewerMode::Canvas => Backend::Canvas(CanvasViewer::new(
                ScaleMode::FitWidth,
                pixel_ratio,
                DEFAULT_CONTAINER,
            )),
        };
        Self {
            backend,
            current_url: None,
            status: ViewerStatus::Empty,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.viewer_mode, config.device_pixel_ratio)
    }

    /// Starts loading `url`. Returns false when it is already the loaded
    /// document, in which case nothing is reloaded.
    pub fn begin(&mut self, url: &str) -> bool {
        if self.current_url.as_deref() == Some(url) {
            debug!("Resume {url} already loaded");
            return false;
        }

        self.reset();
        self.current_url = Some(url.to_string());
        if let Backend::Frame(frame) = &mut self.backend {
            frame.load(url);
        }
        self.status = ViewerStatus::Loading;
        true
    }

    /// Completes the load started by [`begin`](Self::begin) with the fetched
    /// document bytes.
    pub fn finish(&mut self, fetched: Result<Bytes, ApiError>) -> &ViewerStatus {
        self.status = match (&mut self.backend, fetched) {
            (Backend::Frame(frame), Ok(_)) => {
                frame.on_load();
                ViewerStatus::Ready { pages: None }
            }
            (Backend::Canvas(canvas), Ok(bytes)) => match canvas.open(&bytes) {
                Ok(pages) => ViewerStatus::Ready { pages: Some(pages) },
                Err(e) => {
                    warn!("Failed to load PDF: {e}");
                    ViewerStatus::Failed("Failed to load PDF".to_string())
                }
            },
            (backend, Err(e)) => {
                warn!("Failed to fetch resume: {e}");
                match backend {
                    Backend::Frame(frame) => frame.on_error(),
                    Backend::Canvas(canvas) => canvas.reset(),
                }
                ViewerStatus::Failed(e.user_message(Operation::LoadResume))
            }
        };

        // A failed document can be retried by reopening the talent.
        if matches!(self.status, ViewerStatus::Failed(_)) {
            self.current_url = None;
        }
        &self.status
    }

    /// The open talent has no resume file.
    pub fn show_no_resume(&mut self) {
        self.reset();
        self.status = ViewerStatus::NoResume;
    }

    pub fn reset(&mut self) {
        match &mut self.backend {
            Backend::Frame(frame) => frame.reset(),
            Backend::Canvas(canvas) => canvas.reset(),
        }
        self.current_url = None;
        self.status = ViewerStatus::Empty;
    }

    pub fn status(&self) -> &ViewerStatus {
        &self.status
    }

    pub fn current_url(&self) -> Option<&str> {
        self.current_url.as_deref()
    }

    pub fn canvas(&self) -> Option<&CanvasViewer> {
        match &self.backend {
            Backend::Canvas(canvas) => Some(canvas),
            Backend::Frame(_) => None,
        }
    }

    pub fn frame(&self) -> Option<&FrameViewer> {
        match &self.backend {
            Backend::Frame(frame) => Some(frame),
            Backend::Canvas(_) => None,
        }
    }
}
