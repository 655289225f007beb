use tracing::{debug, warn};

/// State of the embedded-frame viewer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameState {
    Detached,
    Loading { url: String },
    Shown { url: String },
    Failed { url: String },
}

/// Embedded frame pointed straight at the resume URL.
#[derive(Debug)]
pub struct FrameViewer {
    state: FrameState,
}

impl Default for FrameViewer {
    fn default() -> Self {
        Self {
            state: FrameState::Detached,
        }
    }
}

impl FrameViewer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(&mut self, url: impl Into<String>) {
        let url = url.into();
        debug!("Frame loading {url}");
        self.state = FrameState::Loading { url };
    }

    pub fn on_load(&mut self) {
        if let FrameState::Loading { url } = &self.state {
            self.state = FrameState::Shown { url: url.clone() };
        }
    }

    pub fn on_error(&mut self) {
        if let FrameState::Loading { url } = &self.state {
            warn!("Frame failed to load {url}");
            self.state = FrameState::Failed { url: url.clone() };
        }
    }

    /// Detaches the source.
    pub fn reset(&mut self) {
        self.state = FrameState::Detached;
    }

    pub fn state(&self) -> &FrameState {
        &self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_lifecycle() {
        let mut frame = FrameViewer::new();
        assert_eq!(frame.state(), &FrameState::Detached);

        frame.load("http://localhost:8080/uploads/a.pdf");
        assert!(matches!(frame.state(), FrameState::Loading { .. }));
        frame.on_load();
        assert_eq!(
            frame.state(),
            &FrameState::Shown {
                url: "http://localhost:8080/uploads/a.pdf".to_string()
            }
        );

        // Late error after a successful load is ignored.
        frame.on_error();
        assert!(matches!(frame.state(), FrameState::Shown { .. }));

        frame.reset();
        assert_eq!(frame.state(), &FrameState::Detached);
    }

    #[test]
    fn test_frame_error() {
        let mut frame = FrameViewer::new();
        frame.load("http://localhost:8080/uploads/b.pdf");
        frame.on_error();
        assert_eq!(
            frame.state(),
            &FrameState::Failed {
                url: "http://localhost:8080/uploads/b.pdf".to_string()
            }
        );
    }
}
