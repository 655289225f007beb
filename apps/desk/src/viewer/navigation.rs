/// Keys the viewer reacts to while its modal is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    ArrowLeft,
    ArrowUp,
    ArrowRight,
    ArrowDown,
    Home,
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageNavTarget {
    First,
    Prev,
    Next,
    Last,
}

impl Key {
    pub fn target(self) -> PageNavTarget {
        match self {
            Key::ArrowLeft | Key::ArrowUp => PageNavTarget::Prev,
            Key::ArrowRight | Key::ArrowDown => PageNavTarget::Next,
            Key::Home => PageNavTarget::First,
            Key::End => PageNavTarget::Last,
        }
    }
}

impl std::str::FromStr for Key {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "left" | "arrowleft" => Ok(Key::ArrowLeft),
            "up" | "arrowup" => Ok(Key::ArrowUp),
            "right" | "arrowright" => Ok(Key::ArrowRight),
            "down" | "arrowdown" => Ok(Key::ArrowDown),
            "home" => Ok(Key::Home),
            "end" => Ok(Key::End),
            other => Err(format!("unknown key '{other}'")),
        }
    }
}

/// 1-based page reached from `current`. Returns 0 for an empty document.
pub fn resolve_page_nav_target(current: u32, page_count: u32, target: PageNavTarget) -> u32 {
    if page_count == 0 {
        return 0;
    }

    let current = current.clamp(1, page_count);
    match target {
        PageNavTarget::First => 1,
        PageNavTarget::Prev => current.saturating_sub(1).max(1),
        PageNavTarget::Next => (current + 1).min(page_count),
        PageNavTarget::Last => page_count,
    }
}

/// Scroll the container should perform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollRequest {
    pub page: u32,
    pub top: f32,
    pub smooth: bool,
}

/// Outcome of a key press. `Handled` means the key's default action must be
/// suppressed, even when the page does not change.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum KeyAction {
    Ignored,
    Handled(Option<ScrollRequest>),
}

/// Page indicator and button enablement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavState {
    pub current: u32,
    pub total: u32,
    pub prev_enabled: bool,
    pub next_enabled: bool,
}

impl NavState {
    pub fn new(current: u32, total: u32) -> Self {
        Self {
            current,
            total,
            prev_enabled: current > 1,
            next_enabled: current < total,
        }
    }

    pub fn indicator(&self) -> String {
        format!("{} / {}", self.current, self.total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_targets() {
        assert_eq!(resolve_page_nav_target(1, 5, PageNavTarget::Prev), 1);
        assert_eq!(resolve_page_nav_target(3, 5, PageNavTarget::Prev), 2);
        assert_eq!(resolve_page_nav_target(5, 5, PageNavTarget::Next), 5);
        assert_eq!(resolve_page_nav_target(2, 5, PageNavTarget::Last), 5);
        assert_eq!(resolve_page_nav_target(4, 5, PageNavTarget::First), 1);
        assert_eq!(resolve_page_nav_target(1, 0, PageNavTarget::Next), 0);
    }

    #[test]
    fn test_key_bindings() {
        assert_eq!(Key::ArrowUp.target(), PageNavTarget::Prev);
        assert_eq!(Key::ArrowDown.target(), PageNavTarget::Next);
        assert_eq!(Key::End.target(), PageNavTarget::Last);
        assert_eq!("Home".parse::<Key>().unwrap(), Key::Home);
        assert!("space".parse::<Key>().is_err());
    }

    #[test]
    fn test_nav_state_bounds() {
        let first = NavState::new(1, 3);
        assert!(!first.prev_enabled);
        assert!(first.next_enabled);
        assert_eq!(first.indicator(), "1 / 3");

        let last = NavState::new(3, 3);
        assert!(last.prev_enabled);
        assert!(!last.next_enabled);
    }
}
