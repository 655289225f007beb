use std::time::Duration;

use anyhow::{bail, Context, Result};

/// Which of the two resume viewer strategies the detail view uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerMode {
    /// Embedded frame pointed straight at the resume URL.
    Frame,
    /// Per-page canvas rendering with scroll tracking.
    Canvas,
}

impl std::str::FromStr for ViewerMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "frame" | "iframe" => Ok(ViewerMode::Frame),
            "canvas" => Ok(ViewerMode::Canvas),
            other => bail!("PDF_VIEWER_MODE must be 'frame' or 'canvas', got '{other}'"),
        }
    }
}

/// Desk configuration loaded from environment variables (and `.env` if present).
#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub note_save_timeout: Duration,
    pub reparse_timeout: Duration,
    pub autosave_debounce: Duration,
    pub viewer_mode: ViewerMode,
    pub device_pixel_ratio: f32,
    pub rust_log: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:8080".to_string(),
            note_save_timeout: Duration::from_secs(10),
            reparse_timeout: Duration::from_secs(30),
            autosave_debounce: Duration::from_millis(2000),
            viewer_mode: ViewerMode::Frame,
            device_pixel_ratio: 1.0,
            rust_log: "info".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let defaults = Config::default();

        Ok(Config {
            api_url: std::env::var("TALENT_API_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.api_url),
            note_save_timeout: Duration::from_secs(
                parse_env("NOTE_SAVE_TIMEOUT_SECS", 10u64)
                    .context("NOTE_SAVE_TIMEOUT_SECS must be a whole number of seconds")?,
            ),
            reparse_timeout: Duration::from_secs(
                parse_env("REPARSE_TIMEOUT_SECS", 30u64)
                    .context("REPARSE_TIMEOUT_SECS must be a whole number of seconds")?,
            ),
            autosave_debounce: Duration::from_millis(
                parse_env("AUTOSAVE_DEBOUNCE_MS", 2000u64)
                    .context("AUTOSAVE_DEBOUNCE_MS must be a whole number of milliseconds")?,
            ),
            viewer_mode: parse_env("PDF_VIEWER_MODE", ViewerMode::Frame)?,
            device_pixel_ratio: parse_env("DEVICE_PIXEL_RATIO", 1.0f32)
                .context("DEVICE_PIXEL_RATIO must be a number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or(defaults.rust_log),
        })
    }
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("invalid value '{raw}' for {key}: {e}")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_viewer_mode_parses_both_strategies() {
        assert_eq!("frame".parse::<ViewerMode>().unwrap(), ViewerMode::Frame);
        assert_eq!("IFRAME".parse::<ViewerMode>().unwrap(), ViewerMode::Frame);
        assert_eq!(" canvas ".parse::<ViewerMode>().unwrap(), ViewerMode::Canvas);
        assert!("pdfjs".parse::<ViewerMode>().is_err());
    }

    #[test]
    fn test_defaults_match_documented_timings() {
        let config = Config::default();
        assert_eq!(config.note_save_timeout, Duration::from_secs(10));
        assert_eq!(config.reparse_timeout, Duration::from_secs(30));
        assert_eq!(config.autosave_debounce, Duration::from_millis(2000));
        assert_eq!(config.viewer_mode, ViewerMode::Frame);
    }

    #[test]
    fn test_parse_env_falls_back_to_default_when_unset() {
        let value: u64 = parse_env("TALENT_DESK_TEST_UNSET_VARIABLE", 42).unwrap();
        assert_eq!(value, 42);
    }
}
