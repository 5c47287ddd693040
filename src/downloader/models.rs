// Common data models for the download pipeline

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::errors::DownloadError;
use super::format_selector::Quality;
use super::utils;

/// What the user asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadMode {
    /// Media streams, with optional subtitles alongside
    FullMedia,
    /// Subtitles only, the media download is skipped
    SubtitleOnly,
}

/// One confirmed download request. Built once from the options popup and
/// immutable for the lifetime of the attempt.
#[derive(Debug, Clone)]
pub struct DownloadRequest {
    pub url: String,
    pub mode: DownloadMode,
    pub quality: Quality,
    pub target_dir: PathBuf,
    /// Simultaneous network segments per stream, clamped to 1..=32
    pub fragments: u32,
    pub subtitles: bool,
    /// Requested subtitle language codes, in preference order
    pub subtitle_langs: Vec<String>,
}

impl DownloadRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            mode: DownloadMode::FullMedia,
            quality: Quality::default(),
            target_dir: utils::default_download_dir(),
            fragments: 16,
            subtitles: false,
            subtitle_langs: Vec::new(),
        }
    }

    pub fn with_mode(mut self, mode: DownloadMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_quality(mut self, quality: Quality) -> Self {
        self.quality = quality;
        self
    }

    pub fn with_target_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.target_dir = dir.into();
        self
    }

    pub fn with_fragments(mut self, fragments: u32) -> Self {
        self.fragments = fragments;
        self
    }

    pub fn with_subtitles(mut self, langs: Vec<String>) -> Self {
        self.subtitles = true;
        self.subtitle_langs = langs;
        self
    }
}

/// Download progress information, shaped for direct UI display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadProgress {
    pub percent: f32,
    pub status: String,
}

/// Everything an attempt reports back. Zero or more Progress events,
/// then exactly one Completed or Failed, never anything after it.
#[derive(Debug, Clone)]
pub enum DownloadEvent {
    Progress(DownloadProgress),
    Completed(String),
    Failed(DownloadError),
}

impl DownloadEvent {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed(_) | Self::Failed(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_defaults_match_the_popup_defaults() {
        let request = DownloadRequest::new("https://example.com/watch?v=abc");
        assert_eq!(request.mode, DownloadMode::FullMedia);
        assert_eq!(request.fragments, 16);
        assert!(!request.subtitles);
        assert!(request.subtitle_langs.is_empty());
        assert!(request.target_dir.ends_with("downloads"));
    }

    #[test]
    fn with_subtitles_sets_the_flag() {
        let request = DownloadRequest::new("u").with_subtitles(vec!["ko".to_string()]);
        assert!(request.subtitles);
        assert_eq!(request.subtitle_langs, vec!["ko".to_string()]);
    }

    #[test]
    fn only_outcome_events_are_terminal() {
        assert!(DownloadEvent::Completed("done".to_string()).is_terminal());
        assert!(DownloadEvent::Failed(DownloadError::Canceled).is_terminal());
        assert!(!DownloadEvent::Progress(DownloadProgress {
            percent: 50.0,
            status: "downloading".to_string(),
        })
        .is_terminal());
    }
}
