// URL classification and subtitle availability resolution

use crate::downloader::traits::DownloadEngine;

/// What a URL addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlKind {
    /// One video
    Single,
    /// A named group of videos behind one URL
    Playlist,
}

const PLAYLIST_TOKEN: &str = "playlist";

/// Purely lexical: a URL carrying the playlist token is a playlist,
/// everything else is a single video. No well-formedness checks.
pub fn classify(url: &str) -> UrlKind {
    if url.contains(PLAYLIST_TOKEN) {
        UrlKind::Playlist
    } else {
        UrlKind::Single
    }
}

/// Intersect `requested` with the subtitle languages the target actually
/// offers, preserving request order.
///
/// Any metadata failure yields an empty list instead of an error, so
/// subtitle unavailability never blocks a video-only download.
pub fn resolve_subtitles(
    engine: &dyn DownloadEngine,
    url: &str,
    requested: &[String],
) -> Vec<String> {
    match engine.subtitle_languages(url) {
        Ok(available) => requested
            .iter()
            .filter(|lang| available.iter().any(|a| a == *lang))
            .cloned()
            .collect(),
        Err(e) => {
            tracing::warn!("[analyzer] subtitle metadata unavailable: {}", e);
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::downloader::errors::DownloadError;
    use crate::downloader::traits::{DownloadPlan, ProgressRecord};

    struct StubEngine {
        offered: Result<Vec<String>, DownloadError>,
    }

    impl DownloadEngine for StubEngine {
        fn name(&self) -> &'static str {
            "stub"
        }

        fn subtitle_languages(&self, _url: &str) -> Result<Vec<String>, DownloadError> {
            self.offered.clone()
        }

        fn download(
            &self,
            _plan: &DownloadPlan,
            _hook: &mut dyn FnMut(ProgressRecord) -> Result<(), DownloadError>,
        ) -> Result<(), DownloadError> {
            unreachable!("analyzer never downloads");
        }
    }

    fn langs(codes: &[&str]) -> Vec<String> {
        codes.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn playlist_urls_classify_as_playlist() {
        assert_eq!(
            classify("https://www.youtube.com/playlist?list=PLx"),
            UrlKind::Playlist
        );
        assert_eq!(
            classify("https://www.youtube.com/watch?v=abc&list=PLx&playlist=1"),
            UrlKind::Playlist
        );
    }

    #[test]
    fn everything_else_classifies_as_single() {
        assert_eq!(
            classify("https://www.youtube.com/watch?v=abc"),
            UrlKind::Single
        );
        assert_eq!(classify("not even a url"), UrlKind::Single);
        assert_eq!(classify(""), UrlKind::Single);
    }

    #[test]
    fn resolution_preserves_request_order() {
        let engine = StubEngine {
            offered: Ok(langs(&["en", "th", "ko"])),
        };
        let resolved = resolve_subtitles(&engine, "u", &langs(&["ko", "en", "de"]));
        assert_eq!(resolved, langs(&["ko", "en"]));
    }

    #[test]
    fn resolution_is_empty_when_nothing_matches() {
        let engine = StubEngine {
            offered: Ok(langs(&["en"])),
        };
        assert!(resolve_subtitles(&engine, "u", &langs(&["th"])).is_empty());
    }

    #[test]
    fn metadata_failure_fails_soft_to_empty() {
        let engine = StubEngine {
            offered: Err(DownloadError::MetadataFetch("timed out".to_string())),
        };
        assert!(resolve_subtitles(&engine, "u", &langs(&["ko", "en"])).is_empty());
    }
}
