// Error types for the download pipeline

use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum DownloadError {
    /// Metadata fetch failed. Subtitle resolution treats this as
    /// fail-soft and degrades to an empty language list.
    #[error("metadata fetch failed: {0}")]
    MetadataFetch(String),

    /// The user flipped the cancellation token mid-attempt.
    #[error("download canceled by user")]
    Canceled,

    /// yt-dlp (or a companion binary) is not installed.
    #[error("tool not found: {0}")]
    ToolNotFound(String),

    /// Any other engine failure, message passed through verbatim.
    #[error("download failed: {0}")]
    EngineFailure(String),
}

impl DownloadError {
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::Canceled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancellation_is_recognized() {
        assert!(DownloadError::Canceled.is_cancellation());
        assert!(!DownloadError::EngineFailure("x".to_string()).is_cancellation());
    }

    #[test]
    fn engine_failures_pass_the_message_through() {
        let err = DownloadError::EngineFailure("HTTP Error 403: Forbidden".to_string());
        assert!(err.to_string().contains("HTTP Error 403"));
    }
}
