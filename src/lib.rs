// Download orchestration core. The browser shell constructs a
// DownloadRequest from the options popup, calls Downloader::start and
// renders the DownloadEvent stream in its progress dialog.

pub mod analyzer;
pub mod downloader;

pub use analyzer::{classify, resolve_subtitles, UrlKind};
pub use downloader::engine::YtDlpEngine;
pub use downloader::errors::DownloadError;
pub use downloader::format_selector::Quality;
pub use downloader::models::{DownloadEvent, DownloadMode, DownloadProgress, DownloadRequest};
pub use downloader::orchestrator::{DownloadHandle, Downloader};
pub use downloader::traits::{
    DownloadEngine, DownloadPlan, EngineConfig, MediaSelection, ProgressRecord, RecordStatus,
    SubtitleOptions,
};
