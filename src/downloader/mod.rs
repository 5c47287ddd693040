// Downloader module - orchestration core behind the browser shell

pub mod errors;
pub mod models;
pub mod format_selector;
pub mod traits;
pub mod progress;
pub mod engine;
pub mod orchestrator;
pub mod utils;

pub use errors::DownloadError;
pub use models::{DownloadEvent, DownloadMode, DownloadProgress, DownloadRequest};
pub use orchestrator::{DownloadHandle, Downloader};
pub use traits::{DownloadEngine, DownloadPlan, EngineConfig};
