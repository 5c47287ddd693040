// One attempt per orchestrator instance: classify the URL, resolve
// subtitles, build the engine plan, run the engine on a worker thread
// and relay progress. Exactly one terminal event closes the stream.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tokio::sync::mpsc;

use crate::analyzer::{classify, resolve_subtitles, UrlKind};

use super::engine::YtDlpEngine;
use super::errors::DownloadError;
use super::models::{DownloadEvent, DownloadMode, DownloadProgress, DownloadRequest};
use super::progress::wrap_title;
use super::traits::{
    DownloadEngine, DownloadPlan, EngineConfig, MediaSelection, ProgressRecord, RecordStatus,
    SubtitleOptions,
};

type EventSender = mpsc::UnboundedSender<DownloadEvent>;

pub struct Downloader {
    engine: Arc<dyn DownloadEngine>,
}

impl Downloader {
    pub fn new(engine: Arc<dyn DownloadEngine>) -> Self {
        Self { engine }
    }

    /// Production wiring: the yt-dlp subprocess engine.
    pub fn ytdlp(config: EngineConfig) -> Self {
        Self::new(Arc::new(YtDlpEngine::new(config)))
    }

    /// Spawn the worker and hand back the event stream. Consumes the
    /// orchestrator: a new request requires a new instance.
    pub fn start(self, request: DownloadRequest) -> DownloadHandle {
        let (tx, rx) = mpsc::unbounded_channel();
        let canceled = Arc::new(AtomicBool::new(false));

        let engine = self.engine;
        let flag = canceled.clone();
        let sender = tx.clone();
        let worker = thread::Builder::new()
            .name("download-worker".to_string())
            .spawn(move || run_attempt(engine, request, sender, flag));

        match worker {
            Ok(handle) => DownloadHandle {
                events: rx,
                canceled,
                worker: Some(handle),
            },
            Err(e) => {
                let _ = tx.send(DownloadEvent::Failed(DownloadError::EngineFailure(format!(
                    "failed to spawn download worker: {e}"
                ))));
                DownloadHandle {
                    events: rx,
                    canceled,
                    worker: None,
                }
            }
        }
    }
}

/// Handle to one running attempt: the event stream plus cancellation.
pub struct DownloadHandle {
    events: mpsc::UnboundedReceiver<DownloadEvent>,
    canceled: Arc<AtomicBool>,
    worker: Option<thread::JoinHandle<()>>,
}

impl DownloadHandle {
    /// Idempotent and non-blocking. The attempt stops at its next
    /// cancellation checkpoint, not instantly.
    pub fn cancel(&self) {
        self.canceled.store(true, Ordering::Relaxed);
    }

    /// Next event; None once the terminal event has been consumed and
    /// the worker is gone.
    pub async fn recv(&mut self) -> Option<DownloadEvent> {
        self.events.recv().await
    }

    /// Same, for synchronous consumers.
    pub fn blocking_recv(&mut self) -> Option<DownloadEvent> {
        self.events.blocking_recv()
    }

    /// Wait for the worker thread to exit.
    pub fn join(&mut self) {
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

fn run_attempt(
    engine: Arc<dyn DownloadEngine>,
    request: DownloadRequest,
    events: EventSender,
    canceled: Arc<AtomicBool>,
) {
    let is_playlist = classify(&request.url) == UrlKind::Playlist;
    tracing::info!(
        "[orchestrator] starting attempt via {} for {}",
        engine.name(),
        request.url
    );

    let progress = |percent: f32, status: String| {
        let _ = events.send(DownloadEvent::Progress(DownloadProgress { percent, status }));
    };

    progress(
        0.0,
        if is_playlist {
            "scanning playlist".to_string()
        } else {
            "analyzing video".to_string()
        },
    );

    let mut languages = Vec::new();
    if request.subtitles {
        // Playlists are not pre-validated; unavailable languages are
        // skipped per item by the engine itself.
        languages = if is_playlist {
            request.subtitle_langs.clone()
        } else {
            resolve_subtitles(engine.as_ref(), &request.url, &request.subtitle_langs)
        };

        if languages.is_empty() {
            let note = "requested subtitle languages are not offered";
            if request.mode == DownloadMode::SubtitleOnly {
                progress(0.0, note.to_string());
                let _ = events.send(DownloadEvent::Completed(
                    "subtitle-only mode, nothing to download".to_string(),
                ));
                return;
            }
            progress(0.0, format!("{note} (downloading video only)"));
        } else if !is_playlist {
            progress(0.0, format!("subtitles available: {}", languages.join(", ")));
        }
    }

    if let Err(e) = std::fs::create_dir_all(&request.target_dir) {
        let _ = events.send(DownloadEvent::Failed(DownloadError::EngineFailure(format!(
            "cannot create target directory {}: {e}",
            request.target_dir.display()
        ))));
        return;
    }

    let plan = build_plan(&request, is_playlist, languages);
    let mut relay = ProgressRelay::new(events.clone(), canceled);

    let outcome = match engine.download(&plan, &mut |record| relay.on_record(record)) {
        Ok(()) => {
            let message = match (request.mode, is_playlist) {
                (DownloadMode::SubtitleOnly, true) => {
                    "subtitle download complete (items without subtitles were skipped)"
                }
                (DownloadMode::SubtitleOnly, false) => "subtitle download complete",
                (DownloadMode::FullMedia, _) => "download complete",
            };
            DownloadEvent::Completed(message.to_string())
        }
        Err(e) if e.is_cancellation() => DownloadEvent::Failed(DownloadError::Canceled),
        Err(e) => DownloadEvent::Failed(e),
    };

    tracing::info!("[orchestrator] attempt finished: {:?}", outcome);
    let _ = events.send(outcome);
}

fn build_plan(request: &DownloadRequest, is_playlist: bool, languages: Vec<String>) -> DownloadPlan {
    DownloadPlan {
        url: request.url.clone(),
        output_template: request
            .target_dir
            .join("%(title)s.%(ext)s")
            .to_string_lossy()
            .into_owned(),
        quiet: true,
        single_item: !is_playlist,
        subtitles: (!languages.is_empty()).then(|| SubtitleOptions {
            languages,
            skip_auto_generated: true,
        }),
        selection: match request.mode {
            DownloadMode::SubtitleOnly => MediaSelection::SkipDownload,
            DownloadMode::FullMedia => MediaSelection::Media {
                format_spec: request.quality.format_spec().to_string(),
                fragments: request.fragments.clamp(1, 32),
            },
        },
    }
}

/// Maps engine progress records to UI events. Checks the cancellation
/// token on every record and on every merge-ramp step.
struct ProgressRelay {
    events: EventSender,
    canceled: Arc<AtomicBool>,
    last_percent: f32,
}

const MERGE_RAMP_START: f32 = 90.0;
const MERGE_RAMP_STEP: Duration = Duration::from_millis(50);

impl ProgressRelay {
    fn new(events: EventSender, canceled: Arc<AtomicBool>) -> Self {
        Self {
            events,
            canceled,
            last_percent: 0.0,
        }
    }

    fn emit(&mut self, percent: f32, status: String) {
        self.last_percent = percent;
        let _ = self
            .events
            .send(DownloadEvent::Progress(DownloadProgress { percent, status }));
    }

    fn on_record(&mut self, record: ProgressRecord) -> Result<(), DownloadError> {
        if self.canceled.load(Ordering::Relaxed) {
            return Err(DownloadError::Canceled);
        }

        let kind = match record.ext.as_deref() {
            Some("vtt") | Some("srt") => "subtitle",
            _ => "video",
        };
        let title = wrap_title(record.title.as_deref().unwrap_or("unknown video"));

        match record.status {
            RecordStatus::Downloading { percent } => {
                self.emit(percent, format!("{kind} downloading: {title}"));
            }
            RecordStatus::Finished => {
                // Bridge the gap while the engine merges the separately
                // downloaded streams. Floored at the last emitted percent
                // so progress never moves backwards within an attempt.
                let start = self.last_percent.max(MERGE_RAMP_START).min(100.0) as u32;
                for percent in start..100 {
                    if self.canceled.load(Ordering::Relaxed) {
                        return Err(DownloadError::Canceled);
                    }
                    self.emit(percent as f32, format!("{kind} merging: {title}"));
                    thread::sleep(MERGE_RAMP_STEP);
                }
                self.emit(100.0, format!("{kind} merging: {title}"));
            }
        }
        Ok(())
    }
}
