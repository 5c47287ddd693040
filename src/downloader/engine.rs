// yt-dlp subprocess engine
//
// Spawns the binary with `--newline`, streams stdout line by line into
// the progress hook and collects stderr on a side thread. A hook error
// kills the child; that is the only way to stop a run early.

use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use std::process::{Command, Stdio};

use super::errors::DownloadError;
use super::progress::{parse_line, split_destination, LineEvent};
use super::traits::{
    DownloadEngine, DownloadPlan, EngineConfig, MediaSelection, ProgressRecord, RecordStatus,
};
use super::utils;

pub struct YtDlpEngine {
    binary: PathBuf,
    ffmpeg_location: Option<PathBuf>,
    timeout_seconds: u32,
}

impl YtDlpEngine {
    pub fn new(config: EngineConfig) -> Self {
        let binary = config.ytdlp_path.unwrap_or_else(utils::find_ytdlp);
        let ffmpeg_location = config.ffmpeg_location.or_else(utils::ffmpeg_location);
        Self {
            binary,
            ffmpeg_location,
            timeout_seconds: config.timeout_seconds,
        }
    }

    fn build_args(&self, plan: &DownloadPlan) -> Vec<String> {
        let mut args = vec![
            "-o".to_string(),
            plan.output_template.clone(),
            "--newline".to_string(),
            "--no-update".to_string(),
            "--socket-timeout".to_string(),
            self.timeout_seconds.to_string(),
        ];

        if plan.quiet {
            args.push("--no-warnings".to_string());
        }

        if plan.single_item {
            args.push("--no-playlist".to_string());
        }

        if let Some(subs) = &plan.subtitles {
            args.push("--write-subs".to_string());
            args.push("--sub-langs".to_string());
            args.push(subs.languages.join(","));
            if subs.skip_auto_generated {
                args.push("--no-write-auto-subs".to_string());
            }
        }

        match &plan.selection {
            MediaSelection::SkipDownload => args.push("--skip-download".to_string()),
            MediaSelection::Media {
                format_spec,
                fragments,
            } => {
                args.push("-f".to_string());
                args.push(format_spec.clone());
                args.push("--concurrent-fragments".to_string());
                args.push(fragments.to_string());
            }
        }

        if let Some(ffmpeg) = &self.ffmpeg_location {
            args.push("--ffmpeg-location".to_string());
            args.push(ffmpeg.display().to_string());
        }

        args.push(plan.url.clone());
        args
    }
}

impl DownloadEngine for YtDlpEngine {
    fn name(&self) -> &'static str {
        "yt-dlp"
    }

    fn subtitle_languages(&self, url: &str) -> Result<Vec<String>, DownloadError> {
        let output = Command::new(&self.binary)
            .args([
                "--dump-json",
                "--no-playlist",
                "--no-warnings",
                "--skip-download",
                "--socket-timeout",
            ])
            .arg(self.timeout_seconds.to_string())
            .arg(url)
            .output()
            .map_err(|e| spawn_error(&self.binary, e))?;

        if !output.status.success() {
            return Err(DownloadError::MetadataFetch(summarize_stderr(
                &String::from_utf8_lossy(&output.stderr),
            )));
        }

        let json: serde_json::Value = serde_json::from_slice(&output.stdout)
            .map_err(|e| DownloadError::MetadataFetch(format!("bad metadata JSON: {e}")))?;

        let langs = json["subtitles"]
            .as_object()
            .map(|subs| subs.keys().cloned().collect())
            .unwrap_or_default();
        Ok(langs)
    }

    fn download(
        &self,
        plan: &DownloadPlan,
        hook: &mut dyn FnMut(ProgressRecord) -> Result<(), DownloadError>,
    ) -> Result<(), DownloadError> {
        let args = self.build_args(plan);
        tracing::info!("[engine] starting {}: {}", self.name(), plan.url);
        tracing::debug!("[engine] args: {:?}", args);

        let mut child = Command::new(&self.binary)
            .args(&args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| spawn_error(&self.binary, e))?;

        let stdout = child.stdout.take().ok_or_else(|| {
            DownloadError::EngineFailure("failed to capture yt-dlp stdout".to_string())
        })?;
        let stderr = child.stderr.take().ok_or_else(|| {
            DownloadError::EngineFailure("failed to capture yt-dlp stderr".to_string())
        })?;

        // Drained on its own thread so a chatty stderr never fills the pipe.
        let stderr_task = std::thread::spawn(move || {
            let reader = BufReader::new(stderr);
            reader
                .lines()
                .map_while(Result::ok)
                .collect::<Vec<_>>()
                .join("\n")
        });

        let mut current_title: Option<String> = None;
        let mut current_ext: Option<String> = None;

        let reader = BufReader::new(stdout);
        for line in reader.lines().map_while(Result::ok) {
            let Some(event) = parse_line(&line) else {
                continue;
            };

            let record = match event {
                LineEvent::Destination(path) => {
                    let (title, ext) = split_destination(&path);
                    current_title = title;
                    current_ext = ext;
                    continue;
                }
                LineEvent::Percent(percent) => ProgressRecord::downloading(percent)
                    .with_item(current_title.clone(), current_ext.clone()),
                LineEvent::AlreadyDownloaded => ProgressRecord::downloading(100.0)
                    .with_item(current_title.clone(), current_ext.clone()),
                LineEvent::MergeStart => {
                    ProgressRecord::finished().with_item(current_title.clone(), current_ext.clone())
                }
            };

            if let Err(abort) = hook(record) {
                tracing::info!("[engine] aborting {}: {}", self.name(), abort);
                let _ = child.kill();
                let _ = child.wait();
                let _ = stderr_task.join();
                return Err(abort);
            }
        }

        let status = child
            .wait()
            .map_err(|e| DownloadError::EngineFailure(format!("failed to wait for yt-dlp: {e}")))?;
        let stderr_output = stderr_task.join().unwrap_or_default();

        if status.success() {
            Ok(())
        } else {
            Err(DownloadError::EngineFailure(summarize_stderr(
                &stderr_output,
            )))
        }
    }
}

fn spawn_error(binary: &PathBuf, e: std::io::Error) -> DownloadError {
    if e.kind() == std::io::ErrorKind::NotFound {
        DownloadError::ToolNotFound(binary.display().to_string())
    } else {
        DownloadError::EngineFailure(format!("failed to start {}: {e}", binary.display()))
    }
}

/// Keep the actionable part of a stderr dump: ERROR lines when present,
/// otherwise the last non-empty line.
fn summarize_stderr(stderr: &str) -> String {
    let error_lines: Vec<&str> = stderr
        .lines()
        .map(str::trim)
        .filter(|l| l.starts_with("ERROR:"))
        .take(3)
        .collect();

    if !error_lines.is_empty() {
        return error_lines.join(" | ");
    }

    stderr
        .lines()
        .rev()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .unwrap_or("unknown engine error")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::downloader::traits::SubtitleOptions;

    fn engine() -> YtDlpEngine {
        YtDlpEngine::new(EngineConfig::default().with_ytdlp_path("/usr/bin/yt-dlp"))
    }

    fn media_plan() -> DownloadPlan {
        DownloadPlan {
            url: "https://example.com/watch?v=abc".to_string(),
            output_template: "downloads/%(title)s.%(ext)s".to_string(),
            quiet: true,
            single_item: true,
            subtitles: None,
            selection: MediaSelection::Media {
                format_spec: "bestvideo+bestaudio".to_string(),
                fragments: 16,
            },
        }
    }

    #[test]
    fn media_plans_carry_format_and_fragments() {
        let args = engine().build_args(&media_plan());
        let f = args.iter().position(|a| a == "-f").unwrap();
        assert_eq!(args[f + 1], "bestvideo+bestaudio");
        let c = args
            .iter()
            .position(|a| a == "--concurrent-fragments")
            .unwrap();
        assert_eq!(args[c + 1], "16");
        assert!(args.contains(&"--no-playlist".to_string()));
        assert!(args.contains(&"--no-warnings".to_string()));
        assert!(!args.contains(&"--skip-download".to_string()));
        // target URL always comes last
        assert_eq!(args.last().unwrap(), "https://example.com/watch?v=abc");
    }

    #[test]
    fn subtitle_only_plans_skip_the_media_download() {
        let mut plan = media_plan();
        plan.selection = MediaSelection::SkipDownload;
        plan.subtitles = Some(SubtitleOptions {
            languages: vec!["ko".to_string(), "en".to_string()],
            skip_auto_generated: true,
        });

        let args = engine().build_args(&plan);
        assert!(args.contains(&"--skip-download".to_string()));
        assert!(!args.contains(&"-f".to_string()));
        assert!(args.contains(&"--write-subs".to_string()));
        let s = args.iter().position(|a| a == "--sub-langs").unwrap();
        assert_eq!(args[s + 1], "ko,en");
        assert!(args.contains(&"--no-write-auto-subs".to_string()));
    }

    #[test]
    fn playlist_plans_drop_the_single_item_flag() {
        let mut plan = media_plan();
        plan.single_item = false;
        let args = engine().build_args(&plan);
        assert!(!args.contains(&"--no-playlist".to_string()));
    }

    #[test]
    fn ffmpeg_location_is_forwarded_when_configured() {
        let engine = YtDlpEngine::new(
            EngineConfig::default()
                .with_ytdlp_path("/usr/bin/yt-dlp")
                .with_ffmpeg_location("/opt/app/ffmpeg"),
        );
        let args = engine.build_args(&media_plan());
        let f = args.iter().position(|a| a == "--ffmpeg-location").unwrap();
        assert_eq!(args[f + 1], "/opt/app/ffmpeg");
    }

    #[test]
    fn stderr_summaries_prefer_error_lines() {
        let stderr = "WARNING: something minor\nERROR: HTTP Error 403: Forbidden\ntrailing noise";
        assert_eq!(summarize_stderr(stderr), "ERROR: HTTP Error 403: Forbidden");
        assert_eq!(summarize_stderr("  \nlast line\n\n"), "last line");
        assert_eq!(summarize_stderr(""), "unknown engine error");
    }
}
