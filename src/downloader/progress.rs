// Parsing of yt-dlp `--newline` output.
//
// Progress lines look like:
// [download]   6.2% of ~ 343.72MiB at  420.30KiB/s ETA 12:32 (frag 29/454)

use std::path::Path;

use lazy_static::lazy_static;
use regex::Regex;

/// One line of engine output, reduced to what the relay cares about.
#[derive(Debug, Clone, PartialEq)]
pub enum LineEvent {
    /// `[download]  12.5% of ...`
    Percent(f32),
    /// `[download] Destination: <path>` - a new item is starting
    Destination(String),
    /// `[Merger] Merging formats into ...` - streams done, merging begins
    MergeStart,
    /// `... has already been downloaded`
    AlreadyDownloaded,
}

lazy_static! {
    static ref PROGRESS_RE: Regex = Regex::new(r"\[download\]\s+(\d+\.?\d*)%").unwrap();
    static ref DEST_RE: Regex = Regex::new(r"\[download\]\s+Destination:\s+(.+)").unwrap();
    static ref MERGE_RE: Regex = Regex::new(r"\[Merger?\]\s+Merging").unwrap();
    static ref ALREADY_RE: Regex = Regex::new(r"has already been downloaded").unwrap();
}

pub fn parse_line(line: &str) -> Option<LineEvent> {
    if let Some(caps) = DEST_RE.captures(line) {
        return Some(LineEvent::Destination(caps.get(1)?.as_str().trim().to_string()));
    }

    if let Some(caps) = PROGRESS_RE.captures(line) {
        let percent: f32 = caps.get(1)?.as_str().parse().ok()?;
        return Some(LineEvent::Percent(percent));
    }

    if MERGE_RE.is_match(line) {
        return Some(LineEvent::MergeStart);
    }

    if ALREADY_RE.is_match(line) {
        return Some(LineEvent::AlreadyDownloaded);
    }

    None
}

/// File stem and extension of a destination path, used to label the
/// current item. Subtitle tracks arrive as `Title.ko.vtt`.
pub fn split_destination(path: &str) -> (Option<String>, Option<String>) {
    let path = Path::new(path);
    let title = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned());
    let ext = path
        .extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase());
    (title, ext)
}

/// Wrap display titles longer than 50 characters onto a second line so
/// the progress dialog never grows horizontally.
pub fn wrap_title(title: &str) -> String {
    const MAX_LEN: usize = 50;
    let chars: Vec<char> = title.chars().collect();
    if chars.len() <= MAX_LEN {
        return title.to_string();
    }
    let head: String = chars[..MAX_LEN].iter().collect();
    let tail: String = chars[MAX_LEN..].iter().collect();
    format!("{head}\n{tail}")
}
