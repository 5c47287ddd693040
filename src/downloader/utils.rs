// Tool discovery and path helpers

use std::path::PathBuf;
use std::process::Command;

/// Locate the yt-dlp binary: common install paths first, then `which`,
/// finally the bare name in the hope that PATH resolves it.
pub fn find_ytdlp() -> PathBuf {
    let mut candidates = vec![
        PathBuf::from("/opt/homebrew/bin/yt-dlp"),
        PathBuf::from("/usr/local/bin/yt-dlp"),
        PathBuf::from("/usr/bin/yt-dlp"),
    ];
    if let Some(home) = dirs::home_dir() {
        candidates.push(home.join(".local/bin/yt-dlp"));
    }

    for path in candidates {
        if path.exists() {
            tracing::debug!("[utils] found yt-dlp at {}", path.display());
            return path;
        }
    }

    if let Ok(output) = Command::new("which").arg("yt-dlp").output() {
        if output.status.success() {
            let path = String::from_utf8_lossy(&output.stdout).trim().to_string();
            if !path.is_empty() {
                return PathBuf::from(path);
            }
        }
    }

    PathBuf::from("yt-dlp")
}

/// The companion ffmpeg travels in a folder beside a packaged
/// executable; during development a local `ffmpeg` directory is used.
pub fn ffmpeg_location() -> Option<PathBuf> {
    if let Ok(exe) = std::env::current_exe() {
        if let Some(dir) = exe.parent() {
            let bundled = dir.join("ffmpeg");
            if bundled.is_dir() {
                return Some(bundled);
            }
        }
    }

    let local = std::env::current_dir().ok()?.join("ffmpeg");
    local.is_dir().then_some(local)
}

/// Default target: a `downloads` folder under the working directory.
/// Created lazily by the orchestrator, not here.
pub fn default_download_dir() -> PathBuf {
    std::env::current_dir()
        .map(|cwd| cwd.join("downloads"))
        .unwrap_or_else(|_| PathBuf::from("downloads"))
}

/// "Korean (ko)" -> "ko". Labels without a parenthesized code pass
/// through unchanged.
pub fn extract_lang_code(label: &str) -> &str {
    match (label.find('('), label.find(')')) {
        (Some(open), Some(close)) if open < close => &label[open + 1..close],
        _ => label,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lang_codes_are_extracted_from_labels() {
        assert_eq!(extract_lang_code("Korean (ko)"), "ko");
        assert_eq!(extract_lang_code("English(en)"), "en");
        assert_eq!(extract_lang_code("한국어(ko)"), "ko");
    }

    #[test]
    fn labels_without_codes_pass_through() {
        assert_eq!(extract_lang_code("ko"), "ko");
        assert_eq!(extract_lang_code(")("), ")(");
    }

    #[test]
    fn default_dir_is_downloads_under_cwd() {
        assert!(default_download_dir().ends_with("downloads"));
    }
}
