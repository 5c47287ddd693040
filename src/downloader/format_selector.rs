// Quality tiers and their yt-dlp format selector presets
//
// Each preset is a fallback chain: a capped-resolution mp4 video+audio
// pair first, then any mp4 pair, then best overall, so an unavailable
// exact resolution degrades to the nearest available encoding.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Quality {
    P2160,
    P1440,
    P1080,
    P720,
    P480,
}

impl Default for Quality {
    fn default() -> Self {
        Self::P1080
    }
}

impl Quality {
    /// Display label used by the options popup.
    pub fn label(&self) -> &'static str {
        match self {
            Self::P2160 => "4K (2160p)",
            Self::P1440 => "1440p (QHD)",
            Self::P1080 => "1080p (Full HD)",
            Self::P720 => "720p (HD)",
            Self::P480 => "480p (SD)",
        }
    }

    /// Fallback-ordered yt-dlp format expression for this tier.
    pub fn format_spec(&self) -> &'static str {
        match self {
            Self::P2160 => "bestvideo[height<=2160]+bestaudio/bestvideo[ext=mp4]+bestaudio[ext=m4a]/best[ext=mp4]",
            Self::P1440 => "bestvideo[height<=1440][ext=mp4]+bestaudio[ext=m4a]/bestvideo[ext=mp4]+bestaudio[ext=m4a]/best[ext=mp4]",
            Self::P1080 => "bestvideo[height<=1080]+bestaudio[ext=m4a]/bestvideo[ext=mp4]+bestaudio[ext=m4a]/best[ext=mp4]",
            Self::P720 => "bestvideo[height<=720][ext=mp4]+bestaudio[ext=m4a]/bestvideo[ext=mp4]+bestaudio[ext=m4a]/best[ext=mp4]",
            Self::P480 => "bestvideo[height<=480][ext=mp4]+bestaudio[ext=m4a]/bestvideo[ext=mp4]+bestaudio[ext=m4a]/best[ext=mp4]",
        }
    }

    /// Resolution cap in pixels.
    pub fn height(&self) -> u32 {
        match self {
            Self::P2160 => 2160,
            Self::P1440 => 1440,
            Self::P1080 => 1080,
            Self::P720 => 720,
            Self::P480 => 480,
        }
    }

    /// Map a popup label back to a tier. Unknown labels fall through to
    /// None so the caller can keep its current selection.
    pub fn from_label(label: &str) -> Option<Self> {
        [Self::P2160, Self::P1440, Self::P1080, Self::P720, Self::P480]
            .into_iter()
            .find(|q| label.contains(&q.height().to_string()) || (label.contains("4K") && *q == Self::P2160))
    }
}
