//! Video platform capability used by the fetcher

use crate::error::PlatformError;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// One downloadable stream of a video.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioStream {
    /// Platform format identifier (yt-dlp `format_id`)
    pub format_id: String,
    /// Average bitrate in kbps
    pub bitrate_kbps: u32,
    /// True when the stream carries no video track
    pub audio_only: bool,
    /// Container extension, e.g. "webm" or "m4a"
    pub ext: String,
}

impl AudioStream {
    pub fn bitrate_bps(&self) -> u64 {
        u64::from(self.bitrate_kbps) * 1000
    }
}

/// Stream metadata for one video.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamManifest {
    pub video_id: String,
    pub age_restricted: bool,
    pub streams: Vec<AudioStream>,
}

impl StreamManifest {
    /// Audio-only streams, highest bitrate first. Equal bitrates keep
    /// manifest order.
    pub fn audio_streams(&self) -> Vec<&AudioStream> {
        let mut audio: Vec<&AudioStream> = self.streams.iter().filter(|s| s.audio_only).collect();
        audio.sort_by(|a, b| b.bitrate_kbps.cmp(&a.bitrate_kbps));
        audio
    }
}

#[async_trait]
pub trait PlatformClient: Send + Sync {
    /// Fetch stream metadata for a video.
    async fn streams(&self, locator: &str) -> Result<StreamManifest, PlatformError>;

    /// Fetch stream metadata again through whatever route gets past the age
    /// gate.
    async fn bypass_age_gate(&self, locator: &str) -> Result<StreamManifest, PlatformError>;

    /// Download `stream` into `dest_dir` and return the written file.
    async fn download(
        &self,
        locator: &str,
        stream: &AudioStream,
        dest_dir: &Path,
    ) -> Result<PathBuf, PlatformError>;
}
