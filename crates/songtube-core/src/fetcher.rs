//! Pick and download the audio stream closest to a target bitrate

use crate::error::{FetchError, PlatformError};
use crate::platform::{AudioStream, PlatformClient};
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadResult {
    /// Downloaded file. The caller owns it from here on.
    pub path: PathBuf,
    /// Bitrate of the downloaded stream in bits per second
    pub bitrate_bps: u64,
}

pub struct Fetcher<P> {
    client: P,
    temp_dir: PathBuf,
}

impl<P: PlatformClient> Fetcher<P> {
    pub fn new(client: P, temp_dir: PathBuf) -> Self {
        Self { client, temp_dir }
    }

    /// Download the best audio-only stream of `locator` at or below
    /// `target_bitrate_bps`, or the lowest one if all are above it.
    pub async fn download(
        &self,
        locator: &str,
        target_bitrate_bps: u64,
    ) -> Result<DownloadResult, FetchError> {
        info!("Fetching streams for: {}", locator);

        // The gate shows up either as a failed request or as a flagged manifest
        let manifest = match self.client.streams(locator).await {
            Ok(manifest) if !manifest.age_restricted => manifest,
            Ok(_) | Err(PlatformError::AgeRestricted(_)) => {
                warn!("{} is age restricted, bypassing age gate", locator);
                self.client.bypass_age_gate(locator).await?
            }
            Err(e) => return Err(e.into()),
        };

        let audio = manifest.audio_streams();
        let stream = select_audio_stream(&audio, target_bitrate_bps)
            .ok_or(PlatformError::NoAudioStream)?;

        info!(
            "Selected stream {} at {} kbps (target {} bps)",
            stream.format_id, stream.bitrate_kbps, target_bitrate_bps
        );

        let path = self.client.download(locator, stream, &self.temp_dir).await?;

        Ok(DownloadResult {
            path,
            bitrate_bps: stream.bitrate_bps(),
        })
    }
}

/// Choose from audio streams ordered by bitrate, highest first: the first one
/// at or below `target_bitrate_bps`, else the last (lowest) one.
pub fn select_audio_stream<'a>(
    streams: &[&'a AudioStream],
    target_bitrate_bps: u64,
) -> Option<&'a AudioStream> {
    let within_target = streams
        .iter()
        .find(|s| s.bitrate_bps() <= target_bitrate_bps)
        .copied();

    within_target.or_else(|| {
        let lowest = streams.last().copied();
        if let Some(stream) = lowest {
            warn!(
                "No stream at or below {} bps, falling back to {} kbps",
                target_bitrate_bps, stream.bitrate_kbps
            );
        }
        lowest
    })
}
