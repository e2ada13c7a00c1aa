pub mod batch;
pub mod config;
pub mod doctor;
pub mod download;
pub mod get;
pub mod resolve;

use crate::args::{DownloadOptions, SearchOptions};
use songtube_core::Config;

/// Apply command line overrides on top of the loaded configuration.
pub fn apply_overrides(config: &mut Config, search: &SearchOptions, download: &DownloadOptions) {
    if let Some(max_length) = search.max_length {
        config.search.max_length = max_length;
    }
    if let Some(min_views) = search.min_views {
        config.search.min_view_count = min_views;
    }
    if let Some(count) = search.count {
        config.search.search_count = count.max(1);
    }
    if let Some(bitrate) = download.bitrate {
        config.download.audio_bitrate = bitrate;
    }
    if let Some(ref output) = download.output {
        config.download.temp_dir = Some(output.clone());
    }
}

pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}
