//! Error types for songtube-core

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SongtubeError>;

#[derive(Error, Debug)]
pub enum SongtubeError {
    #[error("Resolve failed: {0}")]
    Resolve(#[from] ResolveError),

    #[error("Fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SongtubeError {
    /// True when the failure concerns only the current song, so a batch can
    /// move on to the next one.
    pub fn is_skippable(&self) -> bool {
        matches!(self, SongtubeError::Resolve(e) if e.is_skippable())
    }
}

#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("Search query must not be empty")]
    InvalidQuery,

    #[error("Skipped song -- Could not load from YouTube")]
    ItemNotFound,

    #[error("Length {duration}s exceeds MAX_LENGTH value of {max_length}s [{locator}]")]
    DurationExceeded {
        duration: u64,
        max_length: u64,
        locator: String,
    },

    #[error("View count {views} does not meet MIN_VIEW_COUNT value of {min_view_count} [{locator}]")]
    ViewCountTooLow {
        views: u64,
        min_view_count: u64,
        locator: String,
    },

    #[error("Could not parse duration {raw:?} [{locator}]")]
    UnparsableDuration { raw: String, locator: String },

    #[error("Search backend failed: {0}")]
    Backend(#[from] SearchError),
}

impl ResolveError {
    pub fn is_skippable(&self) -> bool {
        matches!(
            self,
            ResolveError::ItemNotFound
                | ResolveError::DurationExceeded { .. }
                | ResolveError::ViewCountTooLow { .. }
                | ResolveError::UnparsableDuration { .. }
        )
    }
}

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Search page returned status {0}")]
    Status(u16),

    #[error("Invalid search URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("ytInitialData not found in search page")]
    MissingInitialData,

    #[error("Failed to parse search results: {0}")]
    Parse(String),
}

#[derive(Error, Debug)]
pub enum FetchError {
    #[error(transparent)]
    Platform(#[from] PlatformError),
}

#[derive(Error, Debug)]
pub enum PlatformError {
    #[error("yt-dlp not found. Install with: pip install yt-dlp")]
    YtDlpNotFound,

    #[error("yt-dlp failed with exit code: {0:?}")]
    YtDlpFailed(Option<i32>),

    #[error("Video unavailable or private: {0}")]
    VideoUnavailable(String),

    #[error("Video is age restricted and the bypass failed: {0}")]
    AgeRestricted(String),

    #[error("No audio stream available")]
    NoAudioStream,

    #[error("Failed to parse metadata: {0}")]
    MetadataParse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error(
        "YOUTUBE_POTOKEN not found. Set the YOUTUBE_POTOKEN environment variable \
         (YOUTUBE_POTOKEN=<your potoken>) or add `potoken = \"...\"` under [auth] in {0}"
    )]
    ConfigurationMissing(String),

    #[error("Failed to load config: {0}")]
    LoadError(String),

    #[error("Invalid config value: {0}")]
    InvalidValue(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_messages_embed_values() {
        let err = ResolveError::DurationExceeded {
            duration: 4000,
            max_length: 900,
            locator: "https://www.youtube.com/watch?v=abc".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Length 4000s exceeds MAX_LENGTH value of 900s [https://www.youtube.com/watch?v=abc]"
        );

        let err = ResolveError::ViewCountTooLow {
            views: 12,
            min_view_count: 1000,
            locator: "https://www.youtube.com/watch?v=abc".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "View count 12 does not meet MIN_VIEW_COUNT value of 1000 [https://www.youtube.com/watch?v=abc]"
        );
    }

    #[test]
    fn test_skippable() {
        assert!(SongtubeError::from(ResolveError::ItemNotFound).is_skippable());
        assert!(!SongtubeError::from(ResolveError::InvalidQuery).is_skippable());
        assert!(!SongtubeError::from(FetchError::from(PlatformError::NoAudioStream)).is_skippable());
    }
}
