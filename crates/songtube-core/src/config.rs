//! Configuration management for songtube

use crate::error::ConfigError;
use crate::resolver::AcceptanceThresholds;
use crate::token::AccessToken;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable holding the proof-of-origin token.
pub const TOKEN_ENV_VAR: &str = "YOUTUBE_POTOKEN";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub auth: AuthConfig,
    pub search: SearchConfig,
    pub download: DownloadConfig,
    pub paths: PathsConfig,
    pub batch: BatchConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    /// YouTube proof-of-origin token (also read from YOUTUBE_POTOKEN)
    pub potoken: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Reject the chosen video when it is this long or longer (seconds)
    pub max_length: u64,
    /// Reject the chosen video when it has this many views or fewer
    pub min_view_count: u64,
    /// Number of candidates requested from the search backend
    pub search_count: usize,
    /// Platform base URL, prefixed to relative result links
    pub base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadConfig {
    /// Target audio bitrate in bits per second
    pub audio_bitrate: u64,
    /// Directory downloads are written to (system temp if not set)
    pub temp_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Path to yt-dlp binary (auto-detected if not set)
    pub yt_dlp: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Maximum songs processed at once
    pub max_parallel: usize,
    /// Keep going after a non-skippable failure
    pub continue_on_error: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            auth: AuthConfig::default(),
            search: SearchConfig {
                max_length: 900,
                min_view_count: 1000,
                search_count: 1,
                base_url: crate::search::YOUTUBE_BASE_URL.to_string(),
            },
            download: DownloadConfig {
                audio_bitrate: 160_000,
                temp_dir: None,
            },
            paths: PathsConfig::default(),
            batch: BatchConfig {
                max_parallel: 4,
                continue_on_error: true,
            },
        }
    }
}

impl Config {
    /// Load configuration from file and environment
    pub fn load(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        // Load from default config directory
        if let Some(default_config) = default_config_path() {
            if default_config.exists() {
                figment = figment.merge(Toml::file(&default_config));
            }
        }

        // Load from specified config file
        if let Some(path) = config_file {
            figment = figment.merge(Toml::file(path));
        }

        // Load from environment
        figment = figment
            .merge(Env::prefixed("SONGTUBE_").split("__"))
            .merge(Env::raw().only(&[TOKEN_ENV_VAR]).map(|_| "auth.potoken".into()));

        let config: Config = figment
            .extract()
            .map_err(|e| ConfigError::LoadError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.search.search_count == 0 {
            return Err(ConfigError::InvalidValue(
                "search.search_count must be at least 1".to_string(),
            ));
        }
        if self.download.audio_bitrate == 0 {
            return Err(ConfigError::InvalidValue(
                "download.audio_bitrate must be positive".to_string(),
            ));
        }
        if self.batch.max_parallel == 0 {
            return Err(ConfigError::InvalidValue(
                "batch.max_parallel must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// The access token, or `ConfigurationMissing` if none is configured.
    pub fn access_token(&self) -> Result<AccessToken, ConfigError> {
        let hint = token_location_hint();
        match self.auth.potoken {
            Some(ref token) => AccessToken::new(token.as_str(), &hint),
            None => Err(ConfigError::ConfigurationMissing(hint)),
        }
    }

    pub fn thresholds(&self) -> AcceptanceThresholds {
        AcceptanceThresholds {
            max_length_seconds: self.search.max_length,
            min_view_count: self.search.min_view_count,
        }
    }

    /// Get yt-dlp path, auto-detecting if not configured
    pub fn yt_dlp_path(&self) -> Result<PathBuf, ConfigError> {
        if let Some(ref path) = self.paths.yt_dlp {
            Ok(path.clone())
        } else {
            which::which("yt-dlp")
                .map_err(|_| ConfigError::InvalidValue("yt-dlp not found in PATH".to_string()))
        }
    }

    /// Get download directory
    pub fn temp_dir(&self) -> PathBuf {
        self.download
            .temp_dir
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("songtube"))
    }
}

/// `<config_dir>/songtube/config.toml`, if the platform has a config dir.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("songtube/config.toml"))
}

fn token_location_hint() -> String {
    default_config_path()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "songtube/config.toml".to_string())
}
